pub mod area;
pub mod block_match;
pub mod detection;
pub mod edges;
pub mod frame_buffer;
pub mod preprocess;
pub mod raster;
pub mod segments;
pub mod strain;

pub use area::{ejection_fraction, polygon_area, AreaExtrema};
pub use block_match::{track, BlockMatcher};
pub use detection::detect_walls;
pub use edges::{diagnostic_mask, sobel, GradientMap, StrainPolarity};
pub use frame_buffer::FrameBuffers;
pub use preprocess::{enhance_contrast, normalize, prepare_frame};
pub use raster::Raster;
pub use strain::{StrainHistory, STRAIN_POLARITY};
