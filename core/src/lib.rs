//! Motion-estimation core for echocardiography clips.
//!
//! Frames are normalised and contrast-stretched, wall points are seeded from
//! Sobel edges and followed with SAD block matching, and the tracked contour
//! yields strain and an area-change ejection fraction. Sessions run either as
//! a real-time loop over one view or as a frame-stepped biplane walk.

pub mod config;
pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod session;
pub mod telemetry;

pub use config::EngineConfig;
pub use prelude::{EngineError, EngineResult, Point2, Roi, StrainSample, TrackingPoint, View};
pub use session::{AnalysisResult, BiplaneOrchestrator, ViewSession};
