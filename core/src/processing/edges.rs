use crate::prelude::Roi;
use crate::processing::raster::Raster;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Overlay color for strain with the healthy (shortening) sign.
pub const FAVORABLE_RGB: [u8; 3] = [239, 68, 68];
/// Overlay color for strain with the pathological (lengthening) sign.
pub const UNFAVORABLE_RGB: [u8; 3] = [59, 130, 246];

/// Which palette the diagnostic overlay is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrainPolarity {
    Favorable,
    Unfavorable,
}

impl StrainPolarity {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            StrainPolarity::Favorable => FAVORABLE_RGB,
            StrainPolarity::Unfavorable => UNFAVORABLE_RGB,
        }
    }
}

/// Per-pixel Sobel gradient magnitude, indexed `[row, column]`.
#[derive(Debug, Clone)]
pub struct GradientMap {
    magnitude: Array2<f32>,
}

impl GradientMap {
    pub fn width(&self) -> usize {
        self.magnitude.ncols()
    }

    pub fn height(&self) -> usize {
        self.magnitude.nrows()
    }

    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.magnitude[[y, x]]
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.magnitude
    }
}

/// 3x3 Sobel magnitude over the luminance channel.
///
/// The one-pixel border ring stays zero.
pub fn sobel(raster: &Raster) -> GradientMap {
    let luma = raster.luma_view();
    let (height, width) = luma.dim();
    let mut magnitude = Array2::<f32>::zeros((height, width));
    if width < 3 || height < 3 {
        return GradientMap { magnitude };
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut gx = 0i32;
            let mut gy = 0i32;
            for (ky, (row_x, row_y)) in SOBEL_X.iter().zip(SOBEL_Y.iter()).enumerate() {
                for kx in 0..3 {
                    let value = luma[[y + ky - 1, x + kx - 1]] as i32;
                    gx += row_x[kx] * value;
                    gy += row_y[kx] * value;
                }
            }
            magnitude[[y, x]] = ((gx * gx + gy * gy) as f32).sqrt();
        }
    }
    GradientMap { magnitude }
}

/// Colorises strong edges for display.
///
/// Pixels above `threshold` get the polarity color with alpha equal to the
/// magnitude (capped at 255). Everything else, and everything outside `roi`,
/// stays fully transparent.
pub fn diagnostic_mask(
    gradient: &GradientMap,
    roi: Option<&Roi>,
    polarity: StrainPolarity,
    threshold: f32,
) -> Raster {
    let mut mask = Raster::new(gradient.width(), gradient.height());
    let [r, g, b] = polarity.rgb();
    for ((y, x), &value) in gradient.as_array().indexed_iter() {
        if value <= threshold {
            continue;
        }
        if let Some(region) = roi {
            if !region.contains(x as f32, y as f32) {
                continue;
            }
        }
        mask.set_pixel(x, y, [r, g, b, value.min(255.0) as u8]);
    }
    mask
}
