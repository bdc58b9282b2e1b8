use crate::prelude::{EngineError, EngineResult};
use ndarray::{Array3, ArrayView2, Axis};

/// RGBA pixel buffer indexed `[row, column, channel]`.
///
/// Tracking reads channel 0 as luminance; the preprocessor keeps the color
/// channels identical so any of them would do.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    data: Array3<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: Array3::zeros((height, width, 4)),
        }
    }

    /// Builds a raster from tightly packed RGBA bytes.
    pub fn from_rgba(width: usize, height: usize, bytes: Vec<u8>) -> EngineResult<Self> {
        let data = Array3::from_shape_vec((height, width, 4), bytes).map_err(|err| {
            EngineError::InvalidRaster(format!("{}x{} RGBA buffer: {}", width, height, err))
        })?;
        Ok(Self { data })
    }

    /// Builds an opaque grayscale raster from row-major luminance values.
    pub fn from_luma(width: usize, height: usize, luma: &[u8]) -> EngineResult<Self> {
        if luma.len() != width * height {
            return Err(EngineError::InvalidRaster(format!(
                "expected {} luma samples, got {}",
                width * height,
                luma.len()
            )));
        }
        let mut raster = Self::new(width, height);
        for (idx, &value) in luma.iter().enumerate() {
            raster.set_gray(idx % width, idx / width, value);
        }
        Ok(raster)
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
            self.data[[y, x, 3]],
        ]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        for (channel, value) in rgba.into_iter().enumerate() {
            self.data[[y, x, channel]] = value;
        }
    }

    #[inline]
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.data[[y, x, 0]]
    }

    pub fn set_gray(&mut self, x: usize, y: usize, value: u8) {
        self.set_pixel(x, y, [value, value, value, 255]);
    }

    /// Single-channel view used by the matcher and the gradient filter.
    pub fn luma_view(&self) -> ArrayView2<'_, u8> {
        self.data.index_axis(Axis(2), 0)
    }

    pub fn same_shape(&self, other: &Raster) -> bool {
        self.data.dim() == other.data.dim()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    pub(crate) fn as_array_mut(&mut self) -> &mut Array3<u8> {
        &mut self.data
    }

    pub fn count_opaque(&self) -> usize {
        self.data
            .index_axis(Axis(2), 3)
            .iter()
            .filter(|&&alpha| alpha > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_luma_replicates_channels() {
        let raster = Raster::from_luma(2, 2, &[10, 20, 30, 40]).unwrap();
        assert_eq!(raster.pixel(1, 1), [40, 40, 40, 255]);
        assert_eq!(raster.luma(1, 0), 20);
    }

    #[test]
    fn from_rgba_rejects_short_buffer() {
        assert!(Raster::from_rgba(4, 4, vec![0; 10]).is_err());
    }
}
