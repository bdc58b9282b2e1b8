use crate::prelude::{EngineError, EngineResult};
use crate::processing::raster::Raster;

/// Previous/current raster pair reused across ticks.
///
/// Every push shifts the current frame into the previous slot before the new
/// frame lands in the current slot; the oldest frame is dropped.
pub struct FrameBuffers {
    previous: Raster,
    current: Raster,
    filled: usize,
}

impl FrameBuffers {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            previous: Raster::new(width, height),
            current: Raster::new(width, height),
            filled: 0,
        }
    }

    /// Shift-then-fill with an already normalised frame.
    pub fn push(&mut self, frame: Raster) -> EngineResult<()> {
        if !frame.same_shape(&self.current) {
            return Err(EngineError::InvalidRaster(format!(
                "frame is {}x{}, buffers hold {}x{}",
                frame.width(),
                frame.height(),
                self.current.width(),
                self.current.height()
            )));
        }
        std::mem::swap(&mut self.previous, &mut self.current);
        self.current = frame;
        self.filled = (self.filled + 1).min(2);
        Ok(())
    }

    pub fn current(&self) -> Option<&Raster> {
        (self.filled >= 1).then_some(&self.current)
    }

    /// Both frames, once two have been pushed.
    pub fn pair(&self) -> Option<(&Raster, &Raster)> {
        (self.filled >= 2).then_some((&self.previous, &self.current))
    }

    pub fn reset(&mut self) {
        self.filled = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(value: u8) -> Raster {
        Raster::from_luma(2, 2, &[value; 4]).unwrap()
    }

    #[test]
    fn push_shifts_before_filling() {
        let mut buffers = FrameBuffers::new(2, 2);
        assert!(buffers.current().is_none());
        buffers.push(gray(10)).unwrap();
        assert!(buffers.pair().is_none());
        buffers.push(gray(20)).unwrap();
        buffers.push(gray(30)).unwrap();
        let (previous, current) = buffers.pair().unwrap();
        assert_eq!(previous.luma(0, 0), 20);
        assert_eq!(current.luma(0, 0), 30);
    }

    #[test]
    fn wrong_size_frame_is_rejected() {
        let mut buffers = FrameBuffers::new(4, 4);
        assert!(matches!(
            buffers.push(gray(1)),
            Err(EngineError::InvalidRaster(_))
        ));
    }

    #[test]
    fn reset_forgets_frames() {
        let mut buffers = FrameBuffers::new(2, 2);
        buffers.push(gray(1)).unwrap();
        buffers.push(gray(2)).unwrap();
        buffers.reset();
        assert!(buffers.pair().is_none());
    }
}
