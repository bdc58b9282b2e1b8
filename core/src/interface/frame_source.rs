use crate::prelude::{EngineError, EngineResult};
use crate::processing::raster::Raster;

/// Slack absorbed when a seek time lands just short of a frame boundary.
pub const FRAME_EPSILON: f64 = 1e-6;

/// Index of the frame on screen at `time`, tolerant of `k * (1 / fps)` drift.
pub fn frame_at(time: f64, fps: f64) -> u64 {
    (time * fps + FRAME_EPSILON).floor().max(0.0) as u64
}

/// Supplier of successive frames, such as a decoded clip or a live probe.
///
/// The engine only reads from a source; `seek` positions the playhead for
/// batch walks.
pub trait FrameSource {
    fn current_raster(&mut self) -> EngineResult<Raster>;
    fn seek(&mut self, time: f64) -> EngineResult<()>;
    /// Clip length in seconds.
    fn duration(&self) -> f64;
    fn current_time(&self) -> f64;
}

/// Pre-decoded frames played back at a fixed rate.
#[derive(Debug, Clone)]
pub struct ClipSource {
    frames: Vec<Raster>,
    fps: f64,
    time: f64,
}

impl ClipSource {
    pub fn new(frames: Vec<Raster>, fps: f64) -> EngineResult<Self> {
        if frames.is_empty() {
            return Err(EngineError::Source("clip has no frames".into()));
        }
        if !(fps > 0.0) {
            return Err(EngineError::Source(format!("invalid clip rate {}", fps)));
        }
        Ok(Self {
            frames,
            fps,
            time: 0.0,
        })
    }

    fn frame_index(&self) -> usize {
        (frame_at(self.time, self.fps) as usize).min(self.frames.len() - 1)
    }
}

impl FrameSource for ClipSource {
    fn current_raster(&mut self) -> EngineResult<Raster> {
        Ok(self.frames[self.frame_index()].clone())
    }

    fn seek(&mut self, time: f64) -> EngineResult<()> {
        if !time.is_finite() {
            return Err(EngineError::Source(format!("cannot seek to {}", time)));
        }
        self.time = time.clamp(0.0, self.duration());
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.frames.len() as f64 / self.fps
    }

    fn current_time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(count: u8) -> ClipSource {
        let frames = (0..count)
            .map(|value| Raster::from_luma(1, 1, &[value]).unwrap())
            .collect();
        ClipSource::new(frames, 10.0).unwrap()
    }

    #[test]
    fn seek_selects_frame_by_time() {
        let mut source = clip(5);
        source.seek(0.25).unwrap();
        assert_eq!(source.current_raster().unwrap().luma(0, 0), 2);
        source.seek(9.0).unwrap();
        assert_eq!(source.current_time(), 0.5);
        assert_eq!(source.current_raster().unwrap().luma(0, 0), 4);
    }

    #[test]
    fn stepped_seeks_deliver_every_frame_once() {
        let frames = (0..40u8)
            .map(|value| Raster::from_luma(1, 1, &[value]).unwrap())
            .collect();
        let mut source = ClipSource::new(frames, 30.0).unwrap();
        let period = 1.0 / 30.0;
        let delivered: Vec<u8> = (1..40)
            .map(|k| {
                source.seek(k as f64 * period).unwrap();
                source.current_raster().unwrap().luma(0, 0)
            })
            .collect();
        let expected: Vec<u8> = (1..40).collect();
        assert_eq!(delivered, expected);
    }

    #[test]
    fn frame_at_absorbs_float_drift() {
        for fps in [24.0, 25.0, 30.0, 60.0] {
            let period = 1.0 / fps;
            for k in 0..200u64 {
                assert_eq!(frame_at(k as f64 * period, fps), k);
            }
        }
    }

    #[test]
    fn empty_clip_is_rejected() {
        assert!(ClipSource::new(Vec::new(), 30.0).is_err());
    }
}
