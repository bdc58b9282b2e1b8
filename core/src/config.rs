use crate::prelude::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Logical canvas width every source frame is resampled to.
pub const LOGICAL_WIDTH: usize = 600;
/// Logical canvas height every source frame is resampled to.
pub const LOGICAL_HEIGHT: usize = 450;

/// Tunables shared by every engine component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    /// Edge length of the square matching template.
    pub block_size: usize,
    /// Full width of the displacement search; offsets span +/- half of it.
    pub search_window: usize,
    pub search_step: usize,
    pub detection_grid_step: usize,
    pub detection_threshold: f32,
    /// Fraction of the frame excluded on each side when detecting without an ROI.
    pub default_margin: f32,
    pub overlay_threshold: f32,
    pub history_capacity: usize,
    pub fps: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: LOGICAL_WIDTH,
            height: LOGICAL_HEIGHT,
            block_size: 16,
            search_window: 20,
            search_step: 2,
            detection_grid_step: 20,
            detection_threshold: 150.0,
            default_margin: 0.15,
            overlay_threshold: 70.0,
            history_capacity: 100,
            fps: 30.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.width < 3 || self.height < 3 {
            return Err(EngineError::InvalidConfig(format!(
                "logical frame {}x{} is too small",
                self.width, self.height
            )));
        }
        if self.block_size == 0 || self.search_step == 0 || self.detection_grid_step == 0 {
            return Err(EngineError::InvalidConfig(
                "block size, search step and grid step must be non-zero".into(),
            ));
        }
        if (self.search_window / 2) % self.search_step != 0 {
            return Err(EngineError::InvalidConfig(format!(
                "half search window {} is not a multiple of step {}",
                self.search_window / 2,
                self.search_step
            )));
        }
        if self.history_capacity == 0 {
            return Err(EngineError::InvalidConfig("history capacity is zero".into()));
        }
        if !(self.fps > 0.0) {
            return Err(EngineError::InvalidConfig(format!("fps {} must be positive", self.fps)));
        }
        Ok(())
    }

    pub fn frame_period(&self) -> f64 {
        1.0 / self.fps
    }
}
