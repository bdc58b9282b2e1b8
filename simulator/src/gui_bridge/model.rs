use echocore::interface::TickFrame;
use echocore::session::SessionPhase;
use echocore::{AnalysisResult, StrainSample, TrackingPoint, View};
use serde::{Deserialize, Serialize};

/// Latest tick of one view, as served to the display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub view: View,
    pub time: f64,
    pub phase: SessionPhase,
    pub points: Vec<TrackingPoint>,
    pub sample: Option<StrainSample>,
    pub area: f32,
    /// Pixels of the diagnostic overlay that are not transparent.
    pub overlay_pixels: usize,
}

impl ViewSnapshot {
    pub fn from_frame(frame: &TickFrame<'_>) -> Self {
        Self {
            view: frame.view,
            time: frame.time,
            phase: frame.phase,
            points: frame.points.to_vec(),
            sample: frame.sample,
            area: frame.area,
            overlay_pixels: frame.mask.map_or(0, |mask| mask.count_opaque()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub views: Vec<ViewSnapshot>,
    pub result: Option<AnalysisResult>,
}

impl VisualizationModel {
    /// Replaces the snapshot of `snapshot.view`, keeping view order stable.
    pub fn update_view(&mut self, snapshot: ViewSnapshot) {
        match self.views.iter_mut().find(|v| v.view == snapshot.view) {
            Some(existing) => *existing = snapshot,
            None => {
                self.views.push(snapshot);
                self.views.sort_by_key(|v| v.view.index());
            }
        }
    }
}
