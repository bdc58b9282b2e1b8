use crate::prelude::{StrainSample, TrackingPoint, View};
use crate::processing::raster::Raster;
use crate::session::{AnalysisResult, SessionPhase};

/// Everything the presentation layer needs to draw one processed tick.
#[derive(Debug, Clone, Copy)]
pub struct TickFrame<'a> {
    pub view: View,
    pub time: f64,
    pub phase: SessionPhase,
    pub points: &'a [TrackingPoint],
    pub mask: Option<&'a Raster>,
    pub sample: Option<StrainSample>,
    pub area: f32,
}

/// Receiver of per-tick output and completed analyses.
pub trait PresentationSink {
    fn on_tick(&mut self, frame: &TickFrame<'_>);
    fn on_result(&mut self, result: &AnalysisResult);
}

/// Sink that discards everything, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn on_tick(&mut self, _frame: &TickFrame<'_>) {}

    fn on_result(&mut self, _result: &AnalysisResult) {}
}
