use crate::config::EngineConfig;
use crate::interface::frame_source::FrameSource;
use crate::interface::sink::PresentationSink;
use crate::math::stats::StatsHelper;
use crate::prelude::{EngineError, EngineResult, Roi, View};
use crate::processing::segments::{combine_segments, SEGMENT_COUNT};
use crate::session::scheduler::{CancelSignal, Scheduler};
use crate::session::view_session::{TickOutcome, ViewMetrics, ViewSession};
use crate::telemetry::EngineMetrics;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Final output of a completed session; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ejection_fraction: f32,
    pub per_view: Vec<ViewMetrics>,
    pub segmental_map: Vec<f32>,
}

impl AnalysisResult {
    /// Result of a single-view session.
    pub fn single(metrics: ViewMetrics) -> Self {
        Self {
            ejection_fraction: metrics.ejection_fraction,
            segmental_map: metrics.segmental_map.clone(),
            per_view: vec![metrics],
        }
    }

    /// Combines two completed views; EF and segments are per-view means.
    pub fn biplane(first: ViewMetrics, second: ViewMetrics) -> Self {
        Self {
            ejection_fraction: biplane_ejection_fraction(
                first.ejection_fraction,
                second.ejection_fraction,
            ),
            segmental_map: combine_segments(&first.segmental_map, &second.segmental_map),
            per_view: vec![first, second],
        }
    }

    /// Mean of the per-view peak strains.
    pub fn global_strain(&self) -> f32 {
        let peaks: Vec<f32> = self.per_view.iter().map(|m| m.peak_strain).collect();
        StatsHelper::mean(&peaks)
    }

    /// Mean of the views that produced a heart-rate estimate.
    pub fn heart_rate_bpm(&self) -> Option<f32> {
        let rates: Vec<f32> = self
            .per_view
            .iter()
            .filter_map(|m| m.heart_rate_bpm)
            .collect();
        (!rates.is_empty()).then(|| StatsHelper::mean(&rates))
    }

    pub fn view(&self, view: View) -> Option<&ViewMetrics> {
        self.per_view.iter().find(|m| m.view == view)
    }
}

pub fn biplane_ejection_fraction(first: f32, second: f32) -> f32 {
    (first + second) / 2.0
}

/// Drives the two-view frame-stepped protocol.
///
/// Views are walked strictly one after the other in [`View::ALL`] order; each
/// starts from a fresh detection and the results are only combined once both
/// are completed.
pub struct BiplaneOrchestrator {
    config: EngineConfig,
    sessions: [ViewSession; 2],
    metrics: Arc<EngineMetrics>,
    result: Option<AnalysisResult>,
}

impl BiplaneOrchestrator {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        Self::with_metrics(config, Arc::new(EngineMetrics::new()))
    }

    pub fn with_metrics(config: EngineConfig, metrics: Arc<EngineMetrics>) -> EngineResult<Self> {
        let sessions = [
            ViewSession::new(View::A4c, config.clone())?,
            ViewSession::new(View::A2c, config.clone())?,
        ];
        Ok(Self {
            config,
            sessions,
            metrics,
            result: None,
        })
    }

    pub fn session(&self, view: View) -> &ViewSession {
        &self.sessions[view.index()]
    }

    pub fn session_mut(&mut self, view: View) -> &mut ViewSession {
        &mut self.sessions[view.index()]
    }

    pub fn set_roi(&mut self, view: View, roi: Roi) -> EngineResult<()> {
        self.session_mut(view).set_roi(roi)
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn reset(&mut self) {
        for session in self.sessions.iter_mut() {
            session.reset();
        }
        self.result = None;
    }

    /// Walks both clips and returns the combined result.
    ///
    /// Both views must have an ROI before anything runs. `sources` is indexed
    /// like [`View::ALL`].
    pub async fn run<S: Scheduler>(
        &mut self,
        sources: [&mut dyn FrameSource; 2],
        sink: &mut dyn PresentationSink,
        scheduler: &mut S,
        cancel: &CancelSignal,
    ) -> EngineResult<AnalysisResult> {
        for view in View::ALL {
            if self.session(view).roi().is_none() {
                return Err(EngineError::MissingRoi(view));
            }
        }
        self.result = None;

        for (view, source) in View::ALL.into_iter().zip(sources) {
            self.walk_view(view, source, sink, scheduler, cancel).await?;
        }

        let result = self.combine()?;
        sink.on_result(&result);
        Ok(result)
    }

    async fn walk_view<S: Scheduler>(
        &mut self,
        view: View,
        source: &mut dyn FrameSource,
        sink: &mut dyn PresentationSink,
        scheduler: &mut S,
        cancel: &CancelSignal,
    ) -> EngineResult<()> {
        let period = self.config.frame_period();
        let session = &mut self.sessions[view.index()];
        session.restart();
        source.seek(0.0)?;
        let duration = source.duration();
        info!("{} walk started over {:.2}s", view, duration);

        let mut frame_index = 0u64;
        while (frame_index as f64) * period < duration {
            if cancel.is_cancelled() {
                info!("{} walk cancelled at frame {}", view, frame_index);
                return Err(EngineError::Cancelled);
            }
            frame_index += 1;
            let time = frame_index as f64 * period;
            source.seek(time)?;
            let frame = source.current_raster()?;

            let outcome = session.tick(&frame, time)?;
            self.metrics.record_tick();
            if outcome == TickOutcome::Deferred {
                self.metrics.record_deferred_detection();
            }
            sink.on_tick(&session.tick_frame(time));
            scheduler.yield_now().await;
        }

        let metrics = session.complete();
        debug!("{} metrics {:?}", view, metrics);
        Ok(())
    }

    /// Combines both views once each is completed.
    pub fn combine(&mut self) -> EngineResult<AnalysisResult> {
        for view in View::ALL {
            if !self.session(view).is_processed() {
                return Err(EngineError::ViewNotCompleted(view));
            }
        }
        let result = AnalysisResult::biplane(
            self.session(View::A4c).metrics(),
            self.session(View::A2c).metrics(),
        );
        debug_assert_eq!(result.segmental_map.len(), SEGMENT_COUNT);
        info!("biplane EF {:.1}%", result.ejection_fraction);
        self.result = Some(result.clone());
        Ok(result)
    }
}
