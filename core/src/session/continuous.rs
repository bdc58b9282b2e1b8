use crate::interface::frame_source::FrameSource;
use crate::interface::sink::PresentationSink;
use crate::prelude::EngineResult;
use crate::session::biplane::AnalysisResult;
use crate::session::scheduler::CancelSignal;
use crate::session::view_session::{TickOutcome, ViewSession};
use crate::telemetry::EngineMetrics;
use log::{debug, info};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Totals of one continuous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContinuousSummary {
    pub ticks: usize,
    pub dropped_frames: usize,
}

/// Real-time loop: one tick per display-rate callback until cancelled.
///
/// Deadlines missed while a tick was still running are skipped and counted
/// as dropped frames; the source playhead still advances past them, wrapping
/// at the end of the clip so a recorded loop plays indefinitely.
pub async fn run_continuous(
    session: &mut ViewSession,
    source: &mut dyn FrameSource,
    sink: &mut dyn PresentationSink,
    metrics: &EngineMetrics,
    cancel: &mut CancelSignal,
    max_ticks: Option<usize>,
) -> EngineResult<ContinuousSummary> {
    let period_secs = session.config().frame_period();
    let period = Duration::from_secs_f64(period_secs);
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut summary = ContinuousSummary::default();
    let mut started = None;
    let mut last_deadline = None;
    info!("{} continuous tracking started", session.view());

    while max_ticks.map_or(true, |limit| summary.ticks < limit) {
        let deadline = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            deadline = interval.tick() => deadline,
        };

        let elapsed_periods = match last_deadline {
            Some(previous) => {
                let gap = deadline.duration_since(previous).as_secs_f64();
                ((gap / period_secs).round() as usize).max(1)
            }
            None => 1,
        };
        if elapsed_periods > 1 {
            let dropped = elapsed_periods - 1;
            summary.dropped_frames += dropped;
            metrics.record_dropped(dropped);
            debug!("{} dropped {} frames", session.view(), dropped);
        }
        last_deadline = Some(deadline);
        let origin = *started.get_or_insert(deadline);

        advance_playhead(source, elapsed_periods as f64 * period_secs)?;
        let frame = source.current_raster()?;
        let time = deadline.duration_since(origin).as_secs_f64();

        let outcome = session.tick(&frame, time)?;
        metrics.record_tick();
        if outcome == TickOutcome::Deferred {
            metrics.record_deferred_detection();
        }
        sink.on_tick(&session.tick_frame(time));
        summary.ticks += 1;
    }

    info!(
        "{} continuous tracking stopped after {} ticks ({} dropped)",
        session.view(),
        summary.ticks,
        summary.dropped_frames
    );
    Ok(summary)
}

/// Freezes the session and reports its single-view result.
pub fn finish_continuous(
    session: &mut ViewSession,
    sink: &mut dyn PresentationSink,
) -> AnalysisResult {
    let result = AnalysisResult::single(session.complete());
    sink.on_result(&result);
    result
}

fn advance_playhead(source: &mut dyn FrameSource, step: f64) -> EngineResult<()> {
    let duration = source.duration();
    let mut next = source.current_time() + step;
    if duration > 0.0 && next >= duration {
        next %= duration;
    }
    source.seek(next)
}
