use crate::config::EngineConfig;
use crate::interface::sink::TickFrame;
use crate::math::heart_rate::estimate_heart_rate;
use crate::prelude::{
    EngineError, EngineResult, Point2, Roi, StrainSample, TrackingPoint, View,
};
use crate::processing::area::{polygon_area, AreaExtrema};
use crate::processing::block_match::BlockMatcher;
use crate::processing::detection::detect_walls;
use crate::processing::edges::{diagnostic_mask, sobel, StrainPolarity};
use crate::processing::frame_buffer::FrameBuffers;
use crate::processing::preprocess::prepare_frame;
use crate::processing::raster::Raster;
use crate::processing::segments::segmental_strain;
use crate::processing::strain::{
    aggregate_strain, polarity_of, reference_center, update_strain, StrainHistory,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Lifecycle of one view's tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    RoiDefined,
    Detecting,
    Tracking,
    Completed,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Frame buffered; nothing to analyse yet.
    Buffered,
    /// Detection ran and found no wall; it is retried next tick.
    Deferred,
    Detected(usize),
    Tracked { strain: f32, area: f32 },
    /// The session is completed and ignores further frames.
    Ignored,
}

/// Summary of one view, frozen once the view completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewMetrics {
    pub view: View,
    pub ejection_fraction: f32,
    /// Aggregate sample with the largest magnitude; the view's GLS.
    pub peak_strain: f32,
    pub max_area: f32,
    pub min_area: f32,
    pub samples: usize,
    pub heart_rate_bpm: Option<f32>,
    pub segmental_map: Vec<f32>,
}

/// Tracking state for one anatomical view.
pub struct ViewSession {
    view: View,
    config: EngineConfig,
    matcher: BlockMatcher,
    phase: SessionPhase,
    roi: Option<Roi>,
    points: Vec<TrackingPoint>,
    history: StrainHistory,
    extrema: AreaExtrema,
    buffers: FrameBuffers,
    mask: Option<Raster>,
    last_area: f32,
    frozen_ef: Option<f32>,
}

impl ViewSession {
    pub fn new(view: View, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            view,
            matcher: BlockMatcher::from_config(&config),
            phase: SessionPhase::Idle,
            roi: None,
            points: Vec::new(),
            history: StrainHistory::with_capacity(config.history_capacity),
            extrema: AreaExtrema::default(),
            buffers: FrameBuffers::new(config.width, config.height),
            mask: None,
            last_area: 0.0,
            frozen_ef: None,
            config,
        })
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn roi(&self) -> Option<&Roi> {
        self.roi.as_ref()
    }

    pub fn points(&self) -> &[TrackingPoint] {
        &self.points
    }

    pub fn history(&self) -> &StrainHistory {
        &self.history
    }

    pub fn mask(&self) -> Option<&Raster> {
        self.mask.as_ref()
    }

    pub fn max_area(&self) -> f32 {
        self.extrema.max()
    }

    pub fn min_area(&self) -> f32 {
        self.extrema.min()
    }

    pub fn is_processed(&self) -> bool {
        self.frozen_ef.is_some()
    }

    /// Frozen value once completed, live area-change estimate before.
    pub fn ejection_fraction(&self) -> f32 {
        self.frozen_ef
            .unwrap_or_else(|| self.extrema.ejection_fraction())
    }

    pub fn reference_center(&self) -> Point2 {
        reference_center(self.roi.as_ref(), self.config.width, self.config.height)
    }

    /// Stores `roi` clamped to the logical frame.
    pub fn set_roi(&mut self, roi: Roi) -> EngineResult<()> {
        let clamped = roi
            .clamp(self.config.width, self.config.height)
            .ok_or(EngineError::InvalidRoi)?;
        self.roi = Some(clamped);
        if self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::RoiDefined;
        }
        debug!("{} roi set to {:?}", self.view, clamped);
        Ok(())
    }

    /// Adds a manually placed wall point; tracking starts on the next tick.
    pub fn place_point(&mut self, at: Point2) -> EngineResult<usize> {
        if self.phase == SessionPhase::Completed {
            return Err(EngineError::SessionCompleted(self.view));
        }
        let id = self.points.len();
        self.points.push(TrackingPoint::seeded(id, at));
        self.phase = SessionPhase::Tracking;
        Ok(id)
    }

    /// Back to `Idle`: ROI, points, history, extrema and mask are cleared.
    pub fn reset(&mut self) {
        self.roi = None;
        self.clear_tracking();
        self.phase = SessionPhase::Idle;
        info!("{} session reset", self.view);
    }

    /// Clears tracking state but keeps the ROI, ready for a fresh detection.
    pub fn restart(&mut self) {
        self.clear_tracking();
        self.phase = if self.roi.is_some() {
            SessionPhase::RoiDefined
        } else {
            SessionPhase::Idle
        };
    }

    fn clear_tracking(&mut self) {
        self.points.clear();
        self.history.clear();
        self.extrema = AreaExtrema::default();
        self.buffers.reset();
        self.mask = None;
        self.last_area = 0.0;
        self.frozen_ef = None;
    }

    /// Runs one processing step on a raw source frame.
    pub fn tick(&mut self, source: &Raster, time: f64) -> EngineResult<TickOutcome> {
        if self.phase == SessionPhase::Completed {
            warn!("{} is completed; frame at {:.3}s ignored", self.view, time);
            return Ok(TickOutcome::Ignored);
        }

        let frame = prepare_frame(source, self.config.width, self.config.height);
        self.buffers.push(frame)?;

        match self.phase {
            SessionPhase::Idle => Ok(TickOutcome::Buffered),
            SessionPhase::RoiDefined | SessionPhase::Detecting => Ok(self.detect()),
            SessionPhase::Tracking => Ok(self.track(time)),
            SessionPhase::Completed => Ok(TickOutcome::Ignored),
        }
    }

    fn detect(&mut self) -> TickOutcome {
        self.phase = SessionPhase::Detecting;
        let Some(current) = self.buffers.current() else {
            return TickOutcome::Buffered;
        };
        let gradient = sobel(current);
        let points = detect_walls(&gradient, self.roi.as_ref(), &self.config);
        if points.is_empty() {
            debug!("{} detection found no wall, deferring", self.view);
            return TickOutcome::Deferred;
        }

        self.mask = Some(diagnostic_mask(
            &gradient,
            self.roi.as_ref(),
            StrainPolarity::Favorable,
            self.config.overlay_threshold,
        ));
        let count = points.len();
        self.points = points;
        self.phase = SessionPhase::Tracking;
        info!("{} detected {} wall points", self.view, count);
        TickOutcome::Detected(count)
    }

    fn track(&mut self, time: f64) -> TickOutcome {
        let center = self.reference_center();
        let Some((previous, current)) = self.buffers.pair() else {
            return TickOutcome::Buffered;
        };

        for point in self.points.iter_mut() {
            point.current = self.matcher.track(previous, current, point.current);
            update_strain(point, center);
        }

        let strain = aggregate_strain(&self.points);
        self.history.push(StrainSample { time, value: strain });

        let contour: Vec<Point2> = self.points.iter().map(|p| p.current).collect();
        let area = polygon_area(&contour);
        self.extrema.observe(area);
        self.last_area = area;

        self.mask = Some(diagnostic_mask(
            &sobel(current),
            self.roi.as_ref(),
            polarity_of(strain),
            self.config.overlay_threshold,
        ));
        debug!(
            "{} t={:.3}s strain {:.2}% area {:.1}",
            self.view, time, strain, area
        );
        TickOutcome::Tracked { strain, area }
    }

    /// Marks the view completed and freezes its ejection fraction.
    pub fn complete(&mut self) -> ViewMetrics {
        if self.frozen_ef.is_none() {
            self.frozen_ef = Some(self.extrema.ejection_fraction());
            self.phase = SessionPhase::Completed;
            info!(
                "{} completed: EF {:.1}% over {} samples",
                self.view,
                self.ejection_fraction(),
                self.history.len()
            );
        }
        self.metrics()
    }

    pub fn metrics(&self) -> ViewMetrics {
        ViewMetrics {
            view: self.view,
            ejection_fraction: self.ejection_fraction(),
            peak_strain: self.history.peak().map_or(0.0, |s| s.value),
            max_area: self.extrema.max(),
            min_area: self.extrema.min(),
            samples: self.history.len(),
            heart_rate_bpm: estimate_heart_rate(&self.history),
            segmental_map: segmental_strain(&self.points, self.reference_center()).to_vec(),
        }
    }

    /// Borrowed view of the latest tick for the presentation layer.
    pub fn tick_frame(&self, time: f64) -> TickFrame<'_> {
        TickFrame {
            view: self.view,
            time,
            phase: self.phase,
            points: &self.points,
            mask: self.mask.as_ref(),
            sample: self.history.latest(),
            area: self.last_area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EngineConfig {
        EngineConfig {
            width: 120,
            height: 120,
            block_size: 9,
            search_window: 8,
            detection_grid_step: 6,
            detection_threshold: 150.0,
            ..Default::default()
        }
    }

    /// Bright ring of radius `radius` with a hashed texture on the wall.
    fn ring_frame(radius: f32) -> Raster {
        let (width, height) = (120usize, 120usize);
        let luma: Vec<u8> = (0..width * height)
            .map(|idx| {
                let (x, y) = ((idx % width) as f32, (idx / width) as f32);
                let dist = ((x - 60.0).powi(2) + (y - 60.0).powi(2)).sqrt();
                if (dist - radius).abs() < 5.0 {
                    200 + ((idx * 31) % 40) as u8
                } else {
                    10
                }
            })
            .collect();
        Raster::from_luma(width, height, &luma).unwrap()
    }

    #[test]
    fn phases_follow_roi_and_detection() {
        let mut session = ViewSession::new(View::A4c, small_config()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.tick(&ring_frame(30.0), 0.0).unwrap(), TickOutcome::Buffered);

        session.set_roi(Roi::new(10.0, 10.0, 100.0, 100.0)).unwrap();
        assert_eq!(session.phase(), SessionPhase::RoiDefined);

        let outcome = session.tick(&ring_frame(30.0), 0.1).unwrap();
        assert!(matches!(outcome, TickOutcome::Detected(n) if n > 0));
        assert_eq!(session.phase(), SessionPhase::Tracking);

        let outcome = session.tick(&ring_frame(30.0), 0.2).unwrap();
        assert!(matches!(outcome, TickOutcome::Tracked { .. }));
        assert_eq!(session.history().len(), 1);
        assert!(session.mask().is_some());
    }

    #[test]
    fn featureless_frames_defer_detection() {
        let mut session = ViewSession::new(View::A2c, small_config()).unwrap();
        session.set_roi(Roi::new(0.0, 0.0, 120.0, 120.0)).unwrap();
        let flat = Raster::from_luma(120, 120, &[50; 120 * 120]).unwrap();
        assert_eq!(session.tick(&flat, 0.0).unwrap(), TickOutcome::Deferred);
        assert_eq!(session.phase(), SessionPhase::Detecting);
        assert!(session.points().is_empty());
    }

    #[test]
    fn static_frames_report_zero_strain() {
        let mut session = ViewSession::new(View::A4c, small_config()).unwrap();
        session.set_roi(Roi::new(10.0, 10.0, 100.0, 100.0)).unwrap();
        for step in 0..4 {
            session.tick(&ring_frame(30.0), step as f64 * 0.1).unwrap();
        }
        assert!(session
            .history()
            .iter()
            .all(|sample| sample.value.abs() < 1e-6));
        assert!(session.points().iter().all(|p| p.initial == p.current));
    }

    #[test]
    fn complete_freezes_ejection_fraction() {
        let mut session = ViewSession::new(View::A4c, small_config()).unwrap();
        session.set_roi(Roi::new(10.0, 10.0, 100.0, 100.0)).unwrap();
        session.tick(&ring_frame(30.0), 0.0).unwrap();
        session.tick(&ring_frame(30.0), 0.1).unwrap();
        let metrics = session.complete();
        assert!(session.is_processed());
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(metrics.ejection_fraction, session.ejection_fraction());
        assert_eq!(session.tick(&ring_frame(30.0), 0.2).unwrap(), TickOutcome::Ignored);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut session = ViewSession::new(View::A4c, small_config()).unwrap();
        session.set_roi(Roi::new(10.0, 10.0, 100.0, 100.0)).unwrap();
        session.tick(&ring_frame(30.0), 0.0).unwrap();
        session.tick(&ring_frame(30.0), 0.1).unwrap();
        session.reset();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.roi().is_none());
        assert!(session.points().is_empty());
        assert!(session.history().is_empty());
        assert!(session.mask().is_none());
        assert_eq!(session.max_area(), 0.0);
    }

    #[test]
    fn manual_points_start_tracking() {
        let mut session = ViewSession::new(View::A4c, small_config()).unwrap();
        let id = session.place_point(Point2::new(90.0, 60.0)).unwrap();
        assert_eq!(id, 0);
        assert_eq!(session.phase(), SessionPhase::Tracking);
    }

    #[test]
    fn roi_outside_frame_is_rejected() {
        let mut session = ViewSession::new(View::A4c, small_config()).unwrap();
        assert!(matches!(
            session.set_roi(Roi::new(500.0, 500.0, 10.0, 10.0)),
            Err(EngineError::InvalidRoi)
        ));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }
}
