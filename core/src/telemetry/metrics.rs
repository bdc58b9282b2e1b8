use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters describing how much work the engine did and what it skipped.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    ticks: AtomicUsize,
    dropped_frames: AtomicUsize,
    deferred_detections: AtomicUsize,
    advisory_fallbacks: AtomicUsize,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub ticks: usize,
    pub dropped_frames: usize,
    pub deferred_detections: usize,
    pub advisory_fallbacks: usize,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, frames: usize) {
        self.dropped_frames.fetch_add(frames, Ordering::Relaxed);
    }

    pub fn record_deferred_detection(&self) {
        self.deferred_detections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_advisory_fallback(&self) {
        self.advisory_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            dropped_frames: self.dropped_frames.load(Ordering::Relaxed),
            deferred_detections: self.deferred_detections.load(Ordering::Relaxed),
            advisory_fallbacks: self.advisory_fallbacks.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let metrics = EngineMetrics::new();
        metrics.record_tick();
        metrics.record_tick();
        metrics.record_dropped(3);
        metrics.record_advisory_fallback();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                ticks: 2,
                dropped_frames: 3,
                deferred_detections: 0,
                advisory_fallbacks: 1,
            }
        );
    }
}
