use crate::prelude::{Point2, Roi, StrainSample, TrackingPoint};
use crate::processing::edges::StrainPolarity;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Sign applied to the raw radial deformation.
///
/// `+1.0` reports motion away from the reference center as positive
/// (lengthening) and motion toward it as negative (shortening), which is the
/// echocardiographic GLS convention: healthy contraction reads negative.
pub const STRAIN_POLARITY: f32 = 1.0;

/// Radial strain of `point` in percent, relative to `center`.
pub fn point_strain(point: &TrackingPoint, center: Point2) -> f32 {
    let dist_initial = point.initial.distance(center);
    let dist_current = point.current.distance(center);
    let base = if dist_initial == 0.0 { 1.0 } else { dist_initial };
    STRAIN_POLARITY * (dist_current - dist_initial) / base * 100.0
}

/// Recomputes `point.strain` and returns it.
pub fn update_strain(point: &mut TrackingPoint, center: Point2) -> f32 {
    point.strain = point_strain(point, center);
    point.strain
}

/// Mean strain over all points; 0 for an empty set.
pub fn aggregate_strain(points: &[TrackingPoint]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.strain).sum::<f32>() / points.len() as f32
}

/// ROI center when a region is set, otherwise the frame center.
pub fn reference_center(roi: Option<&Roi>, width: usize, height: usize) -> Point2 {
    match roi {
        Some(region) => region.center(),
        None => Point2::new(width as f32 / 2.0, height as f32 / 2.0),
    }
}

/// Overlay palette for an aggregate strain value.
pub fn polarity_of(aggregate: f32) -> StrainPolarity {
    if STRAIN_POLARITY * aggregate <= 0.0 {
        StrainPolarity::Favorable
    } else {
        StrainPolarity::Unfavorable
    }
}

/// Bounded FIFO of aggregate strain samples in temporal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainHistory {
    capacity: usize,
    samples: VecDeque<StrainSample>,
}

impl StrainHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Appends `sample`, evicting the oldest entry once over capacity.
    pub fn push(&mut self, sample: StrainSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn latest(&self) -> Option<StrainSample> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &StrainSample> {
        self.samples.iter()
    }

    pub fn values(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Sample with the largest magnitude, keeping its sign.
    pub fn peak(&self) -> Option<StrainSample> {
        self.samples
            .iter()
            .copied()
            .fold(None, |best: Option<StrainSample>, sample| match best {
                Some(current) if current.value.abs() >= sample.value.abs() => Some(current),
                _ => Some(sample),
            })
    }

    /// Time covered from the first to the last sample.
    pub fn span(&self) -> f64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_toward_center_is_negative() {
        let center = Point2::new(100.0, 100.0);
        let mut point = TrackingPoint::seeded(0, Point2::new(150.0, 100.0));
        point.current = Point2::new(140.0, 100.0);
        assert!((update_strain(&mut point, center) + 20.0).abs() < 1e-4);
        assert_eq!(polarity_of(point.strain), StrainPolarity::Favorable);
    }

    #[test]
    fn point_on_center_uses_unit_divisor() {
        let center = Point2::new(10.0, 10.0);
        let mut point = TrackingPoint::seeded(0, center);
        point.current = Point2::new(11.0, 10.0);
        assert!((point_strain(&point, center) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate_strain(&[]), 0.0);
    }

    #[test]
    fn reference_center_prefers_roi() {
        let roi = Roi::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(reference_center(Some(&roi), 600, 450), Point2::new(200.0, 100.0));
        assert_eq!(reference_center(None, 600, 450), Point2::new(300.0, 225.0));
    }

    #[test]
    fn history_keeps_most_recent_samples_in_order() {
        let mut history = StrainHistory::with_capacity(100);
        for idx in 0..130 {
            history.push(StrainSample {
                time: idx as f64,
                value: idx as f32,
            });
        }
        assert_eq!(history.len(), 100);
        let times: Vec<f64> = history.iter().map(|s| s.time).collect();
        let expected: Vec<f64> = (30..130).map(|t| t as f64).collect();
        assert_eq!(times, expected);
    }

    #[test]
    fn zero_capacity_still_keeps_latest_sample() {
        let mut history = StrainHistory::with_capacity(0);
        assert_eq!(history.capacity(), 1);
        history.push(StrainSample { time: 0.0, value: -2.0 });
        history.push(StrainSample { time: 1.0, value: -4.0 });
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().map(|s| s.time), Some(1.0));
    }

    #[test]
    fn peak_keeps_sign() {
        let mut history = StrainHistory::with_capacity(8);
        for (time, value) in [(0.0, -3.0), (1.0, -18.5), (2.0, 4.0)] {
            history.push(StrainSample { time, value });
        }
        assert_eq!(history.peak().map(|s| s.value), Some(-18.5));
    }
}
