use crate::prelude::{Point2, TrackingPoint};
use std::f32::consts::PI;

/// Segment count of the AHA 17-segment model.
pub const SEGMENT_COUNT: usize = 17;

/// Mean strain per angular sector around `center`.
///
/// Sector 0 starts at angle -pi (pointing left) and sectors advance
/// clockwise in image coordinates. Sectors without points report 0.
pub fn segmental_strain(points: &[TrackingPoint], center: Point2) -> [f32; SEGMENT_COUNT] {
    let mut sums = [0.0f32; SEGMENT_COUNT];
    let mut counts = [0usize; SEGMENT_COUNT];
    for point in points {
        let angle = (point.initial.y - center.y).atan2(point.initial.x - center.x);
        let fraction = (angle + PI) / (2.0 * PI);
        let sector = ((fraction * SEGMENT_COUNT as f32) as usize).min(SEGMENT_COUNT - 1);
        sums[sector] += point.strain;
        counts[sector] += 1;
    }

    let mut out = [0.0f32; SEGMENT_COUNT];
    for (slot, (sum, count)) in out.iter_mut().zip(sums.iter().zip(counts.iter())) {
        if *count > 0 {
            *slot = sum / *count as f32;
        }
    }
    out
}

/// Per-segment mean of two maps.
pub fn combine_segments(a: &[f32], b: &[f32]) -> Vec<f32> {
    a.iter().zip(b.iter()).map(|(x, y)| (x + y) / 2.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_with_strain(id: usize, x: f32, y: f32, strain: f32) -> TrackingPoint {
        let mut point = TrackingPoint::seeded(id, Point2::new(x, y));
        point.strain = strain;
        point
    }

    #[test]
    fn points_on_same_side_share_a_segment() {
        let center = Point2::new(0.0, 0.0);
        let points = [
            point_with_strain(0, 10.0, 0.1, -10.0),
            point_with_strain(1, 20.0, 0.2, -20.0),
        ];
        let map = segmental_strain(&points, center);
        let filled: Vec<f32> = map.iter().copied().filter(|v| *v != 0.0).collect();
        assert_eq!(filled, vec![-15.0]);
    }

    #[test]
    fn empty_input_gives_zero_map() {
        assert_eq!(segmental_strain(&[], Point2::default()), [0.0; SEGMENT_COUNT]);
    }

    #[test]
    fn combined_segments_average_pairwise() {
        assert_eq!(combine_segments(&[2.0, -4.0], &[4.0, 0.0]), vec![3.0, -2.0]);
    }
}
