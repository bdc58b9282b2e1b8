use crate::prelude::Point2;

/// Reported when no contour area has been observed yet.
pub const PLACEHOLDER_EF: f32 = 55.0;
/// Lowest ejection fraction reported by the area proxy.
pub const MIN_REPORTED_EF: f32 = 20.0;
/// Highest ejection fraction reported by the area proxy.
pub const MAX_REPORTED_EF: f32 = 85.0;

/// Area enclosed by `points`, traced in centroid-angle order.
///
/// Fewer than three points enclose nothing.
pub fn polygon_area(points: &[Point2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let count = points.len() as f64;
    let cx = points.iter().map(|p| p.x as f64).sum::<f64>() / count;
    let cy = points.iter().map(|p| p.y as f64).sum::<f64>() / count;

    let mut ordered: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    ordered.sort_by(|a, b| {
        let angle_a = (a.1 - cy).atan2(a.0 - cx);
        let angle_b = (b.1 - cy).atan2(b.0 - cx);
        angle_a.total_cmp(&angle_b)
    });

    let twice_area: f64 = ordered
        .iter()
        .zip(ordered.iter().cycle().skip(1))
        .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
        .sum();
    (twice_area.abs() / 2.0) as f32
}

/// Running contour-area extrema of one view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AreaExtrema {
    max: f32,
    min: Option<f32>,
}

impl AreaExtrema {
    pub fn observe(&mut self, area: f32) {
        if area <= 0.0 {
            return;
        }
        self.max = self.max.max(area);
        self.min = Some(self.min.map_or(area, |min| min.min(area)));
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn min(&self) -> f32 {
        self.min.unwrap_or(0.0)
    }

    pub fn ejection_fraction(&self) -> f32 {
        ejection_fraction(self.max(), self.min())
    }
}

/// Fractional area change in percent, clamped to the reportable range.
pub fn ejection_fraction(max_area: f32, min_area: f32) -> f32 {
    if max_area <= 0.0 {
        return PLACEHOLDER_EF;
    }
    ((max_area - min_area) / max_area * 100.0).clamp(MIN_REPORTED_EF, MAX_REPORTED_EF)
}
