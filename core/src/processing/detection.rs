use crate::config::EngineConfig;
use crate::prelude::{Point2, Roi, TrackingPoint};
use crate::processing::edges::GradientMap;
use log::debug;

/// Central region used when no ROI is given, `margin` trimmed off each side.
pub fn default_region(width: usize, height: usize, margin: f32) -> Roi {
    let margin = margin.clamp(0.0, 0.45);
    let mx = width as f32 * margin;
    let my = height as f32 * margin;
    Roi::new(mx, my, width as f32 - 2.0 * mx, height as f32 - 2.0 * my)
}

/// Seeds tracking points on strong edges inside `roi`.
///
/// Cells of a `grid_step` lattice are visited row-major, top to bottom and
/// left to right; a cell becomes a point when its magnitude exceeds
/// `threshold`. Ids follow that scan order. An empty result is normal.
pub fn detect_walls(
    gradient: &GradientMap,
    roi: Option<&Roi>,
    config: &EngineConfig,
) -> Vec<TrackingPoint> {
    let region = roi
        .copied()
        .unwrap_or_else(|| {
            default_region(gradient.width(), gradient.height(), config.default_margin)
        })
        .clamp(gradient.width(), gradient.height());
    let Some(region) = region else {
        return Vec::new();
    };

    let x_start = region.x.ceil() as usize;
    let y_start = region.y.ceil() as usize;
    let x_end = ((region.x + region.w).floor() as usize).min(gradient.width());
    let y_end = ((region.y + region.h).floor() as usize).min(gradient.height());

    let mut points = Vec::new();
    for y in (y_start..y_end).step_by(config.detection_grid_step) {
        for x in (x_start..x_end).step_by(config.detection_grid_step) {
            if gradient.at(x, y) > config.detection_threshold {
                points.push(TrackingPoint::seeded(
                    points.len(),
                    Point2::new(x as f32, y as f32),
                ));
            }
        }
    }
    debug!(
        "wall detection sampled {:?} and seeded {} points",
        region,
        points.len()
    );
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::edges::sobel;
    use crate::processing::raster::Raster;

    fn frame_with_bright_square() -> Raster {
        let (width, height) = (100, 100);
        let luma: Vec<u8> = (0..width * height)
            .map(|idx| {
                let (x, y) = (idx % width, idx / width);
                if (30..70).contains(&x) && (30..70).contains(&y) {
                    255
                } else {
                    0
                }
            })
            .collect();
        Raster::from_luma(width, height, &luma).unwrap()
    }

    fn config(step: usize) -> EngineConfig {
        EngineConfig {
            detection_grid_step: step,
            ..Default::default()
        }
    }

    #[test]
    fn seeds_follow_row_major_order() {
        let gradient = sobel(&frame_with_bright_square());
        let roi = Roi::new(0.0, 0.0, 100.0, 100.0);
        let points = detect_walls(&gradient, Some(&roi), &config(10));
        assert!(!points.is_empty());
        for pair in points.windows(2) {
            let (a, b) = (pair[0].initial, pair[1].initial);
            assert!(a.y < b.y || (a.y == b.y && a.x < b.x));
        }
        assert!(points.iter().enumerate().all(|(idx, p)| p.id == idx));
        assert!(points.iter().all(|p| p.initial == p.current && p.strain == 0.0));
    }

    #[test]
    fn seeds_lie_on_square_edges() {
        let gradient = sobel(&frame_with_bright_square());
        let points = detect_walls(&gradient, Some(&Roi::new(0.0, 0.0, 100.0, 100.0)), &config(10));
        for point in &points {
            let on_vertical = point.initial.x == 30.0 || point.initial.x == 70.0;
            let on_horizontal = point.initial.y == 30.0 || point.initial.y == 70.0;
            assert!(on_vertical || on_horizontal, "{:?}", point.initial);
        }
    }

    #[test]
    fn roi_excluding_edges_yields_nothing() {
        let gradient = sobel(&frame_with_bright_square());
        let roi = Roi::new(40.0, 40.0, 20.0, 20.0);
        assert!(detect_walls(&gradient, Some(&roi), &config(5)).is_empty());
    }

    #[test]
    fn default_region_trims_margins() {
        let region = default_region(600, 450, 0.15);
        assert!((region.x - 90.0).abs() < 1e-3);
        assert!((region.y - 67.5).abs() < 1e-3);
        assert!((region.w - 420.0).abs() < 1e-3);
        assert!((region.h - 315.0).abs() < 1e-3);
    }
}
