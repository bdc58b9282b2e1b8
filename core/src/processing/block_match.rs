use crate::config::EngineConfig;
use crate::prelude::Point2;
use crate::processing::raster::Raster;
use ndarray::{s, ArrayView2};

/// Sum-of-absolute-differences block matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMatcher {
    block_size: usize,
    search_half: i64,
    step: usize,
}

impl BlockMatcher {
    pub fn new(block_size: usize, search_window: usize, step: usize) -> Self {
        Self {
            block_size: block_size.max(1),
            search_half: (search_window / 2) as i64,
            step: step.max(1),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.block_size, config.search_window, config.search_step)
    }

    /// Finds where the neighbourhood of `point` in `prev` moved to in `curr`.
    ///
    /// Returns `point` unchanged when its template leaves the raster or the
    /// rasters differ in shape. The zero offset is scored first so it wins
    /// every tie; the remaining offsets are scanned `dy` outer, `dx` inner,
    /// and only a strictly lower SAD replaces the current best.
    pub fn track(&self, prev: &Raster, curr: &Raster, point: Point2) -> Point2 {
        if !prev.same_shape(curr) {
            return point;
        }
        let prev_luma = prev.luma_view();
        let curr_luma = curr.luma_view();
        let (height, width) = prev_luma.dim();

        let Some(origin) = self.block_origin(point, 0, 0, width, height) else {
            return point;
        };
        let template = prev_luma.slice(s![
            origin.1..origin.1 + self.block_size,
            origin.0..origin.0 + self.block_size
        ]);

        let mut best_offset = (0i64, 0i64);
        let mut best_score = sad(&template, &curr_luma, origin, self.block_size, u32::MAX);

        let half = self.search_half;
        for dy in (-half..=half).step_by(self.step) {
            for dx in (-half..=half).step_by(self.step) {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(candidate) = self.block_origin(point, dx, dy, width, height) else {
                    continue;
                };
                let score = sad(&template, &curr_luma, candidate, self.block_size, best_score);
                if score < best_score {
                    best_score = score;
                    best_offset = (dx, dy);
                }
            }
        }

        point.offset(best_offset.0 as f32, best_offset.1 as f32)
    }

    /// Top-left corner of the block centred on `point + (dx, dy)`, if it fits.
    fn block_origin(
        &self,
        point: Point2,
        dx: i64,
        dy: i64,
        width: usize,
        height: usize,
    ) -> Option<(usize, usize)> {
        let half = (self.block_size / 2) as i64;
        let x0 = point.x.round() as i64 + dx - half;
        let y0 = point.y.round() as i64 + dy - half;
        let block = self.block_size as i64;
        if x0 < 0 || y0 < 0 || x0 + block > width as i64 || y0 + block > height as i64 {
            return None;
        }
        Some((x0 as usize, y0 as usize))
    }
}

/// SAD between `template` and the block of `frame` at `origin`.
///
/// Stops summing once the running total reaches `limit`; such a candidate
/// can no longer beat the current best.
fn sad(
    template: &ArrayView2<'_, u8>,
    frame: &ArrayView2<'_, u8>,
    origin: (usize, usize),
    block: usize,
    limit: u32,
) -> u32 {
    let mut total = 0u32;
    for row in 0..block {
        let expected = template.row(row);
        let observed = frame.slice(s![origin.1 + row, origin.0..origin.0 + block]);
        total += expected
            .iter()
            .zip(observed.iter())
            .map(|(&a, &b)| a.abs_diff(b) as u32)
            .sum::<u32>();
        if total >= limit {
            return total;
        }
    }
    total
}

/// Tracks one point with the default sub-sampled search step of 2.
pub fn track(
    prev: &Raster,
    curr: &Raster,
    point: Point2,
    block_size: usize,
    search_window: usize,
) -> Point2 {
    BlockMatcher::new(block_size, search_window, 2).track(prev, curr, point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(width: usize, height: usize, shift_x: usize, shift_y: usize) -> Raster {
        let luma: Vec<u8> = (0..width * height)
            .map(|idx| {
                let x = (idx % width).wrapping_sub(shift_x) as u64;
                let y = (idx / width).wrapping_sub(shift_y) as u64;
                let hash = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
                (hash % 251) as u8
            })
            .collect();
        Raster::from_luma(width, height, &luma).unwrap()
    }

    #[test]
    fn identical_frames_yield_zero_displacement() {
        let frame = textured(64, 64, 0, 0);
        let point = Point2::new(32.0, 30.0);
        assert_eq!(track(&frame, &frame, point, 9, 10), point);
    }

    #[test]
    fn uniform_frames_keep_point_in_place() {
        let frame = Raster::from_luma(40, 40, &[90; 1600]).unwrap();
        let point = Point2::new(20.0, 20.0);
        assert_eq!(track(&frame, &frame, point, 8, 10), point);
    }

    #[test]
    fn recovers_even_translation() {
        let prev = textured(80, 80, 0, 0);
        let curr = textured(80, 80, 4, 2);
        let moved = track(&prev, &curr, Point2::new(40.0, 40.0), 11, 12);
        assert_eq!(moved, Point2::new(44.0, 42.0));
    }

    #[test]
    fn template_crossing_border_is_a_no_op() {
        let prev = textured(64, 64, 0, 0);
        let curr = textured(64, 64, 2, 0);
        let point = Point2::new(3.0, 30.0);
        assert_eq!(track(&prev, &curr, point, 16, 10), point);
    }

    #[test]
    fn candidates_outside_frame_are_skipped() {
        let prev = textured(40, 40, 0, 0);
        let curr = textured(40, 40, 0, 0);
        let point = Point2::new(8.0, 8.0);
        assert_eq!(track(&prev, &curr, point, 16, 20), point);
    }

    #[test]
    fn mismatched_shapes_leave_point_unchanged() {
        let prev = textured(40, 40, 0, 0);
        let curr = textured(50, 40, 0, 0);
        let point = Point2::new(20.0, 20.0);
        assert_eq!(track(&prev, &curr, point, 8, 10), point);
    }
}
