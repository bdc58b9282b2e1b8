use crate::processing::raster::Raster;
use ndarray::Axis;

/// Resamples `source` to `width` x `height` as opaque grayscale.
///
/// Bilinear interpolation over BT.601 luminance; a frame already at the
/// target size is only converted to gray.
pub fn normalize(source: &Raster, width: usize, height: usize) -> Raster {
    let mut out = Raster::new(width, height);
    if source.width() == 0 || source.height() == 0 {
        return out;
    }

    let luma_at = |x: usize, y: usize| -> f32 {
        let [r, g, b, _] = source.pixel(x, y);
        0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
    };

    let scale_x = source.width() as f32 / width as f32;
    let scale_y = source.height() as f32 / height as f32;
    let max_x = (source.width() - 1) as f32;
    let max_y = (source.height() - 1) as f32;

    for y in 0..height {
        let sy = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        let y0 = sy.floor() as usize;
        let y1 = (y0 + 1).min(source.height() - 1);
        let fy = sy - y0 as f32;
        for x in 0..width {
            let sx = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
            let x0 = sx.floor() as usize;
            let x1 = (x0 + 1).min(source.width() - 1);
            let fx = sx - x0 as f32;

            let top = luma_at(x0, y0) * (1.0 - fx) + luma_at(x1, y0) * fx;
            let bottom = luma_at(x0, y1) * (1.0 - fx) + luma_at(x1, y1) * fx;
            let value = top * (1.0 - fy) + bottom * fy;
            out.set_gray(x, y, value.round().clamp(0.0, 255.0) as u8);
        }
    }
    out
}

/// Linear contrast stretch of channel 0, replicated into the color channels.
///
/// The darkest sample maps to 0 and the brightest to 255; a uniform frame
/// is left as it is.
pub fn enhance_contrast(raster: &mut Raster) {
    let data = raster.as_array_mut();
    let (min, max) = data
        .index_axis(Axis(2), 0)
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        return;
    }

    let range = (max - min) as f32;
    for mut pixel in data.lanes_mut(Axis(2)) {
        let stretched = if max == min {
            pixel[0]
        } else {
            ((pixel[0] - min) as f32 / range * 255.0).round() as u8
        };
        pixel[0] = stretched;
        pixel[1] = stretched;
        pixel[2] = stretched;
    }
}

/// Normalises and stretches in one pass, as done for every incoming frame.
pub fn prepare_frame(source: &Raster, width: usize, height: usize) -> Raster {
    let mut frame = normalize(source, width, height);
    enhance_contrast(&mut frame);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretch_maps_extremes_to_full_range() {
        let mut raster = Raster::from_luma(3, 1, &[40, 90, 140]).unwrap();
        enhance_contrast(&mut raster);
        assert_eq!(raster.luma(0, 0), 0);
        assert_eq!(raster.luma(2, 0), 255);
        assert_eq!(raster.luma(1, 0), 128);
        assert_eq!(raster.pixel(1, 0)[1], 128);
    }

    #[test]
    fn uniform_frame_keeps_its_value() {
        let mut raster = Raster::from_luma(2, 2, &[77; 4]).unwrap();
        enhance_contrast(&mut raster);
        assert!((0..2).all(|y| (0..2).all(|x| raster.luma(x, y) == 77)));
    }

    #[test]
    fn normalize_resamples_to_logical_size() {
        let source = Raster::from_luma(4, 2, &[0, 0, 255, 255, 0, 0, 255, 255]).unwrap();
        let out = normalize(&source, 8, 4);
        assert_eq!((out.width(), out.height()), (8, 4));
        assert_eq!(out.luma(0, 0), 0);
        assert_eq!(out.luma(7, 3), 255);
        assert_eq!(out.pixel(3, 1)[3], 255);
    }

    #[test]
    fn normalize_converts_color_to_gray() {
        let source = Raster::from_rgba(1, 1, vec![255, 0, 0, 255]).unwrap();
        let out = normalize(&source, 1, 1);
        assert_eq!(out.luma(0, 0), 76);
    }
}
