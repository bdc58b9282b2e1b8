use crate::math::fft::dominant_frequency;
use crate::processing::strain::StrainHistory;

/// Physiologic search band for the cardiac fundamental, in Hz.
pub const CARDIAC_BAND_HZ: (f32, f32) = (0.5, 3.5);
const MIN_SAMPLES: usize = 8;

/// Beats per minute from the periodicity of a strain history.
///
/// The sample rate is inferred from the history's time span, so samples are
/// assumed evenly spaced.
pub fn estimate_heart_rate(history: &StrainHistory) -> Option<f32> {
    if history.len() < MIN_SAMPLES {
        return None;
    }
    let span = history.span();
    if span <= 0.0 {
        return None;
    }
    let sample_rate = ((history.len() - 1) as f64 / span) as f32;
    dominant_frequency(&history.values(), sample_rate, CARDIAC_BAND_HZ).map(|hz| hz * 60.0)
}
