use num_complex::Complex32;
use rustfft::{num_traits::Zero, Fft, FftPlanner};

/// Helper that wraps the `rustfft` planner for reuse.
pub struct FftHelper {
    fft: std::sync::Arc<dyn Fft<f32>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform of a real sequence, zero-padded or truncated to `size`.
    pub fn forward(&self, input: &[f32]) -> Vec<Complex32> {
        let mut buffer: Vec<Complex32> = input
            .iter()
            .take(self.size)
            .map(|&value| Complex32::new(value, 0.0))
            .collect();
        buffer.resize(self.size, Complex32::zero());
        self.fft.process(&mut buffer);
        buffer
    }

    /// Magnitude spectrum up to and including the Nyquist bin.
    pub fn magnitudes(&self, input: &[f32]) -> Vec<f32> {
        let spectrum = self.forward(input);
        spectrum[..self.size / 2 + 1].iter().map(|c| c.norm()).collect()
    }
}

/// Frequency in Hz of the strongest component inside `band`.
///
/// The mean is removed first. Returns `None` when the band holds no bin or
/// no energy.
pub fn dominant_frequency(samples: &[f32], sample_rate: f32, band: (f32, f32)) -> Option<f32> {
    if samples.len() < 2 || !(sample_rate > 0.0) {
        return None;
    }
    let mean = samples.iter().sum::<f32>() / samples.len() as f32;
    let centred: Vec<f32> = samples.iter().map(|v| v - mean).collect();

    let helper = FftHelper::new(samples.len().next_power_of_two() * 2);
    let resolution = sample_rate / helper.size() as f32;
    let (bin, magnitude) = helper
        .magnitudes(&centred)
        .into_iter()
        .enumerate()
        .skip(1)
        .filter(|(bin, _)| {
            let freq = *bin as f32 * resolution;
            freq >= band.0 && freq <= band.1
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    (magnitude > 1e-6).then_some(bin as f32 * resolution)
}
