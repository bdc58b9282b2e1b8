pub mod fft;
pub mod heart_rate;
pub mod stats;

pub use fft::{dominant_frequency, FftHelper};
pub use heart_rate::estimate_heart_rate;
pub use stats::StatsHelper;
