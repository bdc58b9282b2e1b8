use crate::generator::template::speckle;
use echocore::interface::{frame_at, FrameSource};
use echocore::processing::Raster;
use echocore::{EngineError, EngineResult};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

const BLOOD_LEVEL: f32 = 12.0;
const TISSUE_LEVEL: f32 = 45.0;
const WALL_LEVEL: f32 = 140.0;

/// Parameters of a synthetic apical clip: an elliptical chamber whose wall
/// contracts radially once per beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoProfile {
    pub width: usize,
    pub height: usize,
    pub fps: f64,
    pub duration_s: f64,
    pub heart_rate_bpm: f32,
    pub center: (f32, f32),
    /// End-diastolic chamber semi-axes (horizontal, vertical) in source pixels.
    pub semi_axes: (f32, f32),
    pub wall_thickness: f32,
    /// Fractional radial shortening at end systole.
    pub contraction: f32,
    pub noise: f32,
    pub seed: u64,
}

impl Default for EchoProfile {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30.0,
            duration_s: 3.0,
            heart_rate_bpm: 72.0,
            center: (320.0, 240.0),
            semi_axes: (110.0, 160.0),
            wall_thickness: 18.0,
            contraction: 0.18,
            noise: 6.0,
            seed: 0,
        }
    }
}

impl EchoProfile {
    /// Two-chamber variant: narrower, slightly longer chamber and another seed.
    pub fn two_chamber() -> Self {
        Self {
            semi_axes: (95.0, 165.0),
            contraction: 0.15,
            seed: 1,
            ..Default::default()
        }
    }

    /// Radial scale of the chamber at `time`; 1 at end diastole.
    fn scale_at(&self, time: f64) -> f32 {
        let beats = time as f32 * self.heart_rate_bpm / 60.0;
        1.0 - self.contraction * (1.0 - (2.0 * PI * beats).cos()) / 2.0
    }
}

/// [`FrameSource`] rendering [`EchoProfile`] frames on demand.
#[derive(Debug, Clone)]
pub struct SyntheticEcho {
    profile: EchoProfile,
    time: f64,
}

impl SyntheticEcho {
    pub fn new(profile: EchoProfile) -> EngineResult<Self> {
        if profile.width == 0 || profile.height == 0 {
            return Err(EngineError::Source("synthetic frame has no pixels".into()));
        }
        if !(profile.fps > 0.0) || !(profile.duration_s > 0.0) {
            return Err(EngineError::Source(format!(
                "invalid clip timing: {} fps over {}s",
                profile.fps, profile.duration_s
            )));
        }
        Ok(Self { profile, time: 0.0 })
    }

    fn frame_index(&self) -> u64 {
        frame_at(self.time, self.profile.fps)
    }

    fn render(&self, frame_index: u64) -> EngineResult<Raster> {
        let profile = &self.profile;
        let scale = profile.scale_at(frame_index as f64 / profile.fps);
        let rx = profile.semi_axes.0 * scale;
        let ry = profile.semi_axes.1 * scale;
        let wall = profile.wall_thickness / rx.min(ry);
        let mut rng = StdRng::seed_from_u64(profile.seed.wrapping_mul(1_000_003) ^ frame_index);

        let mut bytes = Vec::with_capacity(profile.width * profile.height * 4);
        for y in 0..profile.height {
            for x in 0..profile.width {
                let u = (x as f32 - profile.center.0) / rx;
                let v = (y as f32 - profile.center.1) / ry;
                let rho = (u * u + v * v).sqrt();
                let angle = v.atan2(u);

                let base = if rho < 1.0 {
                    BLOOD_LEVEL
                } else if rho < 1.0 + wall {
                    let depth = (rho - 1.0) / wall;
                    WALL_LEVEL + speckle(angle, depth, profile.seed) as f32
                } else {
                    TISSUE_LEVEL + (speckle(angle, 3.0, profile.seed) / 4) as f32
                };
                let jitter = if profile.noise > 0.0 {
                    rng.gen_range(-profile.noise..profile.noise)
                } else {
                    0.0
                };
                let value = (base + jitter).round().clamp(0.0, 255.0) as u8;
                bytes.extend_from_slice(&[value, value, value, 255]);
            }
        }
        Raster::from_rgba(profile.width, profile.height, bytes)
    }
}

impl FrameSource for SyntheticEcho {
    fn current_raster(&mut self) -> EngineResult<Raster> {
        let last = ((self.profile.duration_s * self.profile.fps).ceil() as u64).saturating_sub(1);
        self.render(self.frame_index().min(last))
    }

    fn seek(&mut self, time: f64) -> EngineResult<()> {
        if !time.is_finite() {
            return Err(EngineError::Source(format!("cannot seek to {}", time)));
        }
        self.time = time.clamp(0.0, self.profile.duration_s);
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.profile.duration_s
    }

    fn current_time(&self) -> f64 {
        self.time
    }
}
