use crate::generator::EchoProfile;
use anyhow::Context;
use echocore::{EngineConfig, Roi, View};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Source and region of interest for one view.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewSetup {
    #[serde(default)]
    pub roi: Option<Roi>,
    #[serde(default)]
    pub profile: EchoProfile,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub a4c: ViewSetup,
    pub a2c: ViewSetup,
    #[serde(default)]
    pub advisory_endpoint: Option<String>,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .engine
            .validate()
            .with_context(|| format!("validating engine section of {}", path_ref.display()))?;
        Ok(config)
    }

    /// Synthetic two-view setup with the chamber-covering default ROI.
    pub fn from_args(fps: f64, duration_s: f64, heart_rate_bpm: f32, seed: u64) -> Self {
        let tune = |profile: EchoProfile| EchoProfile {
            fps,
            duration_s,
            heart_rate_bpm,
            seed: profile.seed.wrapping_add(seed),
            ..profile
        };
        let roi = Some(Roi::new(150.0, 30.0, 300.0, 390.0));
        Self {
            engine: EngineConfig {
                fps,
                ..Default::default()
            },
            a4c: ViewSetup {
                roi,
                profile: tune(EchoProfile::default()),
            },
            a2c: ViewSetup {
                roi,
                profile: tune(EchoProfile::two_chamber()),
            },
            advisory_endpoint: None,
            report_path: None,
        }
    }

    pub fn view(&self, view: View) -> &ViewSetup {
        match view {
            View::A4c => &self.a4c,
            View::A2c => &self.a2c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_shares_timing_across_views() {
        let cfg = WorkflowConfig::from_args(25.0, 2.0, 60.0, 4);
        assert_eq!(cfg.engine.fps, 25.0);
        assert_eq!(cfg.a4c.profile.duration_s, 2.0);
        assert_eq!(cfg.a2c.profile.heart_rate_bpm, 60.0);
        assert_ne!(cfg.a4c.profile.seed, cfg.a2c.profile.seed);
        assert!(cfg.view(View::A2c).roi.is_some());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"engine:\n  block_size: 12\na4c:\n  roi: {x: 100, y: 40, w: 300, h: 360}\n  profile:\n    heart_rate_bpm: 80\na2c:\n  profile:\n    seed: 9\nadvisory_endpoint: http://localhost:8080/advise\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.engine.block_size, 12);
        assert_eq!(cfg.engine.history_capacity, 100);
        assert_eq!(cfg.a4c.roi, Some(Roi::new(100.0, 40.0, 300.0, 360.0)));
        assert_eq!(cfg.a4c.profile.heart_rate_bpm, 80.0);
        assert!(cfg.a2c.roi.is_none());
        assert_eq!(cfg.a2c.profile.seed, 9);
        assert!(cfg.advisory_endpoint.is_some());
    }

    #[test]
    fn config_load_rejects_invalid_engine() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"engine:\n  block_size: 0\na4c: {}\na2c: {}\n")
            .unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}
