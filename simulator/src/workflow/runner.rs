use crate::advisory::HttpAdvisory;
use crate::generator::SyntheticEcho;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use echocore::interface::{advise_or_fallback, AdvisoryNote, AdvisoryRequest, PresentationSink};
use echocore::session::{
    finish_continuous, run_continuous, CancelSignal, TokioScheduler, ViewSession,
};
use echocore::telemetry::{EngineMetrics, MetricsSnapshot};
use echocore::{AnalysisResult, BiplaneOrchestrator, View};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Everything written to the report file after a run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub result: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<AdvisoryNote>,
    pub metrics: MetricsSnapshot,
}

impl WorkflowReport {
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(self).context("serialising report")?;
        fs::write(path, body).with_context(|| format!("writing report {}", path.display()))
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    metrics: Arc<EngineMetrics>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    /// Frame-stepped walk over both synthetic views.
    pub async fn run_biplane(
        &self,
        sink: &mut dyn PresentationSink,
        cancel: &CancelSignal,
    ) -> anyhow::Result<AnalysisResult> {
        let mut orchestrator =
            BiplaneOrchestrator::with_metrics(self.config.engine.clone(), self.metrics.clone())
                .context("building biplane orchestrator")?;
        for view in View::ALL {
            if let Some(roi) = self.config.view(view).roi {
                orchestrator
                    .set_roi(view, roi)
                    .with_context(|| format!("applying {} roi", view))?;
            }
        }

        let mut a4c = SyntheticEcho::new(self.config.a4c.profile.clone())
            .context("building A4C source")?;
        let mut a2c = SyntheticEcho::new(self.config.a2c.profile.clone())
            .context("building A2C source")?;
        let result = orchestrator
            .run([&mut a4c, &mut a2c], sink, &mut TokioScheduler, cancel)
            .await
            .context("running biplane analysis")?;
        info!(
            "biplane analysis finished: EF {:.1}%, GLS {:.1}%",
            result.ejection_fraction,
            result.global_strain()
        );
        Ok(result)
    }

    /// Real-time tracking of one view for at most `ticks` display callbacks.
    pub async fn run_continuous(
        &self,
        view: View,
        ticks: usize,
        sink: &mut dyn PresentationSink,
        cancel: &mut CancelSignal,
    ) -> anyhow::Result<AnalysisResult> {
        let setup = self.config.view(view);
        let mut session = ViewSession::new(view, self.config.engine.clone())
            .context("building view session")?;
        if let Some(roi) = setup.roi {
            session
                .set_roi(roi)
                .with_context(|| format!("applying {} roi", view))?;
        }
        let mut source =
            SyntheticEcho::new(setup.profile.clone()).context("building synthetic source")?;

        let summary = run_continuous(
            &mut session,
            &mut source,
            sink,
            &self.metrics,
            cancel,
            Some(ticks),
        )
        .await
        .context("running continuous tracking")?;
        info!(
            "{} continuous run: {} ticks, {} dropped",
            view, summary.ticks, summary.dropped_frames
        );
        Ok(finish_continuous(&mut session, sink))
    }

    /// Advisory note for `result`, if an endpoint is configured.
    pub async fn advise(&self, result: &AnalysisResult) -> anyhow::Result<Option<AdvisoryNote>> {
        let Some(endpoint) = self.config.advisory_endpoint.as_deref() else {
            return Ok(None);
        };
        let service = HttpAdvisory::new(endpoint).context("building advisory client")?;
        let request = AdvisoryRequest::from_result(result, None);
        Ok(Some(
            advise_or_fallback(&service, &request, &self.metrics).await,
        ))
    }

    pub fn report(&self, result: AnalysisResult, advisory: Option<AdvisoryNote>) -> WorkflowReport {
        WorkflowReport {
            result,
            advisory,
            metrics: self.metrics.snapshot(),
        }
    }
}
