use crate::session::AnalysisResult;
use crate::telemetry::EngineMetrics;
use log::warn;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Clinical grading returned by the advisory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Normal,
    Mild,
    Moderate,
    Severe,
}

/// Numeric summary sent to the advisory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub gls: f32,
    pub ef: f32,
    pub hr: f32,
    pub segmental_values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_still_frame: Option<Vec<u8>>,
}

impl AdvisoryRequest {
    /// Builds the request from a finished analysis; unknown heart rate is sent as 0.
    pub fn from_result(result: &AnalysisResult, still_frame: Option<Vec<u8>>) -> Self {
        Self {
            gls: result.global_strain(),
            ef: result.ejection_fraction,
            hr: result.heart_rate_bpm().unwrap_or(0.0),
            segmental_values: result.segmental_map.clone(),
            optional_still_frame: still_frame,
        }
    }
}

/// Natural-language note produced from an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryNote {
    pub observation: String,
    pub severity: Severity,
    pub recommendation: String,
}

impl AdvisoryNote {
    /// Substituted whenever the service cannot produce a usable note.
    pub fn fallback() -> Self {
        Self {
            observation: "analysis unavailable, manual review required".into(),
            severity: Severity::Moderate,
            recommendation: "ensure stable connectivity and valid data".into(),
        }
    }

    /// Parses a service response body.
    pub fn from_json(body: &str) -> Result<Self, AdvisoryError> {
        serde_json::from_str(body).map_err(|err| AdvisoryError::Malformed(err.to_string()))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AdvisoryError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Remote text generator turning metrics into an [`AdvisoryNote`].
pub trait AdvisoryService {
    fn advise(
        &self,
        request: &AdvisoryRequest,
    ) -> impl Future<Output = Result<AdvisoryNote, AdvisoryError>>;
}

/// Asks `service` for a note, substituting [`AdvisoryNote::fallback`] on any failure.
pub async fn advise_or_fallback<S: AdvisoryService>(
    service: &S,
    request: &AdvisoryRequest,
    metrics: &EngineMetrics,
) -> AdvisoryNote {
    match service.advise(request).await {
        Ok(note) => note,
        Err(err) => {
            warn!("advisory service failed, using fallback note: {}", err);
            metrics.record_advisory_fallback();
            AdvisoryNote::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl AdvisoryService for Offline {
        async fn advise(&self, _request: &AdvisoryRequest) -> Result<AdvisoryNote, AdvisoryError> {
            Err(AdvisoryError::Transport("connection refused".into()))
        }
    }

    struct Canned(AdvisoryNote);

    impl AdvisoryService for Canned {
        async fn advise(&self, _request: &AdvisoryRequest) -> Result<AdvisoryNote, AdvisoryError> {
            Ok(self.0.clone())
        }
    }

    fn request() -> AdvisoryRequest {
        AdvisoryRequest {
            gls: -18.0,
            ef: 58.0,
            hr: 72.0,
            segmental_values: vec![-18.0; 17],
            optional_still_frame: None,
        }
    }

    #[tokio::test]
    async fn failure_is_replaced_by_fallback() {
        let metrics = EngineMetrics::new();
        let note = advise_or_fallback(&Offline, &request(), &metrics).await;
        assert_eq!(note, AdvisoryNote::fallback());
        assert_eq!(metrics.snapshot().advisory_fallbacks, 1);
    }

    #[tokio::test]
    async fn successful_note_passes_through() {
        let metrics = EngineMetrics::new();
        let expected = AdvisoryNote {
            observation: "normal systolic function".into(),
            severity: Severity::Normal,
            recommendation: "routine follow-up".into(),
        };
        let note = advise_or_fallback(&Canned(expected.clone()), &request(), &metrics).await;
        assert_eq!(note, expected);
        assert_eq!(metrics.snapshot().advisory_fallbacks, 0);
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(
            AdvisoryNote::from_json("{\"observation\": 3}"),
            Err(AdvisoryError::Malformed(_))
        ));
    }

    #[test]
    fn request_uses_camel_case_keys() {
        let body = serde_json::to_value(request()).unwrap();
        assert!(body.get("segmentalValues").is_some());
        assert!(body.get("optionalStillFrame").is_none());
    }
}
