use echocore::interface::{AdvisoryError, AdvisoryNote, AdvisoryRequest, AdvisoryService};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Advisory service reached with a JSON POST.
pub struct HttpAdvisory {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAdvisory {
    pub fn new(endpoint: &str) -> Result<Self, AdvisoryError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AdvisoryError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl AdvisoryService for HttpAdvisory {
    async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryNote, AdvisoryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| AdvisoryError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(AdvisoryError::Status(response.status().as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|err| AdvisoryError::Transport(err.to_string()))?;
        AdvisoryNote::from_json(&body)
    }
}
