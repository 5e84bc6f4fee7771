//! HTTP adapter for the analysis service.
//!
//! Sends `POST {endpoint}` with `{"discussionId": <id>}` and expects an
//! [`AnalysisOutcome`] back as camelCase JSON.

use async_trait::async_trait;
use debate_application::{AnalysisError, AnalysisGateway};
use debate_domain::{AnalysisOutcome, DiscussionId};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest {
    discussion_id: DiscussionId,
}

/// Analysis gateway backed by a JSON HTTP endpoint
pub struct HttpAnalysisGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisGateway {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("book-debate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalysisError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn request_error(e: reqwest::Error) -> AnalysisError {
    if e.is_timeout() {
        AnalysisError::Timeout
    } else if e.is_decode() {
        AnalysisError::InvalidResponse(e.to_string())
    } else {
        AnalysisError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl AnalysisGateway for HttpAnalysisGateway {
    async fn analyze(&self, discussion_id: DiscussionId) -> Result<AnalysisOutcome, AnalysisError> {
        debug!("Requesting analysis of discussion {} from {}", discussion_id, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalysisRequest { discussion_id })
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::RequestFailed(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<AnalysisOutcome>()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))
    }
}
