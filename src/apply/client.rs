//! Client side of the submission contract.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::model::SubmissionPayload;
use crate::error::SubmitError;

/// Sends a finished draft somewhere that will keep it.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError>;
}

/// Body returned by the apply endpoint, on success or failure.
#[derive(Debug, Default, Deserialize)]
struct EndpointReply {
    #[serde(default)]
    error: Option<String>,
}

/// POSTs the payload as JSON to the apply endpoint.
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = resp.status();
        let reply: EndpointReply = resp
            .json()
            .await
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;

        debug!(status = status.as_u16(), "Apply endpoint replied");

        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message: reply
                    .error
                    .unwrap_or_else(|| "Submission failed".to_string()),
            });
        }
        Ok(())
    }
}
