//! Feedback notification delivery.

use async_trait::async_trait;
use insight_core::types::FeedbackStatus;
use reqwest::Client;
use serde::Serialize;

use crate::error::{ChatError, NotifyError};

/// A like/dislike mirrored to an external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackNotice {
    pub text: String,
    pub index: usize,
    #[serde(skip)]
    pub status: FeedbackStatus,
}

/// Receives feedback notices. Delivery is best-effort.
#[async_trait]
pub trait FeedbackNotifier: Send + Sync {
    async fn notify(&self, notice: &FeedbackNotice) -> Result<(), NotifyError>;
}

/// Posts `{ "text": ..., "index": ... }` to a fixed endpoint. The response
/// body is ignored.
#[derive(Debug)]
pub struct HttpFeedbackNotifier {
    http: Client,
    endpoint: String,
}

impl HttpFeedbackNotifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ChatError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ChatError::HttpClient(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FeedbackNotifier for HttpFeedbackNotifier {
    async fn notify(&self, notice: &FeedbackNotice) -> Result<(), NotifyError> {
        let response = self.http.post(&self.endpoint).json(notice).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        tracing::debug!(index = notice.index, status = %notice.status, "Feedback notification delivered");
        Ok(())
    }
}
