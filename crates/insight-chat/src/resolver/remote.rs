//! Remote chat endpoint strategy.
//!
//! Sends one `POST { "query": ... }` with a bearer credential and reads the
//! reply from the first populated alias field of the JSON response. Requests
//! are never retried.

use async_trait::async_trait;
use insight_core::types::Credential;
use reqwest::Client;
use serde::Serialize;

use super::{ReplyStrategy, NO_ANSWER_REPLY};
use crate::error::{ChatError, ResolverError};

/// Response fields that may carry the reply, in lookup order.
pub const REPLY_FIELDS: &[&str] = &["answer", "text", "message"];

#[derive(Debug, Serialize)]
struct ChatQuery<'a> {
    query: &'a str,
}

#[derive(Debug)]
pub struct RemoteStrategy {
    http: Client,
    endpoint: String,
    credential: Credential,
}

impl RemoteStrategy {
    pub fn new(endpoint: String, credential: Credential) -> Result<Self, ChatError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ChatError::HttpClient(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            credential,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, query: &str) -> reqwest::RequestBuilder {
        self.http
            .post(&self.endpoint)
            .bearer_auth(self.credential.expose())
            .json(&ChatQuery { query })
    }
}

/// Pull the reply out of a response body: the first alias field holding a
/// non-empty string.
pub fn extract_reply(body: &serde_json::Value) -> Option<String> {
    REPLY_FIELDS
        .iter()
        .filter_map(|field| body.get(field))
        .filter_map(|value| value.as_str())
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl ReplyStrategy for RemoteStrategy {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn reply(&self, query: &str) -> Result<String, ResolverError> {
        tracing::debug!(endpoint = %self.endpoint, credential = %self.credential.masked(), "Querying remote endpoint");

        let response = self.build_request(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ResolverError::MalformedBody(e.to_string()))?;

        Ok(extract_reply(&value).unwrap_or_else(|| {
            tracing::debug!("Remote response carried no reply field");
            NO_ANSWER_REPLY.to_string()
        }))
    }
}
