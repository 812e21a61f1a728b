//! Error types for the chat session controller.

use insight_core::error::CoreError;

use crate::pipeline::SendState;

/// Errors surfaced by widget operations.
///
/// Reply resolution never produces one of these: resolver failures are
/// absorbed into a bot message.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message not found: {0}")]
    MessageNotFound(usize),
    #[error("feedback is only available on bot messages (index {0})")]
    NotABotMessage(usize),
    #[error("clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("session state poisoned: {0}")]
    StatePoisoned(String),
    #[error("invalid send transition: {0} -> {1}")]
    InvalidTransition(SendState, SendState),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for ChatError {
    fn from(err: CoreError) -> Self {
        ChatError::Config(err.to_string())
    }
}

/// Failures inside the reply strategy chain.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("reply callback failed: {0}")]
    Callback(String),
    #[error("remote request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote endpoint returned HTTP {0}")]
    Status(u16),
    #[error("remote response body is malformed: {0}")]
    MalformedBody(String),
}

/// Failures writing to the system clipboard.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Failures delivering a feedback notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notification endpoint returned HTTP {0}")]
    Status(u16),
}
