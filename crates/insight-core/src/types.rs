//! Shared domain types for the Insight chat widget.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Speaker / Message
// =============================================================================

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Bot => write!(f, "bot"),
        }
    }
}

/// A single transcript entry.
///
/// Messages are immutable once appended; `index` is the entry's position in
/// the timeline and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: Speaker,
    /// Plain text of the message.
    pub text: String,
    /// Raw markup the user submitted, when the draft carried any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub index: usize,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_bot(&self) -> bool {
        self.speaker == Speaker::Bot
    }
}

// =============================================================================
// FeedbackStatus
// =============================================================================

/// Reaction recorded against a bot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    None,
    Up,
    Down,
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackStatus::None => write!(f, "none"),
            FeedbackStatus::Up => write!(f, "up"),
            FeedbackStatus::Down => write!(f, "down"),
        }
    }
}

// =============================================================================
// Credential
// =============================================================================

/// Opaque credential authorizing remote API calls.
///
/// The raw value is only reachable through [`Credential::expose`]; `Debug`
/// output is redacted so the value never lands in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Render as `****` followed by the last four characters.
    pub fn masked(&self) -> String {
        let tail: String = {
            let chars: Vec<char> = self.0.chars().collect();
            let start = chars.len().saturating_sub(4);
            chars[start..].iter().collect()
        };
        format!("****{}", tail)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}
