//! Append-only message timeline.

use chrono::Utc;
use insight_core::types::{Message, Speaker};

/// Ordered transcript of exchanged messages.
///
/// Entries are never edited, removed or reordered. Validation of what gets
/// appended is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct MessageTimeline {
    messages: Vec<Message>,
}

impl MessageTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its index.
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>, html: Option<String>) -> usize {
        let index = self.messages.len();
        self.messages.push(Message {
            speaker,
            text: text.into(),
            html,
            index,
            created_at: Utc::now(),
        });
        index
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
