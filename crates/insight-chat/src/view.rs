//! Read-only projection of a session for rendering.

use std::collections::HashMap;

use insight_core::types::{Credential, FeedbackStatus, Message, Speaker};
use serde::Serialize;

use crate::feedback::FeedbackEntry;
use crate::input::Draft;
use crate::session::SessionState;

pub const TITLE: &str = "Insights Assistant";

/// One rendered transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub index: usize,
    pub speaker: Speaker,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub status: FeedbackStatus,
    pub copied: bool,
}

impl MessageView {
    fn new(message: &Message, feedback: Option<&FeedbackEntry>) -> Self {
        Self {
            index: message.index,
            speaker: message.speaker,
            text: message.text.clone(),
            html: message.html.clone(),
            status: feedback.map(|f| f.status).unwrap_or_default(),
            copied: feedback.is_some_and(|f| f.copied),
        }
    }
}

/// Everything a renderer needs, computed from the session without
/// mutating it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub title: String,
    pub messages: Vec<MessageView>,
    pub draft: Draft,
    pub sending: bool,
    pub status_label: String,
    pub send_enabled: bool,
    pub input_editable: bool,
    /// Show the "bot is typing" placeholder after the last message.
    pub typing_indicator: bool,
    /// Index of the newest message; renderers scroll it into view.
    pub scroll_to: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_hint: Option<String>,
}

impl SessionView {
    pub fn project(
        state: &SessionState,
        feedback: &HashMap<usize, FeedbackEntry>,
        credential: Option<&Credential>,
    ) -> Self {
        let messages = state
            .timeline()
            .messages()
            .iter()
            .map(|m| MessageView::new(m, feedback.get(&m.index)))
            .collect();
        let sending = state.is_sending();

        Self {
            title: TITLE.to_string(),
            messages,
            draft: state.draft().clone(),
            sending,
            status_label: if sending { "Sending" } else { "Ready" }.to_string(),
            send_enabled: !sending && !state.draft().is_blank(),
            input_editable: state.input().is_editable(),
            typing_indicator: sending,
            scroll_to: state.timeline().last().map(|m| m.index),
            credential_hint: credential.map(|c| format!("API Key set: {}", c.masked())),
        }
    }
}
