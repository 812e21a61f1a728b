//! Session state and its transition function.
//!
//! `SessionState::apply` is the only way the timeline, draft and send gate
//! change. It never suspends: work that has to wait (reply resolution, the
//! post-paste recapture) is handed back to the caller as an [`Effect`].

use insight_core::types::Speaker;

use crate::input::{Draft, PastePayload, RichInputSynchronizer};
use crate::pipeline::{SendPipeline, SendState};
use crate::timeline::MessageTimeline;

/// A key press on the input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Enter { shift: bool },
    Other,
}

/// Inputs to the session state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The surface content changed to the given markup.
    Edit(String),
    /// A paste gesture delivered this payload.
    Paste(PastePayload),
    /// Re-read the settled surface after an insertion.
    Recapture,
    Key(KeyPress),
    Submit,
    /// The resolver settled with this reply.
    Resolved(String),
}

/// Follow-up work the caller must perform after applying an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Apply [`SessionEvent::Recapture`] on the next scheduling tick.
    Recapture,
    /// Resolve a reply for this trimmed query, then apply
    /// [`SessionEvent::Resolved`].
    Resolve(String),
}

/// Why a submit attempt changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyDraft,
    Busy,
}

/// Result of a submit attempt driven to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    Completed { user_index: usize, bot_index: usize },
}

/// Everything a widget instance owns about its conversation.
#[derive(Debug, Clone)]
pub struct SessionState {
    timeline: MessageTimeline,
    input: RichInputSynchronizer,
    pipeline: SendPipeline,
}

impl SessionState {
    /// Create a session seeded with a bot greeting.
    pub fn new(greeting: &str) -> Self {
        let mut timeline = MessageTimeline::new();
        timeline.append(Speaker::Bot, greeting, None);
        Self {
            timeline,
            input: RichInputSynchronizer::new(),
            pipeline: SendPipeline::new(),
        }
    }

    pub fn timeline(&self) -> &MessageTimeline {
        &self.timeline
    }

    pub fn input(&self) -> &RichInputSynchronizer {
        &self.input
    }

    pub fn draft(&self) -> &Draft {
        self.input.draft()
    }

    pub fn is_sending(&self) -> bool {
        self.pipeline.is_sending()
    }

    /// Move the input caret (host-reported selection change).
    pub fn set_caret(&mut self, offset: usize) {
        self.input.set_caret(offset);
    }

    /// Why a submit would be rejected right now, if it would.
    pub fn submit_rejection(&self) -> Option<RejectReason> {
        if self.is_sending() {
            Some(RejectReason::Busy)
        } else if self.draft().is_blank() {
            Some(RejectReason::EmptyDraft)
        } else {
            None
        }
    }

    /// Apply one event and report the follow-up work it requires.
    pub fn apply(&mut self, event: SessionEvent) -> Effect {
        match event {
            SessionEvent::Edit(markup) => {
                self.input.edit(markup);
                Effect::None
            }
            SessionEvent::Paste(payload) => {
                if self.input.insert_paste(&payload) {
                    Effect::Recapture
                } else {
                    Effect::None
                }
            }
            SessionEvent::Recapture => {
                self.input.capture();
                Effect::None
            }
            SessionEvent::Key(KeyPress::Enter { shift: false }) if !self.is_sending() => {
                self.begin_submit()
            }
            SessionEvent::Key(_) => Effect::None,
            SessionEvent::Submit => self.begin_submit(),
            SessionEvent::Resolved(reply) => {
                self.finish_submit(reply);
                Effect::None
            }
        }
    }

    fn begin_submit(&mut self) -> Effect {
        if let Some(reason) = self.submit_rejection() {
            tracing::debug!(?reason, "Submit rejected");
            return Effect::None;
        }
        if let Err(e) = self.pipeline.transition(SendState::Sending) {
            tracing::warn!(error = %e, "Submit rejected");
            return Effect::None;
        }

        let draft = self.input.draft().clone();
        let query = draft.trimmed().to_string();
        let html = Some(draft.html).filter(|h| !h.is_empty());
        let index = self.timeline.append(Speaker::User, query.clone(), html);
        self.input.clear();
        self.input.set_editable(false);

        tracing::debug!(index, query_len = query.len(), "User message appended");
        Effect::Resolve(query)
    }

    fn finish_submit(&mut self, reply: String) {
        if let Err(e) = self.pipeline.transition(SendState::Idle) {
            tracing::warn!(error = %e, "Reply discarded: no submit in flight");
            return;
        }
        let index = self.timeline.append(Speaker::Bot, reply, None);
        self.input.set_editable(true);
        tracing::debug!(index, "Bot message appended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: &str = "Hello! I'm your insights assistant. How can I help you today?";

    fn session_with_draft(markup: &str) -> SessionState {
        let mut state = SessionState::new(GREETING);
        state.apply(SessionEvent::Edit(markup.to_string()));
        state
    }

    // ---- Construction ----

    #[test]
    fn test_new_session_has_greeting() {
        let state = SessionState::new(GREETING);
        assert_eq!(state.timeline().len(), 1);
        let greeting = state.timeline().get(0).unwrap();
        assert_eq!(greeting.speaker, Speaker::Bot);
        assert_eq!(greeting.text, GREETING);
        assert!(!state.is_sending());
        assert!(state.draft().is_blank());
    }

    // ---- Submit ----

    #[test]
    fn test_submit_appends_trimmed_user_message() {
        let mut state = session_with_draft("  <b>show sales</b>  ");
        let effect = state.apply(SessionEvent::Submit);
        assert_eq!(effect, Effect::Resolve("show sales".to_string()));

        let user = state.timeline().last().unwrap();
        assert_eq!(user.speaker, Speaker::User);
        assert_eq!(user.text, "show sales");
        assert_eq!(user.html.as_deref(), Some("  <b>show sales</b>  "));
        assert!(state.is_sending());
        assert!(state.draft().is_blank());
        assert_eq!(state.input().surface(), "");
        assert!(!state.input().is_editable());
    }

    #[test]
    fn test_submit_empty_draft_changes_nothing() {
        for markup in ["", "   ", "<br>", "<p> </p>"] {
            let mut state = session_with_draft(markup);
            assert_eq!(state.submit_rejection(), Some(RejectReason::EmptyDraft));
            assert_eq!(state.apply(SessionEvent::Submit), Effect::None);
            assert_eq!(state.timeline().len(), 1);
            assert!(!state.is_sending());
        }
    }

    #[test]
    fn test_submit_while_sending_is_noop() {
        let mut state = session_with_draft("first");
        state.apply(SessionEvent::Submit);
        // The surface is disabled, so a new draft cannot even be typed.
        state.apply(SessionEvent::Edit("second".to_string()));
        assert_eq!(state.submit_rejection(), Some(RejectReason::Busy));
        assert_eq!(state.apply(SessionEvent::Submit), Effect::None);
        assert_eq!(state.timeline().len(), 2);
    }

    #[test]
    fn test_resolved_appends_bot_message_and_unlocks() {
        let mut state = session_with_draft("hello");
        state.apply(SessionEvent::Submit);
        state.apply(SessionEvent::Resolved("Hi!".to_string()));

        let bot = state.timeline().last().unwrap();
        assert_eq!(bot.speaker, Speaker::Bot);
        assert_eq!(bot.text, "Hi!");
        assert_eq!(bot.index, 2);
        assert!(!state.is_sending());
        assert!(state.input().is_editable());
    }

    #[test]
    fn test_resolved_without_submit_is_ignored() {
        let mut state = SessionState::new(GREETING);
        state.apply(SessionEvent::Resolved("stray".to_string()));
        assert_eq!(state.timeline().len(), 1);
    }

    // ---- Keys ----

    #[test]
    fn test_enter_submits() {
        let mut state = session_with_draft("question");
        let effect = state.apply(SessionEvent::Key(KeyPress::Enter { shift: false }));
        assert_eq!(effect, Effect::Resolve("question".to_string()));
    }

    #[test]
    fn test_shift_enter_does_not_submit() {
        let mut state = session_with_draft("question");
        let effect = state.apply(SessionEvent::Key(KeyPress::Enter { shift: true }));
        assert_eq!(effect, Effect::None);
        assert_eq!(state.timeline().len(), 1);
    }

    #[test]
    fn test_enter_ignored_while_sending() {
        let mut state = session_with_draft("question");
        state.apply(SessionEvent::Submit);
        let effect = state.apply(SessionEvent::Key(KeyPress::Enter { shift: false }));
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut state = session_with_draft("question");
        assert_eq!(state.apply(SessionEvent::Key(KeyPress::Other)), Effect::None);
    }

    // ---- Paste ----

    #[test]
    fn test_paste_requests_recapture() {
        let mut state = SessionState::new(GREETING);
        let effect = state.apply(SessionEvent::Paste(PastePayload::plain("a\nb")));
        assert_eq!(effect, Effect::Recapture);
        assert!(state.draft().is_blank());

        state.apply(SessionEvent::Recapture);
        assert_eq!(state.draft().text, "a\nb");
        assert!(state.draft().html.contains("<br>"));
    }

    #[test]
    fn test_empty_paste_needs_no_recapture() {
        let mut state = SessionState::new(GREETING);
        let effect = state.apply(SessionEvent::Paste(PastePayload::default()));
        assert_eq!(effect, Effect::None);
    }

    // ---- Full cycle ----

    #[test]
    fn test_alternating_cycles() {
        let mut state = SessionState::new(GREETING);
        for (i, q) in ["one", "two", "three"].iter().enumerate() {
            state.apply(SessionEvent::Edit(q.to_string()));
            let effect = state.apply(SessionEvent::Submit);
            assert_eq!(effect, Effect::Resolve(q.to_string()));
            state.apply(SessionEvent::Resolved(format!("reply {}", i)));
        }
        let speakers: Vec<Speaker> = state.timeline().messages().iter().map(|m| m.speaker).collect();
        assert_eq!(
            speakers,
            vec![
                Speaker::Bot,
                Speaker::User,
                Speaker::Bot,
                Speaker::User,
                Speaker::Bot,
                Speaker::User,
                Speaker::Bot
            ]
        );
    }
}
