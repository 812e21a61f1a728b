//! Widget lifecycle and async driver.
//!
//! `ChatWidget` is what a host mounts: `init` once, `render` on every host
//! update, `dispose` on teardown. Between those calls it forwards user
//! gestures into [`SessionState::apply`] and performs the effects that
//! require waiting. No lock is ever held across a suspension point.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use insight_core::config::{ClipboardBackend, ClipboardConfig, FeedbackConfig, InsightConfig};
use insight_core::types::{FeedbackStatus, Message};
use uuid::Uuid;

use crate::clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
use crate::error::ChatError;
use crate::feedback::{FeedbackNotifier, FeedbackTracker, HttpFeedbackNotifier};
use crate::input::PastePayload;
use crate::markup::extract_text;
use crate::resolver::{ReplyCallback, ResponseResolver, FAILURE_REPLY};
use crate::session::{Effect, KeyPress, RejectReason, SessionEvent, SessionState, SubmitOutcome};
use crate::view::SessionView;

/// Collaborators a host may inject at construction.
///
/// Anything left `None` is derived from configuration.
#[derive(Default, Clone)]
pub struct WidgetHooks {
    pub callback: Option<Arc<dyn ReplyCallback>>,
    pub clipboard: Option<Arc<dyn Clipboard>>,
    pub notifier: Option<Arc<dyn FeedbackNotifier>>,
}

/// One mounted chat widget.
pub struct ChatWidget {
    id: Uuid,
    state: Mutex<SessionState>,
    resolver: Mutex<Arc<ResponseResolver>>,
    callback: Option<Arc<dyn ReplyCallback>>,
    injected_notifier: bool,
    feedback: FeedbackTracker,
    config: Mutex<InsightConfig>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("resolver", &self.resolver)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl ChatWidget {
    /// Mount a widget: seed the greeting and build the reply chain.
    pub fn init(config: InsightConfig, hooks: WidgetHooks) -> Result<Self, ChatError> {
        let resolver = ResponseResolver::new(
            hooks.callback.clone(),
            &config.remote,
            config.chat.local_reply_delay(),
        )?;

        let clipboard = hooks
            .clipboard
            .unwrap_or_else(|| clipboard_from_config(&config.clipboard));
        let injected_notifier = hooks.notifier.is_some();
        let notifier = match hooks.notifier {
            Some(notifier) => Some(notifier),
            None => notifier_from_config(&config.feedback)?,
        };
        let feedback =
            FeedbackTracker::new(clipboard, notifier, config.feedback.copy_indicator());

        let id = Uuid::new_v4();
        tracing::info!(
            widget_id = %id,
            strategy = resolver.active_strategy().unwrap_or("none"),
            "Chat widget initialized"
        );

        Ok(Self {
            id,
            state: Mutex::new(SessionState::new(&config.chat.greeting)),
            resolver: Mutex::new(Arc::new(resolver)),
            callback: hooks.callback,
            injected_notifier,
            feedback,
            config: Mutex::new(config),
        })
    }

    /// Apply a host update and return the view to render.
    ///
    /// A changed remote section or local delay rebuilds the reply chain for
    /// later submits; a submit already in flight keeps the chain it started
    /// with.
    pub fn render(&self, config: &InsightConfig) -> Result<SessionView, ChatError> {
        {
            let mut current = self.lock_config()?;

            if current.remote != config.remote
                || current.chat.local_reply_delay_ms != config.chat.local_reply_delay_ms
            {
                let resolver = ResponseResolver::new(
                    self.callback.clone(),
                    &config.remote,
                    config.chat.local_reply_delay(),
                )?;
                tracing::info!(
                    widget_id = %self.id,
                    strategy = resolver.active_strategy().unwrap_or("none"),
                    "Reply chain reconfigured"
                );
                *self
                    .resolver
                    .lock()
                    .map_err(|e| ChatError::StatePoisoned(format!("resolver lock poisoned: {}", e)))? =
                    Arc::new(resolver);
            }

            if !self.injected_notifier
                && current.feedback.notify_endpoint != config.feedback.notify_endpoint
            {
                self.feedback
                    .set_notifier(notifier_from_config(&config.feedback)?);
            }

            *current = config.clone();
        }
        self.view()
    }

    /// Tear the widget down. The conversation is discarded.
    pub fn dispose(self) {
        let messages = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .timeline()
            .len();
        tracing::info!(widget_id = %self.id, messages, "Chat widget disposed");
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn feedback(&self) -> &FeedbackTracker {
        &self.feedback
    }

    /// Name of the strategy that will answer the next submit.
    pub fn active_strategy(&self) -> Option<&'static str> {
        self.current_resolver().active_strategy()
    }

    pub fn is_sending(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_sending()
    }

    /// Read-only projection of the current session.
    pub fn view(&self) -> Result<SessionView, ChatError> {
        let feedback = self.feedback.snapshot();
        let config = self.lock_config()?;
        let state = self.lock_state()?;
        Ok(SessionView::project(
            &state,
            &feedback,
            config.remote.credential(),
        ))
    }

    // -- Input --

    /// The surface content changed to `markup`.
    pub fn edit(&self, markup: impl Into<String>) -> Result<(), ChatError> {
        self.lock_state()?
            .apply(SessionEvent::Edit(markup.into()));
        Ok(())
    }

    /// Move the input caret to a byte offset in the surface markup.
    pub fn set_caret(&self, offset: usize) -> Result<(), ChatError> {
        self.lock_state()?.set_caret(offset);
        Ok(())
    }

    /// Insert clipboard content at the caret, then recapture the draft on
    /// the next scheduling tick.
    pub async fn paste(&self, payload: PastePayload) -> Result<(), ChatError> {
        let effect = self.lock_state()?.apply(SessionEvent::Paste(payload));
        if effect == Effect::Recapture {
            tokio::task::yield_now().await;
            self.lock_state()?.apply(SessionEvent::Recapture);
        }
        Ok(())
    }

    // -- Send pipeline --

    /// Submit the current draft and wait for the bot reply.
    pub async fn submit(&self) -> Result<SubmitOutcome, ChatError> {
        let (effect, rejection, user_index) = {
            let mut state = self.lock_state()?;
            let rejection = state.submit_rejection();
            let effect = state.apply(SessionEvent::Submit);
            (effect, rejection, state.timeline().len().saturating_sub(1))
        };
        Ok(self.drive(effect, rejection, user_index).await)
    }

    /// Handle a key press. Enter without shift submits; the result is `None`
    /// for keys that are not a submit trigger and for Enter while sending.
    pub async fn key_down(&self, key: KeyPress) -> Result<Option<SubmitOutcome>, ChatError> {
        if key != (KeyPress::Enter { shift: false }) {
            return Ok(None);
        }
        let (effect, rejection, user_index) = {
            let mut state = self.lock_state()?;
            if state.is_sending() {
                return Ok(None);
            }
            let rejection = state.submit_rejection();
            let effect = state.apply(SessionEvent::Key(key));
            (effect, rejection, state.timeline().len().saturating_sub(1))
        };
        Ok(Some(self.drive(effect, rejection, user_index).await))
    }

    async fn drive(
        &self,
        effect: Effect,
        rejection: Option<RejectReason>,
        user_index: usize,
    ) -> SubmitOutcome {
        let Effect::Resolve(query) = effect else {
            return SubmitOutcome::Rejected(rejection.unwrap_or(RejectReason::EmptyDraft));
        };

        let guard = InFlight {
            state: &self.state,
            settled: false,
        };
        let reply = self.current_resolver().resolve(&query).await;
        let bot_index = guard.settle(reply);

        SubmitOutcome::Completed {
            user_index,
            bot_index,
        }
    }

    fn current_resolver(&self) -> Arc<ResponseResolver> {
        Arc::clone(&self.resolver.lock().unwrap_or_else(PoisonError::into_inner))
    }

    // -- Feedback --

    /// Copy a bot message to the clipboard.
    pub async fn copy_message(&self, index: usize) -> Result<(), ChatError> {
        let text = {
            let state = self.lock_state()?;
            preferred_copy_text(bot_message(&state, index)?)
        };
        self.feedback.copy(index, &text).await
    }

    pub async fn like(&self, index: usize) -> Result<(), ChatError> {
        self.react(index, FeedbackStatus::Up).await
    }

    pub async fn dislike(&self, index: usize) -> Result<(), ChatError> {
        self.react(index, FeedbackStatus::Down).await
    }

    async fn react(&self, index: usize, status: FeedbackStatus) -> Result<(), ChatError> {
        let text = {
            let state = self.lock_state()?;
            bot_message(&state, index)?.text.clone()
        };
        self.feedback.react(index, status, &text).await
    }

    // -- Private helpers --

    fn lock_state(&self) -> Result<MutexGuard<'_, SessionState>, ChatError> {
        self.state
            .lock()
            .map_err(|e| ChatError::StatePoisoned(format!("session lock poisoned: {}", e)))
    }

    fn lock_config(&self) -> Result<MutexGuard<'_, InsightConfig>, ChatError> {
        self.config
            .lock()
            .map_err(|e| ChatError::StatePoisoned(format!("config lock poisoned: {}", e)))
    }
}

/// Completes the send cycle exactly once, even if the submitting future is
/// dropped before the reply arrives.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, reply: String) -> usize {
        self.settled = true;
        complete(self.state, reply)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Submit abandoned before its reply resolved");
            complete(self.state, FAILURE_REPLY.to_string());
        }
    }
}

fn complete(state: &Mutex<SessionState>, reply: String) -> usize {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.apply(SessionEvent::Resolved(reply));
    state.timeline().len().saturating_sub(1)
}

fn bot_message(state: &SessionState, index: usize) -> Result<&Message, ChatError> {
    let message = state
        .timeline()
        .get(index)
        .ok_or(ChatError::MessageNotFound(index))?;
    if !message.is_bot() {
        return Err(ChatError::NotABotMessage(index));
    }
    Ok(message)
}

/// Text placed on the clipboard for a message: the projection of its markup
/// when it has any, else its plain text.
pub fn preferred_copy_text(message: &Message) -> String {
    message
        .html
        .as_deref()
        .map(extract_text)
        .unwrap_or_else(|| message.text.clone())
}

fn clipboard_from_config(config: &ClipboardConfig) -> Arc<dyn Clipboard> {
    match config.backend {
        ClipboardBackend::Memory => Arc::new(MemoryClipboard::new()),
        ClipboardBackend::System => Arc::new(SystemClipboard::new()),
    }
}

fn notifier_from_config(
    config: &FeedbackConfig,
) -> Result<Option<Arc<dyn FeedbackNotifier>>, ChatError> {
    match config.notify_endpoint.as_deref().filter(|e| !e.is_empty()) {
        Some(endpoint) => Ok(Some(Arc::new(HttpFeedbackNotifier::new(endpoint)?))),
        None => Ok(None),
    }
}
