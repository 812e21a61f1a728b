//! Per-message feedback: transient copy indicator and sticky reactions.
//!
//! Local state changes immediately. Notifications to an external
//! collaborator are best-effort and never roll local state back.

pub mod notifier;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use insight_core::types::FeedbackStatus;

pub use notifier::{FeedbackNotice, FeedbackNotifier, HttpFeedbackNotifier};

use crate::clipboard::Clipboard;
use crate::error::{ChatError, ClipboardError};

/// Feedback recorded for one message.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackEntry {
    pub status: FeedbackStatus,
    /// Set after a successful copy; cleared automatically.
    pub copied: bool,
    copy_generation: u64,
}

/// A notification that could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFailure {
    pub index: usize,
    pub error: String,
}

type Entries = Arc<Mutex<HashMap<usize, FeedbackEntry>>>;

/// Most recent notification failures kept for diagnostics.
pub const MAX_RECORDED_FAILURES: usize = 64;

/// Tracks copy/like/dislike state keyed by message index.
pub struct FeedbackTracker {
    entries: Entries,
    clipboard: Arc<dyn Clipboard>,
    notifier: Mutex<Option<Arc<dyn FeedbackNotifier>>>,
    copy_indicator: Duration,
    failures: Mutex<VecDeque<NotificationFailure>>,
}

impl std::fmt::Debug for FeedbackTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackTracker")
            .field("entries", &self.entries)
            .field("copy_indicator", &self.copy_indicator)
            .finish()
    }
}

impl FeedbackTracker {
    pub fn new(
        clipboard: Arc<dyn Clipboard>,
        notifier: Option<Arc<dyn FeedbackNotifier>>,
        copy_indicator: Duration,
    ) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clipboard,
            notifier: Mutex::new(notifier),
            copy_indicator,
            failures: Mutex::new(VecDeque::with_capacity(MAX_RECORDED_FAILURES)),
        }
    }

    /// Replace the notification target (host reconfiguration).
    pub fn set_notifier(&self, notifier: Option<Arc<dyn FeedbackNotifier>>) {
        if let Ok(mut slot) = self.notifier.lock() {
            *slot = notifier;
        }
    }

    pub fn entry(&self, index: usize) -> Option<FeedbackEntry> {
        self.entries.lock().ok().and_then(|e| e.get(&index).copied())
    }

    /// All entries, keyed by message index.
    pub fn snapshot(&self) -> HashMap<usize, FeedbackEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Recent notification failures, oldest first. Only the last
    /// [`MAX_RECORDED_FAILURES`] are kept.
    pub fn notification_failures(&self) -> Vec<NotificationFailure> {
        self.failures
            .lock()
            .map(|f| f.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Copy `text` to the clipboard and raise the index's copy indicator.
    ///
    /// The indicator clears after the configured delay. Copying the same
    /// index again restarts its timer; other indices are unaffected. The
    /// clipboard write runs on the blocking pool. Must be called from within
    /// a Tokio runtime.
    pub async fn copy(&self, index: usize, text: &str) -> Result<(), ChatError> {
        let clipboard = Arc::clone(&self.clipboard);
        let owned = text.to_string();
        let written = tokio::task::spawn_blocking(move || clipboard.write(&owned))
            .await
            .unwrap_or_else(|e| {
                Err(ClipboardError::WriteFailed(format!(
                    "clipboard task failed: {}",
                    e
                )))
            });
        if let Err(e) = written {
            tracing::warn!(index, error = %e, "Copy failed");
            return Err(e.into());
        }

        let generation = {
            let mut entries = self.lock_entries()?;
            let entry = entries.entry(index).or_default();
            entry.copied = true;
            entry.copy_generation += 1;
            entry.copy_generation
        };
        tracing::debug!(index, "Copy indicator raised");

        let entries = Arc::clone(&self.entries);
        let delay = self.copy_indicator;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(mut entries) = entries.lock() {
                if let Some(entry) = entries.get_mut(&index) {
                    if entry.copy_generation == generation {
                        entry.copied = false;
                    }
                }
            }
        });
        Ok(())
    }

    /// Record a reaction and mirror it to the notifier, if any.
    ///
    /// Reactions are sticky: repeating one keeps it, the other one replaces
    /// it. Notification failures are logged and kept for diagnostics.
    pub async fn react(
        &self,
        index: usize,
        status: FeedbackStatus,
        text: &str,
    ) -> Result<(), ChatError> {
        self.lock_entries()?.entry(index).or_default().status = status;
        tracing::debug!(index, %status, "Feedback recorded");

        let notifier = self.notifier.lock().ok().and_then(|n| n.clone());
        let Some(notifier) = notifier else {
            return Ok(());
        };

        let notice = FeedbackNotice {
            text: text.to_string(),
            index,
            status,
        };
        if let Err(e) = notifier.notify(&notice).await {
            tracing::warn!(index, error = %e, "Feedback notification failed");
            if let Ok(mut failures) = self.failures.lock() {
                if failures.len() == MAX_RECORDED_FAILURES {
                    failures.pop_front();
                }
                failures.push_back(NotificationFailure {
                    index,
                    error: e.to_string(),
                });
            }
        }
        Ok(())
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, HashMap<usize, FeedbackEntry>>, ChatError> {
        self.entries
            .lock()
            .map_err(|e| ChatError::StatePoisoned(format!("feedback lock poisoned: {}", e)))
    }
}
