//! Session controller for the Insights Assistant chat widget.
//!
//! Keeps the rich-text draft in sync with its plain-text projection, runs
//! the single-flight send pipeline, resolves replies through an ordered
//! strategy chain, and tracks per-message copy/like/dislike feedback.

pub mod clipboard;
pub mod error;
pub mod feedback;
pub mod input;
pub mod markup;
pub mod pipeline;
pub mod resolver;
pub mod session;
pub mod timeline;
pub mod view;
pub mod widget;

pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use error::{ChatError, ClipboardError, NotifyError, ResolverError};
pub use feedback::{
    FeedbackEntry, FeedbackNotifier, FeedbackTracker, HttpFeedbackNotifier, NotificationFailure,
};
pub use input::{Draft, PastePayload, RichInputSynchronizer};
pub use pipeline::{SendPipeline, SendState};
pub use resolver::{BoxError, ReplyCallback, ResponseResolver, FAILURE_REPLY, NO_ANSWER_REPLY};
pub use session::{Effect, KeyPress, RejectReason, SessionEvent, SessionState, SubmitOutcome};
pub use timeline::MessageTimeline;
pub use view::SessionView;
pub use widget::{ChatWidget, WidgetHooks};
