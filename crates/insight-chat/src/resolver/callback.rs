//! Injected reply callback strategy.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::{ReplyStrategy, NO_ANSWER_REPLY};
use crate::error::ResolverError;

/// Error type a reply callback may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An externally supplied reply producer.
///
/// Implemented for any `Fn(String) -> impl Future<Output = Result<Option<String>, BoxError>>`,
/// so hosts can pass an async closure directly.
#[async_trait]
pub trait ReplyCallback: Send + Sync {
    async fn reply(&self, query: &str) -> Result<Option<String>, BoxError>;
}

#[async_trait]
impl<F, Fut> ReplyCallback for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<String>, BoxError>> + Send + 'static,
{
    async fn reply(&self, query: &str) -> Result<Option<String>, BoxError> {
        (self)(query.to_string()).await
    }
}

/// Strategy delegating to a [`ReplyCallback`].
///
/// The callback's reply is used verbatim; an absent or empty reply becomes
/// [`NO_ANSWER_REPLY`].
pub struct CallbackStrategy {
    callback: Arc<dyn ReplyCallback>,
}

impl CallbackStrategy {
    pub fn new(callback: Arc<dyn ReplyCallback>) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl ReplyStrategy for CallbackStrategy {
    fn name(&self) -> &'static str {
        "callback"
    }

    async fn reply(&self, query: &str) -> Result<String, ResolverError> {
        match self.callback.reply(query).await {
            Ok(Some(reply)) if !reply.is_empty() => Ok(reply),
            Ok(_) => Ok(NO_ANSWER_REPLY.to_string()),
            Err(e) => Err(ResolverError::Callback(e.to_string())),
        }
    }
}
