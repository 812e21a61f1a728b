//! Reply resolution through an ordered strategy chain.
//!
//! The chain is fixed when the resolver is built, in precedence order:
//! an injected callback, the remote chat endpoint (only when a credential is
//! configured), then the local heuristic. The first strategy in the chain
//! answers; a failing strategy does not fall through to the next one.

pub mod callback;
pub mod local;
pub mod remote;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use insight_core::config::RemoteConfig;

pub use callback::{BoxError, CallbackStrategy, ReplyCallback};
pub use local::LocalHeuristic;
pub use remote::RemoteStrategy;

use crate::error::{ChatError, ResolverError};

/// Reply used when a strategy produced nothing.
pub const NO_ANSWER_REPLY: &str = "No answer returned";

/// Reply used for every failure inside the chain.
pub const FAILURE_REPLY: &str = "Error: unable to get response";

/// One reply-producing mechanism.
#[async_trait]
pub trait ReplyStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Produce a reply for a trimmed query.
    async fn reply(&self, query: &str) -> Result<String, ResolverError>;
}

/// Turns a submitted query into a reply string. Never fails.
pub struct ResponseResolver {
    chain: Vec<Box<dyn ReplyStrategy>>,
}

impl std::fmt::Debug for ResponseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseResolver")
            .field("chain", &self.strategy_names())
            .finish()
    }
}

impl ResponseResolver {
    /// Build the chain from the optional callback, the remote settings and
    /// the local heuristic delay.
    pub fn new(
        callback: Option<Arc<dyn ReplyCallback>>,
        remote: &RemoteConfig,
        local_delay: Duration,
    ) -> Result<Self, ChatError> {
        let mut chain: Vec<Box<dyn ReplyStrategy>> = Vec::new();
        if let Some(callback) = callback {
            chain.push(Box::new(CallbackStrategy::new(callback)));
        }
        if let Some(credential) = remote.credential() {
            chain.push(Box::new(RemoteStrategy::new(
                remote.endpoint.clone(),
                credential.clone(),
            )?));
        }
        chain.push(Box::new(LocalHeuristic::new(local_delay)));
        Ok(Self { chain })
    }

    /// Build a resolver from an explicit chain.
    pub fn with_chain(chain: Vec<Box<dyn ReplyStrategy>>) -> Self {
        Self { chain }
    }

    /// Names of the strategies in precedence order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|s| s.name()).collect()
    }

    /// The strategy that will answer the next query.
    pub fn active_strategy(&self) -> Option<&'static str> {
        self.chain.first().map(|s| s.name())
    }

    /// Resolve a reply for `query`.
    ///
    /// Errors and panics raised anywhere in the chain become
    /// [`FAILURE_REPLY`].
    pub async fn resolve(&self, query: &str) -> String {
        let Some(strategy) = self.chain.first() else {
            return NO_ANSWER_REPLY.to_string();
        };

        let outcome = AssertUnwindSafe(strategy.reply(query)).catch_unwind().await;
        match outcome {
            Ok(Ok(reply)) => {
                tracing::info!(strategy = strategy.name(), reply_len = reply.len(), "Reply resolved");
                reply
            }
            Ok(Err(e)) => {
                tracing::warn!(strategy = strategy.name(), error = %e, "Reply strategy failed");
                FAILURE_REPLY.to_string()
            }
            Err(_) => {
                tracing::error!(strategy = strategy.name(), "Reply strategy panicked");
                FAILURE_REPLY.to_string()
            }
        }
    }
}
