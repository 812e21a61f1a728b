//! Local heuristic replies used when no callback or credential is configured.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use super::ReplyStrategy;
use crate::error::ResolverError;

pub const GREETING_REPLY: &str = "Hello! How can I assist you today?";
pub const HELP_REPLY: &str =
    "I'm here to help! You can ask me questions, and I'll do my best to assist you.";
pub const THANKS_REPLY: &str = "You're welcome! Feel free to ask if you need anything else.";

struct TokenFamilies {
    greeting: Regex,
    help: Regex,
    thanks: Regex,
}

static TOKEN_FAMILIES: LazyLock<TokenFamilies> = LazyLock::new(|| TokenFamilies {
    greeting: Regex::new(r"\b(?:hi|hello|hey)\b").unwrap(),
    help: Regex::new(r"\bhelp").unwrap(),
    thanks: Regex::new(r"\bthank").unwrap(),
});

/// Canned replies chosen by keyword, returned after a fixed delay.
#[derive(Debug, Clone)]
pub struct LocalHeuristic {
    delay: Duration,
}

impl LocalHeuristic {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Pick the reply for `query` without waiting.
    ///
    /// Token families are checked in order: greeting, help, thanks; anything
    /// else is echoed back.
    pub fn compose(query: &str) -> String {
        let lowered = query.trim().to_lowercase();
        let families = &*TOKEN_FAMILIES;

        if families.greeting.is_match(&lowered) {
            GREETING_REPLY.to_string()
        } else if families.help.is_match(&lowered) {
            HELP_REPLY.to_string()
        } else if families.thanks.is_match(&lowered) {
            THANKS_REPLY.to_string()
        } else {
            format!(
                "I received your message: \"{}\". This is a demo response. Configure an API to get real answers.",
                query
            )
        }
    }
}

#[async_trait]
impl ReplyStrategy for LocalHeuristic {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn reply(&self, query: &str) -> Result<String, ResolverError> {
        let reply = Self::compose(query);
        tokio::time::sleep(self.delay).await;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Token families ----

    #[test]
    fn test_greeting_tokens() {
        assert_eq!(LocalHeuristic::compose("hello"), GREETING_REPLY);
        assert_eq!(LocalHeuristic::compose("Hi there"), GREETING_REPLY);
        assert_eq!(LocalHeuristic::compose("  HEY!  "), GREETING_REPLY);
    }

    #[test]
    fn test_greeting_requires_whole_word() {
        // "this" and "which" contain "hi" but are not greetings.
        assert_ne!(LocalHeuristic::compose("this chart"), GREETING_REPLY);
        assert_ne!(LocalHeuristic::compose("which region"), GREETING_REPLY);
    }

    #[test]
    fn test_help_token() {
        assert_eq!(LocalHeuristic::compose("I need help"), HELP_REPLY);
        assert_eq!(LocalHeuristic::compose("helpful tips?"), HELP_REPLY);
    }

    #[test]
    fn test_thanks_token() {
        assert_eq!(LocalHeuristic::compose("thanks a lot"), THANKS_REPLY);
        assert_eq!(LocalHeuristic::compose("Thank you"), THANKS_REPLY);
    }

    #[test]
    fn test_family_order() {
        // Greeting wins over help, help wins over thanks.
        assert_eq!(LocalHeuristic::compose("hello, help me"), GREETING_REPLY);
        assert_eq!(LocalHeuristic::compose("thanks for the help"), HELP_REPLY);
    }

    #[test]
    fn test_echo_contains_input() {
        let reply = LocalHeuristic::compose("xyz");
        assert!(reply.contains("\"xyz\""));
        assert!(reply.starts_with("I received your message"));
    }

    // ---- Delay ----

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_delay() {
        let local = LocalHeuristic::new(Duration::from_millis(500));
        let start = tokio::time::Instant::now();
        let reply = local.reply("hello").await.unwrap();
        assert_eq!(reply, GREETING_REPLY);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
