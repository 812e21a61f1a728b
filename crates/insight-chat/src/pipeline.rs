//! Send pipeline state machine.
//!
//! Enforces the single-flight send cycle:
//! - Idle -> Sending (a non-empty draft was submitted)
//! - Sending -> Idle (the reply resolved)

use std::fmt;

use crate::error::ChatError;

/// Operational state of the send pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SendState {
    /// No reply outstanding. Submits are accepted.
    #[default]
    Idle,
    /// A reply is being resolved. Submits are rejected.
    Sending,
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendState::Idle => write!(f, "Idle"),
            SendState::Sending => write!(f, "Sending"),
        }
    }
}

impl SendState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SendState) -> bool {
        matches!(
            (self, target),
            (SendState::Idle, SendState::Sending) | (SendState::Sending, SendState::Idle)
        )
    }
}

/// The `sending` gate of a session.
#[derive(Debug, Clone, Default)]
pub struct SendPipeline {
    state: SendState,
}

impl SendPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> SendState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == SendState::Sending
    }

    /// Attempt to transition to the target state.
    pub fn transition(&mut self, target: SendState) -> Result<(), ChatError> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Send state: {} -> {}", self.state, target);
            self.state = target;
            Ok(())
        } else {
            Err(ChatError::InvalidTransition(self.state, target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(SendState::Idle.to_string(), "Idle");
        assert_eq!(SendState::Sending.to_string(), "Sending");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(SendState::Idle.can_transition_to(&SendState::Sending));
        assert!(SendState::Sending.can_transition_to(&SendState::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!SendState::Idle.can_transition_to(&SendState::Idle));
        assert!(!SendState::Sending.can_transition_to(&SendState::Sending));
    }

    #[test]
    fn test_pipeline_cycle() {
        let mut pipeline = SendPipeline::new();
        assert_eq!(pipeline.current(), SendState::Idle);
        assert!(!pipeline.is_sending());

        pipeline.transition(SendState::Sending).unwrap();
        assert!(pipeline.is_sending());

        pipeline.transition(SendState::Idle).unwrap();
        assert_eq!(pipeline.current(), SendState::Idle);
    }

    #[test]
    fn test_pipeline_rejects_second_send() {
        let mut pipeline = SendPipeline::new();
        pipeline.transition(SendState::Sending).unwrap();
        let err = pipeline.transition(SendState::Sending).unwrap_err();
        match err {
            ChatError::InvalidTransition(from, to) => {
                assert_eq!(from, SendState::Sending);
                assert_eq!(to, SendState::Sending);
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
        assert!(pipeline.is_sending());
    }
}
