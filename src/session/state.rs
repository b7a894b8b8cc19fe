//! Listening states
//!
//! Exactly one state is active at any instant. `Idle` is the initial state
//! and the only state reachable by an explicit user stop.

/// Current listening mode of the voice session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListeningState {
    /// Not listening; engine stopped
    #[default]
    Idle,

    /// Passively listening for the wake phrase
    WakewordListening,

    /// Wake phrase heard with no trailing text; waiting for a command
    CommandListening,

    /// Short window after the assistant finished speaking, during which the
    /// user may reply without repeating the wake phrase
    ReplyListening,
}

impl ListeningState {
    /// Returns a human-readable description of the state
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Idle => "not listening",
            Self::WakewordListening => "listening for wake phrase",
            Self::CommandListening => "waiting for command",
            Self::ReplyListening => "listening for reply",
        }
    }

    /// Whether the engine should be kept alive in this state
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        assert_eq!(ListeningState::default(), ListeningState::Idle);
    }

    #[test]
    fn only_idle_is_inactive() {
        assert!(!ListeningState::Idle.is_active());
        assert!(ListeningState::WakewordListening.is_active());
        assert!(ListeningState::CommandListening.is_active());
        assert!(ListeningState::ReplyListening.is_active());
    }
}
