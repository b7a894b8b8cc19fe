//! Echo suppression guard
//!
//! When the engine is force-restarted right after the assistant stops
//! speaking, residual buffered audio or acoustic echo from the just-finished
//! speech can still surface as a transcript. A fixed grace window at the
//! start of each reply window discards those rather than degrading the
//! accumulated utterance.

use std::time::Duration;

use tokio::time::Instant;

use crate::session::ListeningState;

/// Decides whether a transcript must be discarded as probable self-echo
#[derive(Debug, Clone)]
pub struct EchoGuard {
    window: Duration,
}

impl EchoGuard {
    /// Create a guard with the given grace window
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Whether a segment arriving at `now` must be suppressed
    ///
    /// True iff the session is in reply mode and the segment arrived inside
    /// the grace window measured from `window_started_at`, the moment the
    /// current reply listening window began.
    #[must_use]
    pub fn should_suppress(
        &self,
        state: ListeningState,
        now: Instant,
        window_started_at: Instant,
    ) -> bool {
        state == ListeningState::ReplyListening
            && now.saturating_duration_since(window_started_at) < self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn suppresses_inside_grace_window() {
        let guard = EchoGuard::new(WINDOW);
        let start = Instant::now();

        assert!(guard.should_suppress(
            ListeningState::ReplyListening,
            start + Duration::from_millis(100),
            start,
        ));
    }

    #[test]
    fn passes_after_grace_window() {
        let guard = EchoGuard::new(WINDOW);
        let start = Instant::now();

        assert!(!guard.should_suppress(
            ListeningState::ReplyListening,
            start + Duration::from_millis(300),
            start,
        ));
        assert!(!guard.should_suppress(
            ListeningState::ReplyListening,
            start + Duration::from_millis(800),
            start,
        ));
    }

    #[test]
    fn only_applies_in_reply_mode() {
        let guard = EchoGuard::new(WINDOW);
        let start = Instant::now();
        let just_after = start + Duration::from_millis(50);

        assert!(!guard.should_suppress(ListeningState::Idle, just_after, start));
        assert!(!guard.should_suppress(ListeningState::WakewordListening, just_after, start));
        assert!(!guard.should_suppress(ListeningState::CommandListening, just_after, start));
    }
}
