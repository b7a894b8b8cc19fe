//! Named session timers
//!
//! All waiting in the session is expressed as named timers in one table, at
//! most one live instance per name. The cancellation discipline is uniform:
//! entering any new state clears the whole table before arming new entries.

use std::time::Duration;

use tokio::time::Instant;

/// Timer names owned by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Command window after a bare wake phrase (`CommandListening` only)
    CommandTimeout,

    /// Reply window before reverting to wake word mode when no speech is
    /// detected (`ReplyListening` only)
    ReplyWindowTimeout,

    /// Debounce before submitting an accumulated reply, re-armed on every
    /// silence signal or new final fragment
    ReplySilenceDebounce,
}

/// Pending timer table
#[derive(Debug, Default)]
pub struct TimerTable {
    entries: Vec<(TimerKind, Instant)>,
}

impl TimerTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer to fire after `delay`, replacing any live instance of the
    /// same name
    pub fn arm(&mut self, kind: TimerKind, delay: Duration) {
        self.entries.retain(|(k, _)| *k != kind);
        self.entries.push((kind, Instant::now() + delay));
        tracing::trace!(?kind, ?delay, "timer armed");
    }

    /// Cancel a timer, returning whether it was live
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != kind);
        before != self.entries.len()
    }

    /// Cancel every pending timer
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::trace!(count = self.entries.len(), "timer table cleared");
        }
        self.entries.clear();
    }

    /// Whether a timer of the given name is live
    #[must_use]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }

    /// Whether any timer is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The earliest pending deadline, if any
    #[must_use]
    pub fn next_deadline(&self) -> Option<(TimerKind, Instant)> {
        self.entries.iter().min_by_key(|(_, at)| *at).copied()
    }

    /// Remove a fired timer from the table, returning whether it was still
    /// live when it fired
    pub fn take(&mut self, kind: TimerKind) -> bool {
        self.cancel(kind)
    }
}

/// Wait until the given deadline elapses, or forever when none is pending
///
/// Cancel-safe: dropping the future (because another select branch won)
/// leaves the table untouched; the next loop iteration recomputes the
/// earliest deadline.
pub async fn next_timer(deadline: Option<(TimerKind, Instant)>) -> TimerKind {
    match deadline {
        Some((kind, at)) => {
            tokio::time::sleep_until(at).await;
            kind
        }
        None => std::future::pending().await,
    }
}
