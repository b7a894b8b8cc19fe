//! Adapter over the raw recognition engine
//!
//! Owns exactly one engine handle at a time and normalizes its lifecycle:
//! idempotent stop, permission failures surfaced as `Result`, restart as a
//! stop/start pair. Interpretation of engine events (including the expected
//! auto-termination) belongs to the session, not here.

use crate::engine::{MicrophonePreferences, SpeechRecognizer};
use crate::Result;

/// Wraps one instance of a continuous, restartable recognition primitive
pub struct RecognitionAdapter {
    recognizer: Box<dyn SpeechRecognizer>,
    prefs: MicrophonePreferences,
    running: bool,
}

impl RecognitionAdapter {
    /// Create an adapter around a host-supplied recognition primitive
    #[must_use]
    pub fn new(recognizer: Box<dyn SpeechRecognizer>, prefs: MicrophonePreferences) -> Self {
        Self {
            recognizer,
            prefs,
            running: false,
        }
    }

    /// Start the engine, requesting microphone access with the configured
    /// capture preferences
    ///
    /// Starting while already running is a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PermissionDenied`] if the user declines
    /// microphone access, or [`crate::Error::Unsupported`] if the host has no
    /// recognition capability.
    pub async fn start(&mut self) -> Result<()> {
        if self.running {
            tracing::debug!("engine already running, ignoring start");
            return Ok(());
        }

        self.recognizer.start(&self.prefs).await?;
        self.running = true;
        tracing::debug!("engine started");
        Ok(())
    }

    /// Stop the engine, fire-and-forget
    ///
    /// Idempotent: stopping while not started is a logged no-op, not an
    /// error. Failures from the underlying service are logged and swallowed.
    pub async fn stop(&mut self) {
        if !self.running {
            tracing::debug!("engine not running, ignoring stop");
            return;
        }

        self.running = false;
        if let Err(e) = self.recognizer.stop().await {
            tracing::warn!(error = %e, "engine stop failed");
        } else {
            tracing::debug!("engine stopped");
        }
    }

    /// Stop and immediately start a fresh recognition run
    ///
    /// Used when a new listening window must not inherit buffered audio from
    /// the previous one.
    ///
    /// # Errors
    ///
    /// Propagates start failures; the stop half never fails.
    pub async fn restart(&mut self) -> Result<()> {
        self.stop().await;
        self.start().await
    }

    /// Record that the engine terminated on its own
    ///
    /// Called by the session when it receives `Ended`, so a later `stop`
    /// doesn't poke a dead engine.
    pub fn note_ended(&mut self) {
        self.running = false;
    }

    /// Whether the adapter believes the engine is currently running
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }
}
