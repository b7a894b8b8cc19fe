//! Configuration management for the wakeloop session core

pub mod file;

use std::time::Duration;

use crate::engine::MicrophonePreferences;

/// Default wake phrase
pub const DEFAULT_WAKE_PHRASE: &str = "hey buddy";

/// Session configuration
///
/// The timing windows are empirical values tuned against real hardware; they
/// are kept configurable so hosts can recalibrate without a rebuild.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Phrase that activates command capture (matched case-insensitively)
    pub wake_phrase: String,

    /// How long to wait for a command after a bare wake phrase
    pub command_timeout: Duration,

    /// How long a reply window stays open when no speech is detected
    pub reply_window_timeout: Duration,

    /// How long after a silence signal before an accumulated reply is submitted
    pub reply_silence_debounce: Duration,

    /// How long after the latest final fragment before an accumulated reply
    /// is submitted
    pub reply_final_debounce: Duration,

    /// Grace window after a reply window opens during which transcripts are
    /// discarded as probable self-echo
    pub echo_suppress_window: Duration,

    /// Microphone capture preferences passed to the recognition engine
    pub mic: MicrophonePreferences,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wake_phrase: DEFAULT_WAKE_PHRASE.to_string(),
            command_timeout: Duration::from_millis(2000),
            reply_window_timeout: Duration::from_millis(2000),
            reply_silence_debounce: Duration::from_millis(500),
            reply_final_debounce: Duration::from_millis(1000),
            echo_suppress_window: Duration::from_millis(300),
            mic: MicrophonePreferences::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration with priority: env > config file > default
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();
        let default = Self::default();

        let wake_phrase = std::env::var("WAKELOOP_WAKE_PHRASE")
            .ok()
            .or(fc.session.wake_phrase)
            .unwrap_or(default.wake_phrase);

        let mic = MicrophonePreferences {
            echo_cancellation: fc
                .mic
                .echo_cancellation
                .unwrap_or(default.mic.echo_cancellation),
            noise_suppression: fc
                .mic
                .noise_suppression
                .unwrap_or(default.mic.noise_suppression),
            auto_gain_control: fc
                .mic
                .auto_gain_control
                .unwrap_or(default.mic.auto_gain_control),
            sample_rate: fc.mic.sample_rate.unwrap_or(default.mic.sample_rate),
        };

        Self {
            wake_phrase,
            command_timeout: env_millis("WAKELOOP_COMMAND_TIMEOUT_MS")
                .or(fc.session.command_timeout_ms.map(Duration::from_millis))
                .unwrap_or(default.command_timeout),
            reply_window_timeout: env_millis("WAKELOOP_REPLY_WINDOW_TIMEOUT_MS")
                .or(fc.session.reply_window_timeout_ms.map(Duration::from_millis))
                .unwrap_or(default.reply_window_timeout),
            reply_silence_debounce: env_millis("WAKELOOP_REPLY_SILENCE_DEBOUNCE_MS")
                .or(fc
                    .session
                    .reply_silence_debounce_ms
                    .map(Duration::from_millis))
                .unwrap_or(default.reply_silence_debounce),
            reply_final_debounce: env_millis("WAKELOOP_REPLY_FINAL_DEBOUNCE_MS")
                .or(fc.session.reply_final_debounce_ms.map(Duration::from_millis))
                .unwrap_or(default.reply_final_debounce),
            echo_suppress_window: env_millis("WAKELOOP_ECHO_SUPPRESS_WINDOW_MS")
                .or(fc.session.echo_suppress_window_ms.map(Duration::from_millis))
                .unwrap_or(default.echo_suppress_window),
            mic,
        }
    }

    /// Override the wake phrase, builder style
    #[must_use]
    pub fn with_wake_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.wake_phrase = phrase.into();
        self
    }
}

/// Parse a millisecond duration from an environment variable
fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_windows() {
        let config = SessionConfig::default();
        assert_eq!(config.wake_phrase, "hey buddy");
        assert_eq!(config.command_timeout, Duration::from_millis(2000));
        assert_eq!(config.reply_window_timeout, Duration::from_millis(2000));
        assert_eq!(config.reply_silence_debounce, Duration::from_millis(500));
        assert_eq!(config.reply_final_debounce, Duration::from_millis(1000));
        assert_eq!(config.echo_suppress_window, Duration::from_millis(300));
    }

    #[test]
    fn with_wake_phrase_overrides() {
        let config = SessionConfig::default().with_wake_phrase("hey orin");
        assert_eq!(config.wake_phrase, "hey orin");
    }
}
