//! Error types for the wakeloop session core

use thiserror::Error;

/// Result type alias for wakeloop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice session core
#[derive(Debug, Error)]
pub enum Error {
    /// No speech recognition capability exists on this host
    #[error("speech recognition is not supported on this host")]
    Unsupported,

    /// The user declined microphone access
    #[error("microphone permission denied")]
    PermissionDenied,

    /// Failure surfaced by the underlying recognition service
    #[error("engine error: {0}")]
    Engine(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The session task has shut down and can no longer accept operations
    #[error("voice session closed")]
    SessionClosed,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error is terminal for the session (no retry is useful)
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Unsupported | Self::SessionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_errors() {
        assert!(Error::Unsupported.is_terminal());
        assert!(Error::SessionClosed.is_terminal());
        assert!(!Error::PermissionDenied.is_terminal());
        assert!(!Error::Engine("mic glitch".to_string()).is_terminal());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::PermissionDenied.to_string(),
            "microphone permission denied"
        );
        assert_eq!(
            Error::Engine("no audio".to_string()).to_string(),
            "engine error: no audio"
        );
    }
}
