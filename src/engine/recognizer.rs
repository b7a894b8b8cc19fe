//! Recognition primitive contract
//!
//! The speech-to-text service itself is a black box supplied by the host: a
//! continuous, restartable transcription engine that may auto-terminate after
//! a pause in speech. Implementations deliver [`EngineEvent`]s on the channel
//! handed to the session at spawn time.

use async_trait::async_trait;

use crate::Result;

/// Preferred sample rate for speech capture (16kHz)
pub const SAMPLE_RATE: u32 = 16_000;

/// Microphone capture preferences requested when the engine starts
///
/// Echo cancellation and noise suppression are on by default; auto gain is
/// off because it amplifies the assistant's own playback between utterances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicrophonePreferences {
    /// Request acoustic echo cancellation from the capture device
    pub echo_cancellation: bool,

    /// Request noise suppression from the capture device
    pub noise_suppression: bool,

    /// Request automatic gain control from the capture device
    pub auto_gain_control: bool,

    /// Requested capture sample rate in Hz
    pub sample_rate: u32,
}

impl Default for MicrophonePreferences {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: false,
            sample_rate: SAMPLE_RATE,
        }
    }
}

/// One recognized span of speech within a result batch
///
/// Segments arrive in non-decreasing index order within a batch. Confidence
/// is informational only and is not used for gating.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Recognized text
    pub text: String,

    /// Engine-reported confidence in `[0.0, 1.0]`
    pub confidence: f32,

    /// Whether the engine has marked this segment as no longer subject to
    /// revision
    pub is_final: bool,
}

impl TranscriptSegment {
    /// Convenience constructor for a final segment
    #[must_use]
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
            is_final: true,
        }
    }

    /// Convenience constructor for an interim (provisional) segment
    #[must_use]
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 0.0,
            is_final: false,
        }
    }
}

/// Events emitted by the recognition engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The engine has started listening
    Started,

    /// Audio/speech input was detected
    SpeechStarted,

    /// Speech stopped being detected
    SpeechEnded,

    /// A batch of interim and/or final transcript segments
    Transcript(Vec<TranscriptSegment>),

    /// The engine terminated. This is expected behavior — the service may
    /// auto-terminate after a pause in speech — and is interpreted by the
    /// session, not the adapter.
    Ended,

    /// A transient engine failure. Does not imply termination; recovery rides
    /// the `Ended` path.
    Error(String),
}

/// Continuous speech recognition primitive
///
/// Implementations must deliver [`EngineEvent::Ended`] exactly once for every
/// run that started, whether the run was stopped by the consumer or
/// terminated on its own.
///
/// # Errors
///
/// `start` fails with [`crate::Error::PermissionDenied`] if the user declines
/// microphone access, or [`crate::Error::Unsupported`] if the host has no
/// recognition capability.
#[async_trait]
pub trait SpeechRecognizer: Send {
    /// Request microphone access and begin continuous recognition
    async fn start(&mut self, prefs: &MicrophonePreferences) -> Result<()>;

    /// Stop recognition. Pending audio may still flush as transcript events
    /// before `Ended` is delivered.
    async fn stop(&mut self) -> Result<()>;
}
