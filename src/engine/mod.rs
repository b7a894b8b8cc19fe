//! Recognition engine integration
//!
//! Defines the black-box recognition primitive contract and the adapter that
//! owns a single engine handle on behalf of the session.

mod adapter;
mod recognizer;

pub use adapter::RecognitionAdapter;
pub use recognizer::{
    EngineEvent, MicrophonePreferences, SpeechRecognizer, TranscriptSegment, SAMPLE_RATE,
};
