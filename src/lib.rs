//! Wakeloop - voice interaction state machine for hands-free AI assistants
//!
//! This library coordinates a continuous, auto-terminating speech recognition
//! engine, overlapping session timers, and externally-mutated signals
//! (assistant speaking, user mic intent) into a single coherent listening
//! state: wake phrase detection, command capture, and a short reply window
//! that tolerates the assistant's own speech echoing back through the
//! microphone.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                       Host                           │
//! │  TTS/playback │ conversational backend │ UI          │
//! └───────┬────────────────────────────────▲────────────┘
//!         │ commands + signals             │ session events
//! ┌───────▼────────────────────────────────┴────────────┐
//! │                   VoiceSession                       │
//! │  state machine │ timers │ echo guard │ accumulator  │
//! └───────┬────────────────────────────────▲────────────┘
//!         │ start/stop                     │ engine events
//! ┌───────▼────────────────────────────────┴────────────┐
//! │          Recognition engine (host-supplied)          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The session owns the single engine handle, restarts it whenever it
//! terminates unexpectedly, and emits one event per finalized utterance no
//! matter which listening mode produced it.

pub mod config;
pub mod engine;
pub mod error;
pub mod session;

pub use config::{SessionConfig, DEFAULT_WAKE_PHRASE};
pub use engine::{
    EngineEvent, MicrophonePreferences, RecognitionAdapter, SpeechRecognizer, TranscriptSegment,
    SAMPLE_RATE,
};
pub use error::{Error, Result};
pub use session::{
    EchoGuard, ListeningState, MicIntent, SessionEvent, SessionHandle, UtteranceAccumulator,
    VoiceSession, WakePhrase,
};
