//! Voice session core
//!
//! The listening state machine and its supporting mechanisms: wake phrase
//! matching, echo suppression, reply utterance accumulation, and the named
//! timer table.

mod echo;
mod machine;
mod state;
mod timers;
mod utterance;
mod wakeword;

pub use echo::EchoGuard;
pub use machine::{MicIntent, SessionEvent, SessionHandle, VoiceSession};
pub use state::ListeningState;
pub use timers::{TimerKind, TimerTable};
pub use utterance::UtteranceAccumulator;
pub use wakeword::WakePhrase;
