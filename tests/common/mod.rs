//! Shared test utilities
//!
//! A scripted recognition engine and helpers for driving the session without
//! audio hardware.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use wakeloop::{
    EngineEvent, Error, MicrophonePreferences, Result, SessionConfig, SessionEvent, SessionHandle,
    SpeechRecognizer, TranscriptSegment, VoiceSession,
};

/// How a scripted recognizer should fail its next start
#[derive(Debug, Clone, Copy)]
pub enum StartFailure {
    PermissionDenied,
    Unsupported,
}

/// Recognition stub that records lifecycle calls and honors the
/// one-`Ended`-per-run contract
pub struct ScriptedRecognizer {
    events: mpsc::Sender<EngineEvent>,
    calls: Arc<Mutex<Vec<&'static str>>>,
    fail_start: Option<StartFailure>,
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn start(&mut self, _prefs: &MicrophonePreferences) -> Result<()> {
        self.calls.lock().unwrap().push("start");
        match self.fail_start {
            Some(StartFailure::PermissionDenied) => Err(Error::PermissionDenied),
            Some(StartFailure::Unsupported) => Err(Error::Unsupported),
            None => {
                let _ = self.events.try_send(EngineEvent::Started);
                Ok(())
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push("stop");
        let _ = self.events.try_send(EngineEvent::Ended);
        Ok(())
    }
}

/// A spawned session plus the hooks the tests drive it with
pub struct Harness {
    pub session: SessionHandle,
    pub events: mpsc::Receiver<SessionEvent>,
    pub engine: mpsc::Sender<EngineEvent>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Harness {
    /// Number of times the recognizer was started
    pub fn start_calls(&self) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == "start").count()
    }

    /// Number of times the recognizer was stopped
    pub fn stop_calls(&self) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == "stop").count()
    }
}

/// Spawn a session with default configuration
pub fn spawn_session() -> Harness {
    spawn_with(SessionConfig::default(), None)
}

/// Spawn a session with the given configuration and optional start failure
pub fn spawn_with(config: SessionConfig, fail_start: Option<StartFailure>) -> Harness {
    init_tracing();

    let (engine_tx, engine_rx) = mpsc::channel(64);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recognizer = ScriptedRecognizer {
        events: engine_tx.clone(),
        calls: Arc::clone(&calls),
        fail_start,
    };

    let (session, events) = VoiceSession::spawn(config, Box::new(recognizer), engine_rx);

    Harness {
        session,
        events,
        engine: engine_tx,
        calls,
    }
}

/// Initialize test logging; safe to call repeatedly
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Let the session task drain everything already queued
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Deliver a final transcript segment and let the session process it
pub async fn send_final(engine: &mpsc::Sender<EngineEvent>, text: &str) {
    engine
        .send(EngineEvent::Transcript(vec![TranscriptSegment::final_text(
            text,
        )]))
        .await
        .expect("engine channel closed");
    settle().await;
}

/// Deliver an interim transcript segment and let the session process it
pub async fn send_interim(engine: &mpsc::Sender<EngineEvent>, text: &str) {
    engine
        .send(EngineEvent::Transcript(vec![TranscriptSegment::interim(
            text,
        )]))
        .await
        .expect("engine channel closed");
    settle().await;
}

/// Wait for the next session event
pub async fn next_event(events: &mut mpsc::Receiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(Duration::from_millis(250), events.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("event channel closed")
}

/// Assert that no session event is pending
pub async fn assert_no_event(events: &mut mpsc::Receiver<SessionEvent>) {
    let pending = tokio::time::timeout(Duration::from_millis(10), events.recv()).await;
    assert!(pending.is_err(), "unexpected session event: {pending:?}");
}
