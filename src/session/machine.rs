//! Voice interaction state machine
//!
//! Coordinates the recognition engine, the session timers, and two
//! externally-mutated signals (assistant speaking, user mic intent) into one
//! race-free listening state. Runs as a single task: one `select!` loop over
//! the host command channel, the engine event channel, and the earliest
//! pending timer. External signal changes arrive as messages on the command
//! channel, so every decision reads the latest value rather than a snapshot
//! captured at state entry.

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::config::SessionConfig;
use crate::engine::{
    EngineEvent, MicrophonePreferences, RecognitionAdapter, SpeechRecognizer, TranscriptSegment,
};
use crate::session::echo::EchoGuard;
use crate::session::timers::{next_timer, TimerKind, TimerTable};
use crate::session::utterance::UtteranceAccumulator;
use crate::session::wakeword::WakePhrase;
use crate::session::ListeningState;
use crate::{Error, Result};

/// Capacity of the host-facing event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the command channel
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// The user's last explicit microphone action
///
/// At most one forced direction is in effect at a time; `Unspecified` means
/// no explicit preference has been recorded since the last clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MicIntent {
    /// No explicit user preference recorded
    #[default]
    Unspecified,

    /// User explicitly turned the microphone on
    ForcedOn,

    /// User explicitly turned the microphone off; overrides auto-management
    ForcedOff,
}

/// Events emitted to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The wake phrase was recognized. Fired the instant the phrase appears,
    /// including in interim results, so the host can cancel in-progress
    /// assistant speech (barge-in).
    WakeWordDetected,

    /// The wake phrase was heard with no trailing command; the host should
    /// prompt for one
    CommandWindowOpened,

    /// One finalized utterance, regardless of which state produced it
    UtteranceReady(String),
}

/// Host operations and external signal changes
enum Command {
    Start { reply: oneshot::Sender<Result<()>> },
    Stop,
    EnableReplyWindow,
    AiSpeakingChanged(bool),
    MicIntentChanged(MicIntent),
    QueryState(oneshot::Sender<ListeningState>),
}

/// Cloneable handle for driving a running voice session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Begin listening for the wake phrase
    ///
    /// Requests microphone permission as a side effect. Calling while already
    /// listening is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] if the user declines microphone
    /// access, [`Error::Unsupported`] if the host has no recognition
    /// capability, or [`Error::SessionClosed`] if the session task is gone.
    pub async fn start_listening(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Start { reply: tx })
            .await
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)?
    }

    /// Stop listening and return to idle. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session task is gone.
    pub async fn stop_listening(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Open a short reply window during which the user may speak without
    /// repeating the wake phrase
    ///
    /// The host calls this once synthesized speech finishes. Refused silently
    /// when the user has explicitly forced the microphone off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session task is gone.
    pub async fn enable_reply_window(&self) -> Result<()> {
        self.send(Command::EnableReplyWindow).await
    }

    /// Signal whether the assistant is currently producing speech
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session task is gone.
    pub async fn set_ai_speaking(&self, speaking: bool) -> Result<()> {
        self.send(Command::AiSpeakingChanged(speaking)).await
    }

    /// Record that the user explicitly disabled the microphone
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session task is gone.
    pub async fn set_user_mic_disabled(&self) -> Result<()> {
        self.send(Command::MicIntentChanged(MicIntent::ForcedOff)).await
    }

    /// Record that the user explicitly enabled the microphone
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session task is gone.
    pub async fn set_user_mic_enabled(&self) -> Result<()> {
        self.send(Command::MicIntentChanged(MicIntent::ForcedOn)).await
    }

    /// Clear any recorded explicit microphone preference
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session task is gone.
    pub async fn clear_mic_intent(&self) -> Result<()> {
        self.send(Command::MicIntentChanged(MicIntent::Unspecified))
            .await
    }

    /// Snapshot the current listening state
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session task is gone.
    pub async fn state(&self) -> Result<ListeningState> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::QueryState(tx))
            .await
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::SessionClosed)
    }
}

/// The voice interaction state machine
pub struct VoiceSession {
    config: SessionConfig,
    wake: WakePhrase,
    adapter: RecognitionAdapter,
    echo: EchoGuard,
    timers: TimerTable,
    utterance: UtteranceAccumulator,
    events: mpsc::Sender<SessionEvent>,

    state: ListeningState,
    /// When the current reply window began; echo grace is measured from here
    reply_window_opened_at: Option<Instant>,
    /// Last final transcript, for discarding engine re-deliveries
    last_final: Option<String>,
    /// Suppresses exactly one `Ended` after a commanded stop
    intentional_stop: bool,
    ai_speaking: bool,
    mic_intent: MicIntent,
}

impl VoiceSession {
    /// Spawn a session around a host-supplied recognizer
    ///
    /// `engine_events` is the channel on which the recognizer delivers its
    /// events. Returns the driving handle and the host-facing event stream.
    #[must_use]
    pub fn spawn(
        config: SessionConfig,
        recognizer: Box<dyn SpeechRecognizer>,
        engine_events: mpsc::Receiver<EngineEvent>,
    ) -> (SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let mic: MicrophonePreferences = config.mic.clone();
        let session = Self {
            wake: WakePhrase::new(&config.wake_phrase),
            echo: EchoGuard::new(config.echo_suppress_window),
            adapter: RecognitionAdapter::new(recognizer, mic),
            timers: TimerTable::new(),
            utterance: UtteranceAccumulator::new(),
            events: event_tx,
            state: ListeningState::Idle,
            reply_window_opened_at: None,
            last_final: None,
            intentional_stop: false,
            ai_speaking: false,
            mic_intent: MicIntent::Unspecified,
            config,
        };

        tokio::spawn(session.run(command_rx, engine_events));

        (SessionHandle { commands: command_tx }, event_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut engine: mpsc::Receiver<EngineEvent>,
    ) {
        loop {
            let deadline = self.timers.next_deadline();

            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                event = engine.recv() => match event {
                    Some(event) => self.handle_engine_event(event).await,
                    None => {
                        tracing::debug!("engine event channel closed");
                        break;
                    }
                },
                kind = next_timer(deadline) => {
                    if self.timers.take(kind) {
                        self.handle_timer(kind).await;
                    }
                }
            }
        }

        self.adapter.stop().await;
        tracing::debug!("voice session stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { reply } => {
                let _ = reply.send(self.start_listening().await);
            }
            Command::Stop => self.stop_listening().await,
            Command::EnableReplyWindow => self.enable_reply_window().await,
            Command::AiSpeakingChanged(speaking) => {
                tracing::trace!(speaking, "assistant speaking changed");
                self.ai_speaking = speaking;
            }
            Command::MicIntentChanged(intent) => {
                tracing::debug!(?intent, "user mic intent changed");
                self.mic_intent = intent;
            }
            Command::QueryState(tx) => {
                let _ = tx.send(self.state);
            }
        }
    }

    async fn start_listening(&mut self) -> Result<()> {
        if self.state != ListeningState::Idle {
            tracing::warn!(state = ?self.state, "already listening, ignoring start request");
            return Ok(());
        }

        self.adapter.start().await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to start recognition");
        })?;

        self.intentional_stop = false;
        self.last_final = None;
        self.set_state(ListeningState::WakewordListening);
        Ok(())
    }

    async fn stop_listening(&mut self) {
        if self.state == ListeningState::Idle {
            tracing::debug!("already idle, ignoring stop request");
            return;
        }

        if self.adapter.is_running() {
            self.intentional_stop = true;
        }
        self.set_state(ListeningState::Idle);
        self.utterance.reset();
        self.last_final = None;
        self.adapter.stop().await;
    }

    async fn enable_reply_window(&mut self) {
        if self.mic_intent == MicIntent::ForcedOff {
            tracing::info!("user disabled microphone, refusing reply window");
            return;
        }
        if self.state == ListeningState::Idle {
            tracing::debug!("not listening, ignoring reply window");
            return;
        }

        self.timers.clear();
        self.utterance.reset();
        self.last_final = None;
        self.set_state(ListeningState::ReplyListening);

        // Force a fresh recognition run so the reply window doesn't inherit
        // interim buffers filled by the assistant's own speech
        if self.adapter.is_running() {
            self.intentional_stop = true;
        }
        if let Err(e) = self.adapter.restart().await {
            tracing::error!(error = %e, "failed to restart engine for reply window");
        }

        self.reply_window_opened_at = Some(Instant::now());
        self.timers
            .arm(TimerKind::ReplyWindowTimeout, self.config.reply_window_timeout);
        tracing::debug!("reply window opened");
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started => tracing::debug!("engine reported started"),
            EngineEvent::SpeechStarted => tracing::trace!("speech input detected"),
            EngineEvent::SpeechEnded => self.on_speech_ended(),
            EngineEvent::Transcript(segments) => self.on_transcript(&segments),
            EngineEvent::Ended => self.on_engine_ended().await,
            EngineEvent::Error(message) => {
                // Transient by definition; recovery rides the Ended path
                tracing::warn!(error = %message, "engine error");
            }
        }
    }

    fn on_speech_ended(&mut self) {
        if self.state == ListeningState::ReplyListening && self.utterance.speech_detected() {
            self.timers.arm(
                TimerKind::ReplySilenceDebounce,
                self.config.reply_silence_debounce,
            );
        }
    }

    fn on_transcript(&mut self, segments: &[TranscriptSegment]) {
        let (interim, finals) = split_batch(segments);

        if !interim.is_empty() {
            self.on_interim(&interim);
        }
        if !finals.is_empty() {
            self.on_final(finals);
        }
    }

    fn on_interim(&mut self, text: &str) {
        match self.state {
            ListeningState::WakewordListening => {
                if self.wake.matches(text) {
                    if self.ai_speaking {
                        tracing::info!("wake phrase during assistant speech, barge-in");
                    }
                    self.emit(SessionEvent::WakeWordDetected);
                }
            }
            ListeningState::ReplyListening => {
                if self.ai_speaking {
                    return;
                }
                if self.within_echo_window() {
                    tracing::debug!(text, "interim inside echo window, dropped");
                    return;
                }
                if !self.utterance.speech_detected() {
                    tracing::debug!("speech detected in reply window");
                    self.utterance.mark_speech();
                    self.timers.cancel(TimerKind::ReplyWindowTimeout);
                }
            }
            ListeningState::Idle | ListeningState::CommandListening => {}
        }
    }

    fn on_final(&mut self, text: String) {
        // The engine can re-deliver the same result across restarts
        if self.last_final.as_deref() == Some(text.as_str()) {
            tracing::debug!(%text, "duplicate final transcript dropped");
            return;
        }
        self.last_final = Some(text.clone());

        match self.state {
            ListeningState::WakewordListening => self.on_wakeword_final(&text),
            ListeningState::CommandListening => {
                tracing::info!(command = %text, "command received");
                self.last_final = None;
                self.set_state(ListeningState::WakewordListening);
                self.emit(SessionEvent::UtteranceReady(text.trim().to_string()));
            }
            ListeningState::ReplyListening => self.on_reply_final(&text),
            ListeningState::Idle => {
                tracing::debug!(%text, "final transcript while idle, dropped");
            }
        }
    }

    fn on_wakeword_final(&mut self, text: &str) {
        let Some(command) = self.wake.extract_command(text) else {
            tracing::trace!(text, "no wake phrase, continuing to listen");
            return;
        };

        if self.ai_speaking {
            tracing::info!("wake phrase during assistant speech, barge-in");
        }
        self.emit(SessionEvent::WakeWordDetected);
        self.last_final = None;

        if command.is_empty() {
            tracing::info!("wake phrase heard, waiting for command");
            self.set_state(ListeningState::CommandListening);
            self.timers
                .arm(TimerKind::CommandTimeout, self.config.command_timeout);
            self.emit(SessionEvent::CommandWindowOpened);
        } else {
            tracing::info!(command = %command, "wake phrase with trailing command");
            self.emit(SessionEvent::UtteranceReady(command));
        }
    }

    fn on_reply_final(&mut self, text: &str) {
        if self.ai_speaking {
            tracing::debug!(text, "assistant still speaking, transcript dropped");
            self.last_final = None;
            return;
        }
        if self.within_echo_window() {
            tracing::debug!(text, "final inside echo window, dropped as echo");
            self.last_final = None;
            return;
        }

        if !self.utterance.speech_detected() {
            tracing::debug!("speech detected in reply window");
            self.timers.cancel(TimerKind::ReplyWindowTimeout);
        }

        // A reply that repeats the wake phrase keeps only the text after it
        let fragment = self
            .wake
            .extract_command(text)
            .unwrap_or_else(|| text.trim().to_string());
        if fragment.is_empty() {
            self.utterance.mark_speech();
        } else {
            self.utterance.push_fragment(&fragment);
            tracing::debug!(accumulated = %self.utterance.text(), "reply fragment accumulated");
        }

        self.timers.arm(
            TimerKind::ReplySilenceDebounce,
            self.config.reply_final_debounce,
        );
    }

    async fn on_engine_ended(&mut self) {
        self.adapter.note_ended();

        if self.intentional_stop {
            // Consumed exactly once
            self.intentional_stop = false;
            tracing::debug!("engine ended after intentional stop");
            return;
        }
        if self.state == ListeningState::Idle {
            tracing::debug!("engine ended while idle");
            return;
        }

        // Fallback: the engine died mid-reply with text in hand; submit it
        // before the generic restart rule applies
        if self.state == ListeningState::ReplyListening
            && self.utterance.speech_detected()
            && !self.utterance.is_empty()
        {
            tracing::info!("engine ended mid-reply, finalizing accumulated utterance");
            self.finalize_reply();
        }

        // Keep the continuous-listening illusion alive
        tracing::debug!(state = ?self.state, "engine ended unexpectedly, restarting");
        if let Err(e) = self.adapter.start().await {
            tracing::error!(error = %e, "failed to restart engine");
        }
    }

    async fn handle_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::CommandTimeout => {
                if self.state != ListeningState::CommandListening {
                    return;
                }
                tracing::info!("command window expired with no speech");
                self.set_state(ListeningState::WakewordListening);
            }
            TimerKind::ReplyWindowTimeout => {
                if self.state != ListeningState::ReplyListening {
                    return;
                }
                tracing::info!("reply window expired with no speech");
                self.utterance.reset();
                self.set_state(ListeningState::WakewordListening);
            }
            TimerKind::ReplySilenceDebounce => {
                if self.state != ListeningState::ReplyListening || self.utterance.is_empty() {
                    return;
                }
                self.finalize_reply();

                // Fresh run for the next window so stale audio can't leak in
                if self.adapter.is_running() {
                    self.intentional_stop = true;
                }
                if let Err(e) = self.adapter.restart().await {
                    tracing::error!(error = %e, "failed to restart engine after reply");
                }
            }
        }
    }

    /// Submit the accumulated reply and return to wake word listening
    ///
    /// Single finalization path shared by the silence debounce and the
    /// engine-ended fallback; engine handling stays with the caller.
    fn finalize_reply(&mut self) {
        let text = self.utterance.take();
        self.last_final = None;
        self.set_state(ListeningState::WakewordListening);

        if text.is_empty() {
            return;
        }
        tracing::info!(reply = %text, "reply utterance finalized");
        self.emit(SessionEvent::UtteranceReady(text));
    }

    /// Transition states, cancelling every timer owned by the old state
    fn set_state(&mut self, next: ListeningState) {
        if self.state == next {
            return;
        }

        self.timers.clear();
        if self.state == ListeningState::ReplyListening {
            self.reply_window_opened_at = None;
        }
        tracing::info!(from = ?self.state, to = ?next, "listening state changed");
        self.state = next;
    }

    fn within_echo_window(&self) -> bool {
        self.reply_window_opened_at
            .is_some_and(|opened| self.echo.should_suppress(self.state, Instant::now(), opened))
    }

    fn emit(&self, event: SessionEvent) {
        if let Err(e) = self.events.try_send(event) {
            tracing::warn!(error = %e, "dropping session event, receiver unavailable");
        }
    }
}

/// Split a result batch into concatenated interim and final text
fn split_batch(segments: &[TranscriptSegment]) -> (String, String) {
    let mut interim = String::new();
    let mut finals = String::new();

    for segment in segments {
        if segment.is_final {
            finals.push_str(&segment.text);
        } else {
            interim.push_str(&segment.text);
        }
    }

    (interim, finals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_batch_separates_interim_and_final() {
        let segments = vec![
            TranscriptSegment::final_text("hey buddy "),
            TranscriptSegment::final_text("turn on the lights"),
            TranscriptSegment::interim("and al"),
        ];

        let (interim, finals) = split_batch(&segments);
        assert_eq!(interim, "and al");
        assert_eq!(finals, "hey buddy turn on the lights");
    }

    #[test]
    fn split_batch_empty_input() {
        let (interim, finals) = split_batch(&[]);
        assert!(interim.is_empty());
        assert!(finals.is_empty());
    }

    #[test]
    fn mic_intent_defaults_to_unspecified() {
        assert_eq!(MicIntent::default(), MicIntent::Unspecified);
    }
}
