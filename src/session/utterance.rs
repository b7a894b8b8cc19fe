//! Reply utterance accumulation
//!
//! While a reply window is open, final transcript fragments are stitched into
//! one utterance; the session submits it after a silence-based debounce.

/// Accumulates transcript fragments into a single pending utterance
#[derive(Debug, Default)]
pub struct UtteranceAccumulator {
    text: String,
    speech_detected: bool,
}

impl UtteranceAccumulator {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment, separated by a single space, and mark speech
    pub fn push_fragment(&mut self, fragment: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
        self.speech_detected = true;
    }

    /// Mark that speech was detected without any final text yet (interim
    /// results)
    pub fn mark_speech(&mut self) {
        self.speech_detected = true;
    }

    /// Whether any speech (interim or final) has been detected this window
    #[must_use]
    pub const fn speech_detected(&self) -> bool {
        self.speech_detected
    }

    /// The accumulated text so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether no text has accumulated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Take the accumulated text, trimmed, leaving the accumulator reset
    #[must_use]
    pub fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.text).trim().to_string();
        self.speech_detected = false;
        text
    }

    /// Clear accumulated text and the speech flag
    pub fn reset(&mut self) {
        self.text.clear();
        self.speech_detected = false;
    }
}
