//! Wake phrase matching
//!
//! Case-insensitive substring search over the lower-cased transcript, plus
//! extraction of the command text that follows the phrase.

/// A normalized wake phrase
#[derive(Debug, Clone)]
pub struct WakePhrase {
    phrase: String,
}

impl WakePhrase {
    /// Create a wake phrase, normalized to lowercase and trimmed
    #[must_use]
    pub fn new(phrase: &str) -> Self {
        Self {
            phrase: phrase.to_lowercase().trim().to_string(),
        }
    }

    /// The normalized phrase
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    /// Whether the transcript contains the wake phrase
    #[must_use]
    pub fn matches(&self, transcript: &str) -> bool {
        transcript.to_lowercase().contains(&self.phrase)
    }

    /// Extract the command following the wake phrase
    ///
    /// Returns `None` when the phrase is absent. When present, returns the
    /// text after the first occurrence with leading whitespace and
    /// punctuation trimmed — possibly empty when the phrase stood alone.
    #[must_use]
    pub fn extract_command(&self, transcript: &str) -> Option<String> {
        let lower = transcript.to_lowercase();
        let pos = lower.find(&self.phrase)?;

        let command = transcript[pos + self.phrase.len()..]
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
            .trim_end()
            .to_string();

        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_is_normalized() {
        let wake = WakePhrase::new("  Hey BUDDY  ");
        assert_eq!(wake.as_str(), "hey buddy");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let wake = WakePhrase::new("hey buddy");

        assert!(wake.matches("Hey Buddy"));
        assert!(wake.matches("HEY BUDDY"));
        assert!(wake.matches("ok so hey buddy please help"));
        assert!(!wake.matches("hello world"));
    }

    #[test]
    fn extracts_trailing_command() {
        let wake = WakePhrase::new("hey buddy");

        assert_eq!(
            wake.extract_command("hey buddy what is photosynthesis"),
            Some("what is photosynthesis".to_string())
        );
        assert_eq!(
            wake.extract_command("Hey Buddy, what's the weather?"),
            Some("what's the weather?".to_string())
        );
    }

    #[test]
    fn bare_phrase_extracts_empty_command() {
        let wake = WakePhrase::new("hey buddy");

        assert_eq!(wake.extract_command("hey buddy"), Some(String::new()));
        assert_eq!(wake.extract_command("Hey Buddy."), Some(String::new()));
    }

    #[test]
    fn absent_phrase_extracts_nothing() {
        let wake = WakePhrase::new("hey buddy");
        assert_eq!(wake.extract_command("turn on the lights"), None);
    }

    #[test]
    fn extracts_after_leading_chatter() {
        let wake = WakePhrase::new("hey buddy");
        assert_eq!(
            wake.extract_command("ok so hey buddy please help"),
            Some("please help".to_string())
        );
    }
}
