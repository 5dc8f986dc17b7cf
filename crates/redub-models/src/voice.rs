//! Voice selection for speech synthesis.

use serde::{Deserialize, Serialize};

/// Language and voice used for recognition and synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSelection {
    /// BCP-47 language code (e.g. "en-US")
    pub language_code: String,
    /// Service voice name (e.g. "en-US-Wavenet-A"); must be known to the
    /// synthesis service or the call is rejected
    pub voice_name: String,
}

impl Default for VoiceSelection {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            voice_name: "en-US-Wavenet-A".to_string(),
        }
    }
}

impl VoiceSelection {
    pub fn new(language_code: impl Into<String>, voice_name: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            voice_name: voice_name.into(),
        }
    }
}
