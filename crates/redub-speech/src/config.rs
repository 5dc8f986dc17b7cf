//! Service endpoint and credential configuration.

use std::time::Duration;

use crate::error::{SpeechError, SpeechResult};

const DEFAULT_RECOGNIZE_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";
const DEFAULT_SYNTHESIZE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Endpoints and credentials for the three cloud services.
///
/// Constructed once at startup and passed by reference into each client
/// constructor. Keys are read from the environment; nothing is written
/// back into the process environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Speech recognition endpoint
    pub recognize_url: String,
    /// API key for recognition and synthesis (passed as a query parameter)
    pub speech_api_key: String,
    /// Chat-completions endpoint for transcript correction
    pub correct_url: String,
    /// API key for the correction endpoint (passed as an `api-key` header)
    pub correct_api_key: String,
    /// Speech synthesis endpoint
    pub synthesize_url: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Build the config from environment variables.
    ///
    /// Required: `REDUB_SPEECH_API_KEY`, `REDUB_CORRECT_URL`,
    /// `REDUB_CORRECT_API_KEY`. Endpoints for recognition/synthesis
    /// default to the public Google endpoints.
    pub fn from_env() -> SpeechResult<Self> {
        let speech_api_key = std::env::var("REDUB_SPEECH_API_KEY")
            .map_err(|_| SpeechError::config("REDUB_SPEECH_API_KEY not set"))?;
        let correct_url = std::env::var("REDUB_CORRECT_URL")
            .map_err(|_| SpeechError::config("REDUB_CORRECT_URL not set"))?;
        let correct_api_key = std::env::var("REDUB_CORRECT_API_KEY")
            .map_err(|_| SpeechError::config("REDUB_CORRECT_API_KEY not set"))?;

        Ok(Self {
            recognize_url: std::env::var("REDUB_RECOGNIZE_URL")
                .unwrap_or_else(|_| DEFAULT_RECOGNIZE_URL.to_string()),
            speech_api_key,
            correct_url,
            correct_api_key,
            synthesize_url: std::env::var("REDUB_SYNTHESIZE_URL")
                .unwrap_or_else(|_| DEFAULT_SYNTHESIZE_URL.to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("REDUB_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        })
    }

    /// Build a reqwest client with this config's timeout.
    pub(crate) fn http_client(&self) -> SpeechResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| SpeechError::config(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Config pointed at a mock server.
    pub fn mock_config(base_url: &str) -> ServiceConfig {
        ServiceConfig {
            recognize_url: format!("{base_url}/v1/speech:recognize"),
            speech_api_key: "test-key".to_string(),
            correct_url: format!("{base_url}/openai/chat/completions"),
            correct_api_key: "test-correct-key".to_string(),
            synthesize_url: format!("{base_url}/v1/text:synthesize"),
            request_timeout: Duration::from_secs(5),
        }
    }
}
