//! Transcript correction via a chat-completions endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::error::{SpeechError, SpeechResult};

const SERVICE: &str = "correction";

/// Client for the language-model correction endpoint.
pub struct CorrectorClient {
    client: Client,
    url: String,
    api_key: String,
    /// Output token budget for the completion
    max_tokens: u32,
    /// Hard bound on input length; the response token budget would
    /// silently truncate anything longer, so over-long input is refused
    /// up front instead
    max_transcript_chars: usize,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl CorrectorClient {
    /// Create a new corrector client.
    pub fn new(
        config: &ServiceConfig,
        max_tokens: u32,
        max_transcript_chars: usize,
    ) -> SpeechResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            url: config.correct_url.clone(),
            api_key: config.correct_api_key.clone(),
            max_tokens,
            max_transcript_chars,
        })
    }

    /// Correct `transcript`, returning the trimmed first-choice content.
    ///
    /// A non-success status is a typed error carrying the status code
    /// and response body; the caller must not proceed to synthesis on
    /// any error from here.
    pub async fn correct(&self, transcript: &str) -> SpeechResult<String> {
        if transcript.trim().is_empty() {
            return Err(SpeechError::EmptyInput(SERVICE));
        }
        if transcript.len() > self.max_transcript_chars {
            return Err(SpeechError::TranscriptTooLong {
                chars: transcript.len(),
                max: self.max_transcript_chars,
            });
        }

        let request = CompletionRequest {
            messages: vec![Message {
                role: "user",
                content: transcript,
            }],
            max_tokens: self.max_tokens,
        };

        debug!("Correcting transcript ({} chars)", transcript.len());

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::request(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::service_status(SERVICE, status, body));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::malformed(SERVICE, e.to_string()))?;

        let corrected = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| SpeechError::malformed(SERVICE, "no choices in response"))?;

        info!("Correction returned {} chars", corrected.len());
        Ok(corrected)
    }
}
