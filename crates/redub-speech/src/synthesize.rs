//! Speech synthesis client.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use redub_models::{AudioEncoding, VoiceSelection};

use crate::config::ServiceConfig;
use crate::error::{SpeechError, SpeechResult};

const SERVICE: &str = "synthesis";

/// Client for the speech synthesis endpoint.
pub struct SynthesizerClient {
    client: Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceParams<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceParams<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: AudioEncoding,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    /// Base64-encoded audio bytes
    #[serde(rename = "audioContent")]
    audio_content: String,
}

impl SynthesizerClient {
    /// Create a new synthesizer client.
    pub fn new(config: &ServiceConfig) -> SpeechResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            url: config.synthesize_url.clone(),
            api_key: config.speech_api_key.clone(),
        })
    }

    /// Synthesize `text` with the given voice and write the audio to `output`.
    ///
    /// Empty text is refused here as well as at the pipeline level; the
    /// service's behavior on it is undefined. An unknown voice name
    /// surfaces as the service's status/body.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceSelection,
        output: impl AsRef<Path>,
    ) -> SpeechResult<()> {
        let output = output.as_ref();

        if text.trim().is_empty() {
            return Err(SpeechError::EmptyInput(SERVICE));
        }

        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceParams {
                language_code: &voice.language_code,
                name: &voice.voice_name,
            },
            audio_config: AudioConfig {
                audio_encoding: AudioEncoding::Mp3,
            },
        };

        debug!(
            "Synthesizing {} chars with voice {}",
            text.len(),
            voice.voice_name
        );

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::request(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::service_status(SERVICE, status, body));
        }

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::malformed(SERVICE, e.to_string()))?;

        let audio = BASE64.decode(parsed.audio_content.as_bytes())?;
        if audio.is_empty() {
            return Err(SpeechError::malformed(SERVICE, "empty audio content"));
        }

        tokio::fs::write(output, &audio).await?;
        info!(
            "Synthesized audio written: {} ({} bytes)",
            output.display(),
            audio.len()
        );
        Ok(())
    }
}
