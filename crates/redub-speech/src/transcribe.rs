//! Speech recognition client.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use redub_models::AudioEncoding;

use crate::config::ServiceConfig;
use crate::error::{SpeechError, SpeechResult};

const SERVICE: &str = "recognition";

/// Client for the speech recognition endpoint.
pub struct RecognizerClient {
    client: Client,
    url: String,
    api_key: String,
}

/// Recognition request body.
#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: AudioEncoding,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    /// Base64-encoded audio bytes
    content: String,
}

/// Recognition response body.
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    /// Absent entirely when nothing was recognized (e.g. silence)
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    transcript: String,
}

impl RecognizerClient {
    /// Create a new recognizer client.
    pub fn new(config: &ServiceConfig) -> SpeechResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            url: config.recognize_url.clone(),
            api_key: config.speech_api_key.clone(),
        })
    }

    /// Transcribe `audio`, declaring its encoding, sample rate, and language.
    ///
    /// The declared parameters must match the actual audio; the service
    /// does not validate them and recognition quality degrades silently
    /// on a mismatch. Returns the top alternative of each result,
    /// space-joined in recognition order; an empty string means the
    /// service recognized nothing (the caller decides how to report it).
    pub async fn recognize(
        &self,
        audio: &[u8],
        encoding: AudioEncoding,
        sample_rate_hertz: u32,
        language_code: &str,
    ) -> SpeechResult<String> {
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding,
                sample_rate_hertz,
                language_code,
            },
            audio: RecognitionAudio {
                content: BASE64.encode(audio),
            },
        };

        debug!(
            "Recognizing {} bytes ({}, {} Hz, {})",
            audio.len(),
            encoding,
            sample_rate_hertz,
            language_code
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

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::malformed(SERVICE, e.to_string()))?;

        let transcript = parsed
            .results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        info!(
            "Recognition returned {} result(s), {} chars",
            parsed.results.len(),
            transcript.len()
        );
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::mock_config;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_joins_top_alternatives_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/speech:recognize"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"alternatives": [
                        {"transcript": "hello"},
                        {"transcript": "yellow"}
                    ]},
                    {"alternatives": [{"transcript": "world"}]}
                ]
            })))
            .mount(&server)
            .await;

        let client = RecognizerClient::new(&mock_config(&server.uri())).unwrap();
        let transcript = client
            .recognize(b"fake-mp3", AudioEncoding::Mp3, 44100, "en-US")
            .await
            .unwrap();

        assert_eq!(transcript, "hello world");
    }

    #[tokio::test]
    async fn test_silence_yields_empty_transcript() {
        let server = MockServer::start().await;
        // The service omits `results` entirely for unrecognizable audio.
        Mock::given(method("POST"))
            .and(path("/v1/speech:recognize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = RecognizerClient::new(&mock_config(&server.uri())).unwrap();
        let transcript = client
            .recognize(b"silence", AudioEncoding::Mp3, 44100, "en-US")
            .await
            .unwrap();

        assert_eq!(transcript, "");
    }

    #[tokio::test]
    async fn test_declares_probed_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/speech:recognize"))
            .and(body_partial_json(json!({
                "config": {
                    "encoding": "MP3",
                    "sampleRateHertz": 48000,
                    "languageCode": "en-GB"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RecognizerClient::new(&mock_config(&server.uri())).unwrap();
        client
            .recognize(b"audio", AudioEncoding::Mp3, 48000, "en-GB")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_service_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("key expired"))
            .mount(&server)
            .await;

        let client = RecognizerClient::new(&mock_config(&server.uri())).unwrap();
        let err = client
            .recognize(b"audio", AudioEncoding::Mp3, 44100, "en-US")
            .await
            .unwrap_err();

        match err {
            SpeechError::ServiceStatus {
                service,
                status,
                body,
            } => {
                assert_eq!(service, "recognition");
                assert_eq!(status, 403);
                assert_eq!(body, "key expired");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
