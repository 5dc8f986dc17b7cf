//! Error types for the speech service clients.

use thiserror::Error;

pub type SpeechResult<T> = Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} service returned {status}: {body}")]
    ServiceStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed {service} response: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },

    #[error("Transcript too long for correction: {chars} chars (max {max})")]
    TranscriptTooLong { chars: usize, max: usize },

    #[error("Refusing to call {0} with empty input")]
    EmptyInput(&'static str),

    #[error("Audio decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpeechError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn request(service: &'static str, source: reqwest::Error) -> Self {
        Self::Request { service, source }
    }

    pub fn service_status(service: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::ServiceStatus {
            service,
            status,
            body: body.into(),
        }
    }

    pub fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            detail: detail.into(),
        }
    }
}
