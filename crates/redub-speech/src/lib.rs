//! Clients for the three cloud calls in the redub pipeline:
//! speech recognition, transcript correction, and speech synthesis.
//!
//! Each client holds a `reqwest::Client` with an explicit request
//! timeout and is constructed from a shared [`ServiceConfig`] built
//! once at startup — no process-global credential state.

pub mod config;
pub mod correct;
pub mod error;
pub mod synthesize;
pub mod transcribe;

pub use config::ServiceConfig;
pub use correct::CorrectorClient;
pub use error::{SpeechError, SpeechResult};
pub use synthesize::SynthesizerClient;
pub use transcribe::RecognizerClient;
