//! Pipeline error types.

use thiserror::Error;

use redub_media::MediaError;
use redub_models::Stage;
use redub_speech::SpeechError;

/// What went wrong inside a stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("recognition returned an empty transcript")]
    EmptyTranscript,

    #[error("correction returned an empty transcript")]
    EmptyCorrection,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stage-attributed pipeline failure.
///
/// The orchestrator halts at the first failed stage; later stages
/// never run and no artifact from a failed stage is consumed.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
