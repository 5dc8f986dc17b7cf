//! Run identifiers, the pipeline state machine, and run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a pipeline run.
///
/// Every intermediate and final artifact name embeds this ID so that
/// concurrent runs can never collide on fixed filenames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Audio extraction from the source video
    Extract,
    /// Speech recognition of the extracted audio
    Transcribe,
    /// Transcript correction via the language model
    Correct,
    /// Speech synthesis from the corrected transcript
    Synthesize,
    /// Remux of the synthesized audio onto the source video
    Mux,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Transcribe => "transcribe",
            Stage::Correct => "correct",
            Stage::Synthesize => "synthesize",
            Stage::Mux => "mux",
        }
    }

    /// Stages in execution order.
    pub fn all() -> [Stage; 5] {
        [
            Stage::Extract,
            Stage::Transcribe,
            Stage::Correct,
            Stage::Synthesize,
            Stage::Mux,
        ]
    }

    /// The run state reached when this stage completes.
    pub fn completed_state(&self) -> RunState {
        match self {
            Stage::Extract => RunState::AudioExtracted,
            Stage::Transcribe => RunState::Transcribed,
            Stage::Correct => RunState::Corrected,
            Stage::Synthesize => RunState::Synthesized,
            Stage::Mux => RunState::Merged,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pipeline run state.
///
/// Control flows strictly forward; any stage failure transitions
/// directly to `Failed` with no rollback and no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Input accepted, nothing processed yet
    #[default]
    Uploaded,
    /// Audio track extracted from the video
    AudioExtracted,
    /// Raw transcript produced
    Transcribed,
    /// Corrected transcript produced
    Corrected,
    /// Corrected audio synthesized
    Synthesized,
    /// Final video written (terminal success)
    Merged,
    /// A stage failed (terminal)
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Uploaded => "uploaded",
            RunState::AudioExtracted => "audio_extracted",
            RunState::Transcribed => "transcribed",
            RunState::Corrected => "corrected",
            RunState::Synthesized => "synthesized",
            RunState::Merged => "merged",
            RunState::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no further stages run).
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Merged | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Failed,
}

/// Record of one executed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Error text when the stage failed
    pub error: Option<String>,
}

impl StageReport {
    pub fn completed(stage: Stage, started_at: DateTime<Utc>) -> Self {
        Self {
            stage,
            status: StageStatus::Completed,
            started_at,
            finished_at: Utc::now(),
            error: None,
        }
    }

    pub fn failed(stage: Stage, started_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Failed,
            started_at,
            finished_at: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// Full record of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub state: RunState,
    /// Stages in execution order; stages after a failure are absent
    pub stages: Vec<StageReport>,
    pub raw_transcript: Option<String>,
    pub corrected_transcript: Option<String>,
    /// Final video path, present only when state is `Merged`
    pub output_path: Option<PathBuf>,
    /// Stage-attributed error message when state is `Failed`
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    /// Create a report for a run that has just started.
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            state: RunState::Uploaded,
            stages: Vec::new(),
            raw_transcript: None,
            corrected_transcript: None,
            output_path: None,
            error_message: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// The stage that failed, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::Failed)
            .map(|s| s.stage)
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::Merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn test_stage_order_maps_to_states() {
        let states: Vec<RunState> = Stage::all().iter().map(|s| s.completed_state()).collect();
        assert_eq!(
            states,
            vec![
                RunState::AudioExtracted,
                RunState::Transcribed,
                RunState::Corrected,
                RunState::Synthesized,
                RunState::Merged,
            ]
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Merged.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Synthesized.is_terminal());
        assert!(!RunState::Uploaded.is_terminal());
    }

    #[test]
    fn test_failed_stage_lookup() {
        let mut report = RunReport::new(RunId::new());
        let t = Utc::now();
        report.stages.push(StageReport::completed(Stage::Extract, t));
        report
            .stages
            .push(StageReport::failed(Stage::Transcribe, t, "empty transcript"));
        report.state = RunState::Failed;

        assert_eq!(report.failed_stage(), Some(Stage::Transcribe));
        assert!(!report.is_success());
    }

    #[test]
    fn test_state_serde_snake_case() {
        let json = serde_json::to_string(&RunState::AudioExtracted).unwrap();
        assert_eq!(json, "\"audio_extracted\"");
    }
}
