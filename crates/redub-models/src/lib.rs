//! Shared data models for the redub pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Run identifiers and the pipeline state machine
//! - Per-stage and per-run reports
//! - Audio encodings and the input container allow-list
//! - Voice selection for speech synthesis

pub mod encoding;
pub mod run;
pub mod voice;

// Re-export common types
pub use encoding::{AudioEncoding, VideoContainer};
pub use run::{RunId, RunReport, RunState, Stage, StageReport, StageStatus};
pub use voice::VoiceSelection;
