//! Audio-correction pipeline orchestrator.
//!
//! This crate provides:
//! - The five-stage sequence: extract, transcribe, correct, synthesize, mux
//! - Stage-attributed failure reporting (no bad artifact flows downstream)
//! - Per-run scoped workspaces with cleanup on every exit path
//! - Structured per-run logging

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod workspace;

pub use config::PipelineConfig;
pub use error::{PipelineError, StageError};
pub use logging::RunLogger;
pub use pipeline::Pipeline;
pub use workspace::RunWorkspace;
