//! Structured per-run logging.
//!
//! Every stage reports its own progress and outcome, with the run ID
//! attached as structured context.

use tracing::{error, info};

use redub_models::{RunId, Stage};

/// Run logger with consistent formatting.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
}

impl RunLogger {
    /// Create a logger for one pipeline run.
    pub fn new(run_id: &RunId) -> Self {
        Self {
            run_id: run_id.to_string(),
        }
    }

    /// Log the start of a stage.
    pub fn stage_started(&self, stage: Stage) {
        info!(
            run_id = %self.run_id,
            stage = %stage,
            "Stage started"
        );
    }

    /// Log a completed stage.
    pub fn stage_completed(&self, stage: Stage) {
        info!(
            run_id = %self.run_id,
            stage = %stage,
            "Stage completed"
        );
    }

    /// Log a failed stage with its underlying error.
    pub fn stage_failed(&self, stage: Stage, err: &dyn std::fmt::Display) {
        error!(
            run_id = %self.run_id,
            stage = %stage,
            "Stage failed: {}", err
        );
    }

    /// Log the run outcome.
    pub fn run_finished(&self, success: bool) {
        if success {
            info!(run_id = %self.run_id, "Run completed");
        } else {
            error!(run_id = %self.run_id, "Run failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_holds_run_id() {
        let run_id = RunId::from_string("r-1");
        let logger = RunLogger::new(&run_id);
        assert_eq!(logger.run_id, "r-1");
    }
}
