//! The five-stage pipeline.
//!
//! `extract → transcribe → correct → synthesize → mux`, strictly
//! forward, one run at a time. Each stage's output exists on disk (or
//! in the report) before the next stage starts; the first failure halts
//! the run with a stage-attributed error and later stages never run.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use redub_media::{extract_audio, mux_audio, persist_file, MediaError};
use redub_models::{
    AudioEncoding, RunId, RunReport, RunState, Stage, StageReport, VideoContainer,
};
use redub_speech::{
    CorrectorClient, RecognizerClient, ServiceConfig, SpeechResult, SynthesizerClient,
};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, StageError};
use crate::logging::RunLogger;
use crate::workspace::RunWorkspace;

/// One-shot audio-correction pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    recognizer: RecognizerClient,
    corrector: CorrectorClient,
    synthesizer: SynthesizerClient,
}

impl Pipeline {
    /// Build the pipeline, constructing each service client from the
    /// shared service config.
    pub fn new(config: PipelineConfig, services: &ServiceConfig) -> SpeechResult<Self> {
        let recognizer = RecognizerClient::new(services)?;
        let corrector =
            CorrectorClient::new(services, config.max_tokens, config.max_transcript_chars)?;
        let synthesizer = SynthesizerClient::new(services)?;
        Ok(Self {
            config,
            recognizer,
            corrector,
            synthesizer,
        })
    }

    /// Process `input` end to end and report the outcome.
    ///
    /// Never panics on stage failure: the returned report carries the
    /// terminal state, the per-stage records, both transcripts when they
    /// were produced, and the final video path on success.
    pub async fn run(&self, input: &Path) -> RunReport {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id);
        let mut report = RunReport::new(run_id.clone());

        info!(run_id = %run_id, input = %input.display(), "Starting run");

        match self.execute(input, &run_id, &mut report, &logger).await {
            Ok(output) => {
                report.state = RunState::Merged;
                report.output_path = Some(output);
            }
            Err(e) => {
                report.state = RunState::Failed;
                report.error_message = Some(e.to_string());
            }
        }
        report.finished_at = Some(Utc::now());
        logger.run_finished(report.is_success());
        report
    }

    async fn execute(
        &self,
        input: &Path,
        run_id: &RunId,
        report: &mut RunReport,
        logger: &RunLogger,
    ) -> Result<PathBuf, PipelineError> {
        let container = VideoContainer::from_path(input).ok_or_else(|| {
            PipelineError::new(
                Stage::Extract,
                MediaError::UnsupportedFormat(input.display().to_string()),
            )
        })?;

        let workspace = RunWorkspace::create(
            &self.config.work_dir,
            run_id,
            self.config.keep_workdir,
        )
        .map_err(|e| PipelineError::new(Stage::Extract, e))?;

        let ffmpeg_timeout = Some(self.config.ffmpeg_timeout_secs);

        // Stage 1: extract the audio track; probe its real parameters.
        let extracted_path = workspace.extracted_audio();
        let audio = self
            .stage(Stage::Extract, report, logger, async {
                Ok(extract_audio(input, &extracted_path, ffmpeg_timeout).await?)
            })
            .await?;

        self.process_audio(input, container, &workspace, audio, run_id, report, logger)
            .await
    }

    /// Stages 2 through 5, starting from an extracted audio artifact.
    #[allow(clippy::too_many_arguments)]
    async fn process_audio(
        &self,
        input: &Path,
        container: VideoContainer,
        workspace: &RunWorkspace,
        audio: redub_media::AudioStream,
        run_id: &RunId,
        report: &mut RunReport,
        logger: &RunLogger,
    ) -> Result<PathBuf, PipelineError> {
        let ffmpeg_timeout = Some(self.config.ffmpeg_timeout_secs);
        let extracted_path = workspace.extracted_audio();

        // Stage 2: transcribe, declaring the probed sample rate.
        let raw_transcript = self
            .stage(Stage::Transcribe, report, logger, async {
                let bytes = tokio::fs::read(&extracted_path).await?;
                let transcript = self
                    .recognizer
                    .recognize(
                        &bytes,
                        AudioEncoding::Mp3,
                        audio.sample_rate,
                        &self.config.voice.language_code,
                    )
                    .await?;
                require_transcript(transcript)
            })
            .await?;
        report.raw_transcript = Some(raw_transcript.clone());

        // Stage 3: correct the transcript; empty output halts the run.
        let corrected = self
            .stage(Stage::Correct, report, logger, async {
                let corrected = self.corrector.correct(&raw_transcript).await?;
                require_correction(corrected)
            })
            .await?;
        report.corrected_transcript = Some(corrected.clone());

        // Stage 4: synthesize corrected speech. Never called with empty
        // text; stage 3 guarantees it.
        let synthesized_path = workspace.synthesized_audio();
        self.stage(Stage::Synthesize, report, logger, async {
            self.synthesizer
                .synthesize(&corrected, &self.config.voice, &synthesized_path)
                .await?;
            Ok(())
        })
        .await?;

        // Stage 5: remux onto the original video, then persist the
        // result outside the workspace before it is cleaned up.
        let merged_path = workspace.merged_video(container);
        let final_path = self
            .config
            .output_dir
            .join(format!("{}-final.{}", run_id, container.extension()));
        self.stage(Stage::Mux, report, logger, async {
            let outcome = mux_audio(input, &synthesized_path, &merged_path, ffmpeg_timeout).await?;
            info!(
                run_id = %run_id,
                exit_code = outcome.exit_code,
                bytes = outcome.output_bytes,
                "Mux confirmed"
            );
            persist_file(&merged_path, &final_path).await?;
            Ok(())
        })
        .await?;

        Ok(final_path)
    }

    /// Run one stage, recording its outcome and advancing the run state.
    async fn stage<T, F>(
        &self,
        stage: Stage,
        report: &mut RunReport,
        logger: &RunLogger,
        fut: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, StageError>>,
    {
        let started_at = Utc::now();
        logger.stage_started(stage);
        match fut.await {
            Ok(value) => {
                report.stages.push(StageReport::completed(stage, started_at));
                report.state = stage.completed_state();
                logger.stage_completed(stage);
                Ok(value)
            }
            Err(source) => {
                report
                    .stages
                    .push(StageReport::failed(stage, started_at, source.to_string()));
                logger.stage_failed(stage, &source);
                Err(PipelineError { stage, source })
            }
        }
    }
}

/// An empty transcript is a distinct, reportable failure; it must never
/// reach the correction stage.
fn require_transcript(transcript: String) -> Result<String, StageError> {
    if transcript.trim().is_empty() {
        Err(StageError::EmptyTranscript)
    } else {
        Ok(transcript)
    }
}

/// An empty corrected transcript must never reach synthesis.
fn require_correction(corrected: String) -> Result<String, StageError> {
    if corrected.trim().is_empty() {
        Err(StageError::EmptyCorrection)
    } else {
        Ok(corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redub_media::AudioStream;
    use redub_models::StageStatus;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_services(base_url: &str) -> ServiceConfig {
        ServiceConfig {
            recognize_url: format!("{base_url}/v1/speech:recognize"),
            speech_api_key: "k".to_string(),
            correct_url: format!("{base_url}/openai/chat/completions"),
            correct_api_key: "k".to_string(),
            synthesize_url: format!("{base_url}/v1/text:synthesize"),
            request_timeout: Duration::from_secs(5),
        }
    }

    fn test_pipeline(work_root: &Path, base_url: &str) -> Pipeline {
        let config = PipelineConfig {
            work_dir: work_root.to_path_buf(),
            output_dir: work_root.to_path_buf(),
            ..PipelineConfig::default()
        };
        Pipeline::new(config, &test_services(base_url)).unwrap()
    }

    /// Set up a run as if extraction had already completed: a stub
    /// extracted file in the workspace and a completed extract stage in
    /// the report.
    fn extracted_run(root: &Path) -> (RunWorkspace, RunId, RunReport, RunLogger, AudioStream) {
        let run_id = RunId::new();
        let workspace = RunWorkspace::create(root, &run_id, false).unwrap();
        std::fs::write(workspace.extracted_audio(), b"stub-mp3").unwrap();

        let mut report = RunReport::new(run_id.clone());
        report
            .stages
            .push(StageReport::completed(Stage::Extract, Utc::now()));
        report.state = RunState::AudioExtracted;

        let logger = RunLogger::new(&run_id);
        let audio = AudioStream {
            codec: "mp3".to_string(),
            sample_rate: 44100,
            channels: 1,
        };
        (workspace, run_id, report, logger, audio)
    }

    #[test]
    fn test_transcript_guards() {
        assert!(matches!(
            require_transcript("  ".to_string()),
            Err(StageError::EmptyTranscript)
        ));
        assert_eq!(require_transcript("hi".to_string()).unwrap(), "hi");
        assert!(matches!(
            require_correction(String::new()),
            Err(StageError::EmptyCorrection)
        ));
    }

    #[tokio::test]
    async fn test_unsupported_container_fails_before_any_stage() {
        let root = TempDir::new().unwrap();
        let pipeline = test_pipeline(root.path(), "http://127.0.0.1:9");

        let report = pipeline.run(Path::new("notes.txt")).await;

        assert_eq!(report.state, RunState::Failed);
        assert!(report.stages.is_empty());
        assert!(report
            .error_message
            .as_deref()
            .unwrap()
            .contains("Unsupported container"));
    }

    #[tokio::test]
    async fn test_missing_input_fails_at_extract() {
        let root = TempDir::new().unwrap();
        let pipeline = test_pipeline(root.path(), "http://127.0.0.1:9");

        let report = pipeline.run(&root.path().join("missing.mp4")).await;

        assert_eq!(report.state, RunState::Failed);
        assert_eq!(report.failed_stage(), Some(Stage::Extract));
        assert_eq!(report.stages.len(), 1, "later stages must not run");
        assert_eq!(report.stages[0].status, StageStatus::Failed);
        assert!(report.raw_transcript.is_none());
        assert!(report.output_path.is_none());
    }

    #[tokio::test]
    async fn test_failed_run_cleans_workspace() {
        let root = TempDir::new().unwrap();
        let pipeline = test_pipeline(root.path(), "http://127.0.0.1:9");

        let report = pipeline.run(&root.path().join("missing.mp4")).await;
        assert_eq!(report.state, RunState::Failed);

        let leftover: Vec<_> = std::fs::read_dir(root.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("run-"))
            .collect();
        assert!(leftover.is_empty(), "run workspace should be removed");
    }

    #[tokio::test]
    async fn test_zero_recognition_results_fail_at_transcribe() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/speech:recognize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        // The correction endpoint must never be hit after an empty
        // transcript.
        Mock::given(method("POST"))
            .and(path("/openai/chat/completions"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let root = TempDir::new().unwrap();
        let pipeline = test_pipeline(root.path(), &server.uri());
        let (workspace, run_id, mut report, logger, audio) = extracted_run(root.path());

        let err = pipeline
            .process_audio(
                Path::new("in.mp4"),
                VideoContainer::Mp4,
                &workspace,
                audio,
                &run_id,
                &mut report,
                &logger,
            )
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Transcribe);
        assert!(matches!(err.source, StageError::EmptyTranscript));
        assert_eq!(report.failed_stage(), Some(Stage::Transcribe));
        assert_eq!(report.stages.len(), 2, "later stages must not run");
        assert!(report.raw_transcript.is_none());
        assert!(report.corrected_transcript.is_none());
    }

    #[tokio::test]
    async fn test_correction_error_halts_before_synthesis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/speech:recognize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"alternatives": [{"transcript": "hello world"}]}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/openai/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        // Synthesis must never be invoked after a failed correction.
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let root = TempDir::new().unwrap();
        let pipeline = test_pipeline(root.path(), &server.uri());
        let (workspace, run_id, mut report, logger, audio) = extracted_run(root.path());

        let err = pipeline
            .process_audio(
                Path::new("in.mp4"),
                VideoContainer::Mp4,
                &workspace,
                audio,
                &run_id,
                &mut report,
                &logger,
            )
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Correct);
        assert_eq!(report.failed_stage(), Some(Stage::Correct));
        assert_eq!(report.stages.len(), 3);
        assert_eq!(report.raw_transcript.as_deref(), Some("hello world"));
        assert!(report.corrected_transcript.is_none());
    }
}
