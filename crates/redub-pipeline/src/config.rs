//! Pipeline configuration.

use std::path::PathBuf;

use redub_models::VoiceSelection;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root under which per-run workspaces are created
    pub work_dir: PathBuf,
    /// Directory receiving final videos
    pub output_dir: PathBuf,
    /// Language and voice for recognition and synthesis
    pub voice: VoiceSelection,
    /// Output token budget for the correction call
    pub max_tokens: u32,
    /// Hard bound on transcript length fed to correction
    pub max_transcript_chars: usize,
    /// Timeout for each ffmpeg/ffprobe invocation
    pub ffmpeg_timeout_secs: u64,
    /// Keep the run workspace instead of deleting it (debugging)
    pub keep_workdir: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("redub"),
            output_dir: PathBuf::from("."),
            voice: VoiceSelection::default(),
            max_tokens: 500,
            max_transcript_chars: 6000,
            ffmpeg_timeout_secs: 600,
            keep_workdir: false,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("REDUB_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            output_dir: std::env::var("REDUB_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            voice: VoiceSelection::new(
                std::env::var("REDUB_LANGUAGE").unwrap_or(defaults.voice.language_code),
                std::env::var("REDUB_VOICE").unwrap_or(defaults.voice.voice_name),
            ),
            max_tokens: std::env::var("REDUB_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            max_transcript_chars: std::env::var("REDUB_MAX_TRANSCRIPT_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_transcript_chars),
            ffmpeg_timeout_secs: std::env::var("REDUB_FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ffmpeg_timeout_secs),
            keep_workdir: std::env::var("REDUB_KEEP_WORKDIR")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
