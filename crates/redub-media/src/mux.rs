//! Remuxing: replace a video's audio track with a new one.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Explicit result of a mux operation.
#[derive(Debug, Clone)]
pub struct MuxOutcome {
    /// Path of the written video
    pub output: PathBuf,
    /// Size of the written video in bytes
    pub output_bytes: u64,
    /// FFmpeg exit code
    pub exit_code: i32,
    /// Captured FFmpeg stderr
    pub stderr: String,
}

/// Mux `audio` onto `video`, writing to `output`.
///
/// The video codec is copied unchanged; video comes from the first
/// input, audio from the second, and the result is trimmed to the
/// shorter of the two streams. Success requires both a zero exit status
/// and a non-empty output file.
pub async fn mux_audio(
    video: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    timeout_secs: Option<u64>,
) -> MediaResult<MuxOutcome> {
    let video = video.as_ref();
    let audio = audio.as_ref();
    let output = output.as_ref();

    info!(
        "Muxing: video {} + audio {} -> {}",
        video.display(),
        audio.display(),
        output.display()
    );

    let cmd = FfmpegCommand::new(output)
        .input(video)
        .input(audio)
        .copy_video_codec()
        .map("0:v:0")
        .map("1:a:0")
        .shortest();

    let mut runner = FfmpegRunner::new();
    if let Some(secs) = timeout_secs {
        runner = runner.with_timeout(secs);
    }
    let outcome = runner.run(&cmd).await?;

    let output_bytes = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
    if output_bytes == 0 {
        return Err(MediaError::OutputMissing(output.to_path_buf()));
    }

    info!("Mux complete: {} ({} bytes)", output.display(), output_bytes);
    Ok(MuxOutcome {
        output: output.to_path_buf(),
        output_bytes,
        exit_code: outcome.exit_code,
        stderr: outcome.stderr,
    })
}
