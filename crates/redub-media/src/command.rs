//! FFmpeg command builder and runner.
//!
//! Every invocation is a discrete argument vector handed straight to the
//! process; paths are never interpolated into a shell string.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg commands.
///
/// Supports multiple inputs (the mux stage feeds ffmpeg a video and an
/// audio file); the output path always comes last.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file paths, in `-i` order
    inputs: Vec<PathBuf>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
    /// Whether to overwrite the output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Append an input file.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Drop the video stream (`-vn`).
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Set the audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-acodec").output_arg(codec)
    }

    /// Set VBR audio quality (`-q:a`).
    pub fn audio_quality(self, q: u8) -> Self {
        self.output_arg("-q:a").output_arg(q.to_string())
    }

    /// Copy the video codec unchanged (`-c:v copy`).
    pub fn copy_video_codec(self) -> Self {
        self.output_arg("-c:v").output_arg("copy")
    }

    /// Add a stream mapping (e.g. `0:v:0`).
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Trim the output to the shortest input stream.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Set the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.to_string_lossy().to_string());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Explicit result of a finished FFmpeg invocation.
#[derive(Debug, Clone)]
pub struct FfmpegOutcome {
    /// Exit code of the process (0 on success)
    pub exit_code: i32,
    /// Captured stderr output
    pub stderr: String,
}

/// Runner for FFmpeg commands with timeout enforcement.
#[derive(Debug, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds; the child is killed when it elapses
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Set a timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    ///
    /// Returns the exit code and captured stderr on success; a non-zero
    /// exit becomes an `FfmpegFailed` error carrying both.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<FfmpegOutcome> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child.stderr.take().expect("stderr not captured");
        let mut reader = BufReader::new(stderr).lines();

        let stderr_handle = tokio::spawn(async move {
            let mut lines = Vec::new();
            while let Ok(Some(line)) = reader.next_line().await {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    debug!("ffmpeg stderr: {}", trimmed);
                    lines.push(trimmed);
                }
            }
            lines.join("\n")
        });

        let status = wait_with_timeout(&mut child, self.timeout_secs).await?;
        let stderr_text = stderr_handle.await.unwrap_or_default();

        if status.success() {
            Ok(FfmpegOutcome {
                exit_code: status.code().unwrap_or(0),
                stderr: stderr_text,
            })
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(stderr_text),
                status.code(),
            ))
        }
    }

}

/// Wait for a child process with an optional timeout, killing it on expiry.
///
/// Shared by the FFmpeg runner and the FFprobe probe so every
/// subprocess in the pipeline is covered by the same kill-on-expiry
/// policy.
pub(crate) async fn wait_with_timeout(
    child: &mut Child,
    timeout_secs: Option<u64>,
) -> MediaResult<std::process::ExitStatus> {
    if let Some(timeout_secs) = timeout_secs {
        let timeout = tokio::time::timeout(
            std::time::Duration::from_secs(timeout_secs),
            child.wait(),
        );
        match timeout.await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(
                    "Subprocess timed out after {} seconds, killing process",
                    timeout_secs
                );
                let _ = child.kill().await;
                Err(MediaError::Timeout(timeout_secs))
            }
        }
    } else {
        Ok(child.wait().await?)
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_args() {
        let cmd = FfmpegCommand::new("out.mp3")
            .input("in.mp4")
            .no_video()
            .audio_codec("libmp3lame")
            .audio_quality(2);

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"-vn".to_string()));
        assert!(args.contains(&"libmp3lame".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp3");
    }

    #[test]
    fn test_multi_input_order() {
        let cmd = FfmpegCommand::new("final.mp4")
            .input("video.mp4")
            .input("audio.mp3")
            .copy_video_codec()
            .map("0:v:0")
            .map("1:a:0")
            .shortest();

        let args = cmd.build_args();
        let first_i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[first_i + 1], "video.mp4");
        assert_eq!(args[first_i + 2], "-i");
        assert_eq!(args[first_i + 3], "audio.mp3");
        assert!(args.contains(&"-shortest".to_string()));
    }

    #[tokio::test]
    async fn test_wait_with_timeout_kills_hung_child() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .spawn()
            .unwrap();

        let err = wait_with_timeout(&mut child, Some(1)).await.unwrap_err();
        assert!(matches!(err, MediaError::Timeout(1)));
    }

    #[test]
    fn test_paths_stay_discrete_arguments() {
        // Shell metacharacters must pass through as a single argument,
        // never interpreted.
        let cmd = FfmpegCommand::new("out; rm -rf x.mp4").input("in $(whoami).mp4");
        let args = cmd.build_args();
        assert!(args.contains(&"in $(whoami).mp4".to_string()));
        assert_eq!(args.last().unwrap(), "out; rm -rf x.mp4");
    }
}
