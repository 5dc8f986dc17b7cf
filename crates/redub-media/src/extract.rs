//! Audio extraction from a video container.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_media, AudioStream};

/// Extract the audio track of `input` into an MP3 file at `output`.
///
/// Probes the container first: an unreadable container or a missing
/// audio stream is a terminal error. After extraction the written file
/// is probed and its actual stream parameters (sample rate, channels)
/// are returned, so the transcription stage declares what the audio
/// really is rather than assuming a fixed rate.
pub async fn extract_audio(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    timeout_secs: Option<u64>,
) -> MediaResult<AudioStream> {
    let input = input.as_ref();
    let output = output.as_ref();

    let info = probe_media(input, timeout_secs).await?;
    let audio = info
        .audio
        .ok_or_else(|| MediaError::NoAudioStream(input.to_path_buf()))?;

    info!(
        "Extracting audio: {} -> {} ({} Hz, {} ch)",
        input.display(),
        output.display(),
        audio.sample_rate,
        audio.channels
    );

    let cmd = FfmpegCommand::new(output)
        .input(input)
        .no_video()
        .audio_codec("libmp3lame")
        .audio_quality(2);

    let mut runner = FfmpegRunner::new();
    if let Some(secs) = timeout_secs {
        runner = runner.with_timeout(secs);
    }
    runner.run(&cmd).await?;

    // Exit 0 with a missing or empty file is still a failure.
    let written = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        return Err(MediaError::OutputMissing(output.to_path_buf()));
    }

    // The encoder may resample; report the output file's real parameters.
    let extracted = probe_media(output, timeout_secs).await?.audio.unwrap_or(audio);

    info!(
        "Audio extracted: {} ({} bytes, {} Hz)",
        output.display(),
        written,
        extracted.sample_rate
    );
    Ok(extracted)
}
