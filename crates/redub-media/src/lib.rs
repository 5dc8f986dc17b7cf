//! FFmpeg CLI wrapper for the redub pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building (discrete argument vectors, no shell)
//! - A runner with timeout-and-kill and captured stderr
//! - Stream probing via FFprobe (duration, audio sample rate, channels)
//! - Audio extraction and audio/video remuxing

pub mod command;
pub mod error;
pub mod extract;
pub mod fs_utils;
pub mod mux;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegOutcome, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use extract::extract_audio;
pub use fs_utils::persist_file;
pub use mux::{mux_audio, MuxOutcome};
pub use probe::{probe_media, AudioStream, MediaInfo, VideoStream};
