//! Video audio-correction CLI.
//!
//! Runs one pipeline pass: extract audio, transcribe, correct,
//! synthesize, and remux onto the original video.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use redub_pipeline::{Pipeline, PipelineConfig};
use redub_speech::ServiceConfig;

#[derive(Debug, Parser)]
#[command(name = "redub", about = "Correct a video's speech and re-dub it")]
struct Args {
    /// Input video file (mp4, avi, mov)
    input: PathBuf,

    /// Directory for the final video
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Language code for recognition and synthesis (e.g. en-US)
    #[arg(long)]
    language: Option<String>,

    /// Synthesis voice name (e.g. en-US-Wavenet-A)
    #[arg(long)]
    voice: Option<String>,

    /// Keep the run workspace for inspection
    #[arg(long)]
    keep_workdir: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();

    let services = ServiceConfig::from_env().context("loading service configuration")?;

    let mut config = PipelineConfig::from_env();
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(language) = args.language {
        config.voice.language_code = language;
    }
    if let Some(name) = args.voice {
        config.voice.voice_name = name;
    }
    config.keep_workdir = config.keep_workdir || args.keep_workdir;

    info!("Starting redub");

    let pipeline =
        Pipeline::new(config, &services).context("constructing pipeline")?;
    let report = pipeline.run(&args.input).await;

    if let Some(raw) = &report.raw_transcript {
        println!("Raw transcript:\n{raw}\n");
    }
    if let Some(corrected) = &report.corrected_transcript {
        println!("Corrected transcript:\n{corrected}\n");
    }

    if report.is_success() {
        let output = report
            .output_path
            .as_ref()
            .expect("merged run has an output path");
        println!("Final video: {}", output.display());
        Ok(())
    } else {
        let stage = report
            .failed_stage()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "setup".to_string());
        let message = report
            .error_message
            .unwrap_or_else(|| "unknown error".to_string());
        anyhow::bail!("run failed at {stage}: {message}")
    }
}

/// Initialize tracing with colored output for dev, JSON for production.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("redub=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
