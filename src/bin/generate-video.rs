//! Generate a video clip from a text prompt.
//!
//! Submits a long-running job, polls it on a fixed interval until the
//! completion flag is set, then downloads the result file.
//!
//! Usage:
//!   export GEMINI_API_KEY=...
//!   generate-video "a golden retriever in a field of sunflowers" \
//!       --negative-prompt "barking" --out sample.mp4

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use vega_genai::{Client, VideoRequest};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a video clip from a text prompt")]
struct Args {
    /// Text prompt describing the clip
    prompt: String,

    /// What the clip should avoid
    #[arg(long)]
    negative_prompt: Option<String>,

    /// Video model id
    #[arg(long, default_value = "veo-3.0-generate-preview")]
    model: String,

    /// Output file
    #[arg(short, long, default_value = "video.mp4")]
    out: PathBuf,

    /// Seconds between status checks
    #[arg(long, default_value_t = 20)]
    poll_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;

    let client = Client::new(api_key);
    let mut request = VideoRequest::new(&args.prompt);
    if let Some(negative) = &args.negative_prompt {
        request = request.with_negative_prompt(negative);
    }

    info!(model = %args.model, "submitting video job");
    let operation = client.generate_videos(&args.model, &request).await?;
    info!(name = %operation.name, "job submitted");

    let video = client
        .poll_operation(operation, Duration::from_secs(args.poll_secs))
        .await?;
    info!(uri = %video.uri, "downloading result");
    let bytes = client.download_file(&video.uri).await?;

    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("Saved: {}", args.out.display());
    Ok(())
}
