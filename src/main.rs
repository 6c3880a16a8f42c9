//! Vega — narration-to-audio synthesis.
//!
//! Reads a narration document (structured JSON segments or plain text, one
//! line per entry), assigns a prebuilt voice to every `Name:`-attributed
//! speaker, streams the whole narration through the remote speech model, and
//! writes one playable audio file.
//!
//! Usage:
//!   export GEMINI_API_KEY=...
//!   vega --input outputs/run1/narration.json --out outputs/run1/narration.wav

mod audio;
mod error;
mod narration;
mod output;
mod pipeline;
mod voices;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use pipeline::TtsJob;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate narration audio via the streaming speech model")]
struct Args {
    /// Path to narration.json or narration.txt
    #[arg(short, long)]
    input: PathBuf,

    /// Output audio file (default: <input_dir>/narration.wav)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Speech model id
    #[arg(long, default_value = "gemini-2.5-pro-preview-tts")]
    model: String,

    /// Comma-separated prebuilt voices assigned per speaker
    /// (e.g. Zephyr,Puck,Oriole)
    #[arg(long)]
    voices: Option<String>,

    /// Sampling temperature
    #[arg(long, default_value_t = 1.0)]
    temperature: f32,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vega=info")),
        )
        .init();

    let args = Args::parse();
    let job = TtsJob {
        input: args.input,
        output: args.out,
        model: args.model,
        voices: args.voices,
        temperature: args.temperature,
        api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
        base_url: std::env::var("GEMINI_BASE_URL").ok(),
    };

    match pipeline::run(&job).await {
        Ok(path) => {
            println!("Saved: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
