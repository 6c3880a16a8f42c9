//! Edit a still image with a natural-language instruction.
//!
//! One call, one artifact: the edited image comes back base64-encoded and is
//! saved to the output path.
//!
//! Usage:
//!   export GEMINI_API_KEY=...
//!   edit-image input.png output.png "replace the sky with a sunset"

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use vega_genai::Client;

#[derive(Parser, Debug)]
#[command(author, version, about = "Edit an image with a natural-language instruction")]
struct Args {
    /// Input image (png, jpeg or webp)
    input: PathBuf,

    /// Output image path
    output: PathBuf,

    /// Edit instruction
    prompt: String,

    /// Image model id
    #[arg(long, default_value = "gemini-2.5-flash-image-preview")]
    model: String,
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

    let image = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let mime_type = mime_for(&args.input)?;

    let client = Client::new(api_key);
    info!(model = %args.model, "requesting image edit");
    let edited = client
        .edit_image(&args.model, &image, mime_type, &args.prompt)
        .await?;

    std::fs::write(&args.output, &edited)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Saved: {}", args.output.display());
    Ok(())
}

fn mime_for(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => Ok("image/png"),
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("webp") => Ok("image/webp"),
        _ => bail!("unsupported image type: {}", path.display()),
    }
}
