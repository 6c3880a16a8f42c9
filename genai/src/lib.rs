//! Client for the generative-media HTTP API.
//!
//! Three surfaces, matching the three remote endpoints the tooling touches:
//!
//! - [`Client::stream_generate_content`] — streaming speech synthesis.
//!   Returns a [`SpeechStream`] that is pulled one [`AudioEvent`] at a time;
//!   the stream is finite and cannot be restarted.
//! - [`Client::edit_image`] — single-shot image editing.
//! - [`Client::generate_videos`] / [`Client::poll_operation`] /
//!   [`Client::download_file`] — long-running video generation.
//!
//! # Example
//!
//! ```no_run
//! use vega_genai::{Client, GenerateContentRequest};
//!
//! # async fn demo() -> Result<(), vega_genai::Error> {
//! let client = Client::new(std::env::var("GEMINI_API_KEY").unwrap_or_default());
//! let request = GenerateContentRequest::from_text("Narrator: Hello world");
//! let mut stream = client
//!     .stream_generate_content("gemini-2.5-pro-preview-tts", &request)
//!     .await?;
//! while let Some(event) = stream.next_event().await? {
//!     if let Some(bytes) = event.data {
//!         println!("received {} audio bytes", bytes.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod image;
mod stream;
mod types;
mod video;

pub use client::{Client, DEFAULT_BASE_URL};
pub use error::Error;
pub use stream::{AudioEvent, SpeechStream};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineData, MultiSpeakerVoiceConfig, Part, PrebuiltVoiceConfig, SpeakerVoiceConfig,
    SpeechConfig, VoiceConfig,
};
pub use video::{GeneratedSample, Operation, OperationError, VideoFile, VideoRequest};
