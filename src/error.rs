use std::path::PathBuf;

/// Fatal pipeline failures, one variant per failure class.
///
/// Each maps to a process exit status so callers can tell "nothing to read"
/// apart from "nothing came back". Format-descriptor problems are absent on
/// purpose: those degrade to defaults instead of aborting the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input document not found: {0}")]
    InputNotFound(PathBuf),

    #[error("failed to read input document: {0}")]
    ReadInput(#[source] std::io::Error),

    #[error("input document is not valid JSON: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("no narration text found")]
    EmptyNarration,

    #[error("GEMINI_API_KEY is not set")]
    MissingCredential,

    #[error("synthesis stream failed: {0}")]
    Stream(#[from] vega_genai::Error),

    #[error("no audio data received from the model")]
    NoAudioProduced,

    #[error("failed to write output file: {0}")]
    Write(#[source] std::io::Error),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::EmptyNarration => 2,
            PipelineError::MissingCredential => 3,
            PipelineError::NoAudioProduced => 4,
            _ => 1,
        }
    }
}
