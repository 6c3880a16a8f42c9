use reqwest::StatusCode;

/// Errors surfaced by the API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api request failed ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("malformed response frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid inline payload: {0}")]
    Payload(#[from] base64::DecodeError),

    #[error("operation {name} failed: {message}")]
    Operation { name: String, message: String },

    #[error("response contained no {0}")]
    Empty(&'static str),
}
