//! Long-running video generation.
//!
//! The job runs server-side: submit, poll the operation handle until its
//! completion flag is set, then download the result file by URI.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{check_status, Client, API_KEY_HEADER};
use crate::error::Error;

/// Parameters for a video generation job.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

impl VideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
        }
    }

    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative.into());
        self
    }
}

/// Handle for a long-running server-side job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OperationError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationResponse {
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateVideoResponse {
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSample {
    pub video: VideoFile,
}

/// Reference to a downloadable result file.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    pub uri: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [Instance<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Parameters<'a>>,
}

#[derive(Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    negative_prompt: &'a str,
}

impl Client {
    /// Submit a video generation job and return its operation handle.
    pub async fn generate_videos(
        &self,
        model: &str,
        request: &VideoRequest,
    ) -> Result<Operation, Error> {
        let url = format!("{}models/{}:predictLongRunning", self.base_url, model);
        let body = PredictRequest {
            instances: [Instance {
                prompt: &request.prompt,
            }],
            parameters: request
                .negative_prompt
                .as_deref()
                .map(|negative_prompt| Parameters { negative_prompt }),
        };

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch the current state of a long-running operation.
    pub async fn get_operation(&self, name: &str) -> Result<Operation, Error> {
        let url = format!("{}{}", self.base_url, name);
        self.get_json(&url).await
    }

    /// Re-fetch the operation on a fixed interval until its completion flag
    /// is set, then surface either the server-side failure or the generated
    /// file reference.
    pub async fn poll_operation(
        &self,
        mut operation: Operation,
        interval: Duration,
    ) -> Result<VideoFile, Error> {
        while !operation.done {
            info!(name = %operation.name, "waiting for completion");
            tokio::time::sleep(interval).await;
            operation = self.get_operation(&operation.name).await?;
        }

        if let Some(error) = operation.error {
            return Err(Error::Operation {
                name: operation.name,
                message: error.message,
            });
        }
        operation
            .response
            .and_then(|response| response.generate_video_response)
            .and_then(|response| response.generated_samples.into_iter().next())
            .map(|sample| sample.video)
            .ok_or(Error::Empty("video result"))
    }

    /// Download a result file by URI.
    pub async fn download_file(&self, uri: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .http
            .get(uri)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_request_shape() {
        let request = VideoRequest::new("a dog in a field").with_negative_prompt("barking");
        let body = PredictRequest {
            instances: [Instance {
                prompt: &request.prompt,
            }],
            parameters: request
                .negative_prompt
                .as_deref()
                .map(|negative_prompt| Parameters { negative_prompt }),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["instances"][0]["prompt"], "a dog in a field");
        assert_eq!(value["parameters"]["negativePrompt"], "barking");
    }

    #[test]
    fn pending_operation_parses() {
        let operation: Operation =
            serde_json::from_str(r#"{"name":"operations/abc123"}"#).unwrap();
        assert_eq!(operation.name, "operations/abc123");
        assert!(!operation.done);
        assert!(operation.response.is_none());
    }

    #[test]
    fn finished_operation_exposes_video_uri() {
        let operation: Operation = serde_json::from_str(
            r#"{
                "name": "operations/abc123",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [
                            {"video": {"uri": "https://example.com/files/xyz"}}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();

        assert!(operation.done);
        let uri = operation
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .map(|s| s.video.uri);
        assert_eq!(uri.as_deref(), Some("https://example.com/files/xyz"));
    }
}
