//! The narration-to-audio pipeline.
//!
//! Strictly linear: parse → assign voices → stream synthesis → accumulate →
//! wrap container → write. Each stage owns its output until it hands it to
//! the next; the output path is the only external resource and is touched
//! exactly once, at the very end.

use std::path::PathBuf;

use futures_util::{pin_mut, Stream, StreamExt};
use tracing::{debug, info};
use vega_genai::{AudioEvent, Client, GenerateContentRequest, SpeakerVoiceConfig};

use crate::error::PipelineError;
use crate::{audio, narration, output, voices};

const READING_PROMPT: &str = "Read aloud in a clear, engaging tone.";

/// Everything one synthesis run needs, built once by the CLI layer and
/// immutable for the run's duration.
#[derive(Debug, Clone)]
pub struct TtsJob {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub model: String,
    pub voices: Option<String>,
    pub temperature: f32,
    pub api_key: String,
    /// Alternate API endpoint (proxy or local server); service default when
    /// unset.
    pub base_url: Option<String>,
}

pub async fn run(job: &TtsJob) -> Result<PathBuf, PipelineError> {
    let narration = narration::read_document(&job.input)?;
    info!(
        speakers = narration.speakers.len(),
        chars = narration.text.len(),
        "parsed narration"
    );

    // Credential check happens before any network call.
    if job.api_key.is_empty() {
        return Err(PipelineError::MissingCredential);
    }

    let palette = voices::parse_palette(job.voices.as_deref());
    let cast = voices::assign(&narration.speakers, &palette);
    for (speaker, voice) in &cast {
        debug!(%speaker, %voice, "assigned voice");
    }

    let request =
        GenerateContentRequest::from_text(format!("{READING_PROMPT}\n{}", narration.text))
            .with_temperature(job.temperature)
            .with_speakers(
                cast.iter()
                    .map(|(speaker, voice)| SpeakerVoiceConfig::prebuilt(speaker, voice))
                    .collect(),
            );

    let mut client = Client::new(&job.api_key);
    if let Some(base_url) = &job.base_url {
        client = client.with_base_url(base_url);
    }
    let session = client.stream_generate_content(&job.model, &request).await?;
    let (raw, descriptor) = accumulate(session.into_stream()).await?;
    info!(bytes = raw.len(), format = descriptor.as_deref(), "stream complete");

    let descriptor = descriptor.unwrap_or_else(|| audio::DEFAULT_FORMAT.to_string());
    let extension = audio::extension_for(&descriptor);
    let bytes = if extension == "wav" {
        audio::wav_from_pcm(&raw, audio::parse_format(&descriptor))
    } else {
        // The service already returned a fully formed container.
        raw
    };

    let out_path = output::resolve_path(&job.input, job.output.as_deref(), extension);
    output::write_atomic(&out_path, &bytes).map_err(PipelineError::Write)?;
    info!(path = %out_path.display(), bytes = bytes.len(), "wrote audio");
    Ok(out_path)
}

/// Concatenate payload bytes in arrival order and keep the format descriptor
/// announced by the first payload-bearing event.
///
/// Later descriptors are ignored; if a service ever changed formats
/// mid-stream the container would be silently misencoded. Known limitation,
/// kept for compatibility with the service's observed behavior.
pub async fn accumulate<S>(events: S) -> Result<(Vec<u8>, Option<String>), PipelineError>
where
    S: Stream<Item = Result<AudioEvent, vega_genai::Error>>,
{
    pin_mut!(events);
    let mut buffer: Vec<u8> = Vec::new();
    let mut descriptor: Option<String> = None;

    while let Some(event) = events.next().await {
        let event = event?;
        let Some(data) = event.data else {
            continue;
        };
        if data.is_empty() {
            continue;
        }
        if descriptor.is_none() {
            descriptor = event.mime_type.filter(|mime| !mime.is_empty());
        }
        buffer.extend_from_slice(&data);
    }

    if buffer.is_empty() {
        return Err(PipelineError::NoAudioProduced);
    }
    Ok((buffer, descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn event(data: &[u8], mime: Option<&str>) -> Result<AudioEvent, vega_genai::Error> {
        Ok(AudioEvent {
            data: Some(data.to_vec()),
            mime_type: mime.map(String::from),
        })
    }

    #[tokio::test]
    async fn accumulate_concatenates_in_arrival_order() {
        let events = stream::iter(vec![
            event(b"abc", Some("audio/L16;rate=24000")),
            Ok(AudioEvent::default()),
            event(b"def", Some("audio/mpeg")),
        ]);

        let (bytes, descriptor) = accumulate(events).await.unwrap();
        assert_eq!(bytes, b"abcdef");
        // First descriptor wins; the second is ignored.
        assert_eq!(descriptor.as_deref(), Some("audio/L16;rate=24000"));
    }

    #[tokio::test]
    async fn descriptor_can_come_from_a_later_payload() {
        let events = stream::iter(vec![
            event(b"abc", None),
            event(b"def", Some("audio/L16;rate=24000")),
        ]);

        let (bytes, descriptor) = accumulate(events).await.unwrap();
        assert_eq!(bytes, b"abcdef");
        assert_eq!(descriptor.as_deref(), Some("audio/L16;rate=24000"));
    }

    #[tokio::test]
    async fn empty_stream_is_no_audio_produced() {
        let events = stream::iter(vec![
            Ok(AudioEvent::default()),
            Ok(AudioEvent {
                data: Some(Vec::new()),
                mime_type: Some("audio/L16;rate=24000".to_string()),
            }),
        ]);

        let result = accumulate(events).await;
        assert!(matches!(result, Err(PipelineError::NoAudioProduced)));
    }

    #[tokio::test]
    async fn stream_error_aborts_accumulation() {
        let events = stream::iter(vec![
            event(b"abc", None),
            Err(vega_genai::Error::Empty("audio payload")),
        ]);

        let result = accumulate(events).await;
        assert!(matches!(result, Err(PipelineError::Stream(_))));
    }

    /// Serve one canned SSE response on a throwaway local port and return a
    /// base URL pointing at it.
    async fn serve_sse_once(body: String) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Drain the request: headers, then content-length body bytes.
            let mut data = Vec::new();
            let mut buf = [0u8; 1024];
            let (body_start, content_length) = loop {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "client closed before sending a full request");
                data.extend_from_slice(&buf[..n]);
                if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&data[..pos]).to_ascii_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|value| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    break (pos + 4, content_length);
                }
            };
            while data.len() < body_start + content_length {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                data.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/")
    }

    fn job_for(dir: &std::path::Path, base_url: String) -> TtsJob {
        TtsJob {
            input: dir.join("narration.json"),
            output: None,
            model: "test-model".to_string(),
            voices: None,
            temperature: 1.0,
            api_key: "test-key".to_string(),
            base_url: Some(base_url),
        }
    }

    #[tokio::test]
    async fn run_writes_a_complete_riff_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("narration.json"),
            r#"{"segments":[{"text":"Hello world"}]}"#,
        )
        .unwrap();

        // 48000 zero bytes of PCM: 16000 base64 quanta of "AAAA".
        let b64 = "A".repeat(64_000);
        let body = format!(
            "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"inlineData\":{{\"mimeType\":\"audio/L16;rate=24000\",\"data\":\"{b64}\"}}}}]}}}}]}}\n\n"
        );
        let base_url = serve_sse_once(body).await;

        let path = run(&job_for(dir.path(), base_url)).await.unwrap();
        assert_eq!(path, dir.path().join("narration.wav"));

        // 44-byte header plus the raw PCM, exactly.
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 48_044);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 36 + 48_000);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 24_000);
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 48_000);
    }

    #[tokio::test]
    async fn run_with_no_payload_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("narration.json"),
            r#"{"segments":[{"text":"Hello world"}]}"#,
        )
        .unwrap();
        let existing = dir.path().join("narration.wav");
        std::fs::write(&existing, b"previous run").unwrap();

        let base_url = serve_sse_once("data: {}\n\n".to_string()).await;
        let result = run(&job_for(dir.path(), base_url)).await;

        assert!(matches!(result, Err(PipelineError::NoAudioProduced)));
        assert_eq!(std::fs::read(&existing).unwrap(), b"previous run");
    }
}
