//! Streaming synthesis session.
//!
//! The service answers a `streamGenerateContent?alt=sse` call with
//! line-delimited `data: {json}` frames. [`SpeechStream`] follows a
//! cooperative pull model: each [`next_event`](SpeechStream::next_event)
//! call fetches transport chunks on demand, reassembles frames that were
//! split across reads, and hands back one decoded [`AudioEvent`] at a time.

use std::collections::VecDeque;
use std::pin::Pin;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::error::Error;
use crate::types::GenerateContentResponse;

/// One event from a streaming synthesis call.
///
/// Payload and format descriptor are both optional: the service interleaves
/// metadata-only frames with audio-bearing ones, and only the latter matter
/// downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioEvent {
    /// Decoded audio bytes, if this event carried any.
    pub data: Option<Vec<u8>>,
    /// MIME-style format descriptor announced alongside the payload.
    pub mime_type: Option<String>,
}

/// Lazy, finite, non-restartable sequence of synthesis events.
pub struct SpeechStream {
    body: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    decoder: SseDecoder,
    pending: VecDeque<AudioEvent>,
    done: bool,
}

impl SpeechStream {
    pub(crate) fn new(body: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static) -> Self {
        Self {
            body: Box::pin(body),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Pull the next event. `Ok(None)` means the stream finished; a finished
    /// or failed stream stays that way, and synthesizing again requires a
    /// brand-new request.
    pub async fn next_event(&mut self) -> Result<Option<AudioEvent>, Error> {
        match self.advance().await {
            Ok(event) => Ok(event),
            Err(e) => {
                self.done = true;
                self.pending.clear();
                Err(e)
            }
        }
    }

    async fn advance(&mut self) -> Result<Option<AudioEvent>, Error> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if self.done {
                return Ok(None);
            }
            match self.body.next().await {
                Some(chunk) => {
                    for frame in self.decoder.push(&chunk?)? {
                        self.pending.push_back(event_from_response(frame)?);
                    }
                }
                None => {
                    self.done = true;
                    if let Some(frame) = self.decoder.finish()? {
                        self.pending.push_back(event_from_response(frame)?);
                    }
                }
            }
        }
    }

    /// Adapt the session to a `futures` stream for combinator-style consumers.
    pub fn into_stream(self) -> impl Stream<Item = Result<AudioEvent, Error>> + Send {
        futures_util::stream::unfold(self, |mut session| async move {
            match session.next_event().await {
                Ok(Some(event)) => Some((Ok(event), session)),
                Ok(None) => None,
                Err(e) => Some((Err(e), session)),
            }
        })
    }
}

/// Incremental decoder for `data:`-framed SSE bodies.
///
/// Transport chunks carry no alignment guarantees, so bytes are buffered
/// until a full line is available. Comment lines, event-name lines, and
/// blank keep-alive lines are ignored.
struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn push(&mut self, chunk: &[u8]) -> Result<Vec<GenerateContentResponse>, Error> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if let Some(frame) = decode_line(&line)? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// Flush a trailing line that arrived without a final newline.
    fn finish(&mut self) -> Result<Option<GenerateContentResponse>, Error> {
        let line = std::mem::take(&mut self.buf);
        decode_line(&line)
    }
}

fn decode_line(line: &[u8]) -> Result<Option<GenerateContentResponse>, Error> {
    let line = line.trim_ascii();
    let Some(payload) = line.strip_prefix(b"data:") else {
        return Ok(None);
    };
    let payload = payload.trim_ascii_start();
    if payload.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(payload)?))
}

/// Collapse one response frame into a tagged event, decoding the inline
/// payload once at the boundary. Frames without a first-candidate payload
/// become payload-less events.
fn event_from_response(frame: GenerateContentResponse) -> Result<AudioEvent, Error> {
    let inline = frame
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.inline_data);

    let Some(inline) = inline else {
        return Ok(AudioEvent::default());
    };

    let data = match inline.data {
        Some(b64) if !b64.is_empty() => Some(BASE64.decode(b64.as_bytes())?),
        _ => None,
    };
    Ok(AudioEvent {
        data,
        mime_type: inline.mime_type,
    })
}
