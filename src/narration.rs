//! Narration document parsing.
//!
//! Two input shapes, picked by extension: a structured JSON document with a
//! list of segments, or a plain text file read one line per entry. Both
//! reduce to the same thing: the kept lines joined for transmission, plus an
//! ordered, deduplicated list of the speakers found in `Name:` prefixes.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::PipelineError;

lazy_static! {
    static ref SPEAKER_RE: Regex =
        Regex::new(r"^\s*([^:]{1,60}):\s*").expect("speaker pattern compiles");
}

/// A narration document reduced to what the synthesis call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    /// Kept lines joined with newlines, `Name:` prefixes left in place —
    /// the remote service uses them for speaker turn detection.
    pub text: String,
    /// Distinct speaker names in first-seen order.
    pub speakers: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NarrationDocument {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Default, Deserialize)]
struct Segment {
    #[serde(default)]
    text: String,
}

pub fn read_document(path: &Path) -> Result<Narration, PipelineError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipelineError::InputNotFound(path.to_path_buf())
        } else {
            PipelineError::ReadInput(e)
        }
    })?;

    if is_segmented(path) {
        let document: NarrationDocument = serde_json::from_str(&raw)?;
        collect(document.segments.iter().map(|segment| segment.text.as_str()))
    } else {
        collect(raw.lines())
    }
}

fn is_segmented(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn collect<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Narration, PipelineError> {
    let mut kept: Vec<&str> = Vec::new();
    let mut speakers: Vec<String> = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(captures) = SPEAKER_RE.captures(line) {
            let name = captures[1].trim();
            if !name.is_empty() && !speakers.iter().any(|known| known == name) {
                speakers.push(name.to_string());
            }
        }
        kept.push(line);
    }

    if kept.is_empty() {
        return Err(PipelineError::EmptyNarration);
    }
    Ok(Narration {
        text: kept.join("\n"),
        speakers,
    })
}
