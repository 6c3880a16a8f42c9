//! Output path resolution and atomic file writing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Pick the final output path: the caller's choice, or a sibling of the
/// input named `narration`. Either way the extension is forced to match the
/// detected audio format, preserving base name and directory.
pub fn resolve_path(input: &Path, requested: Option<&Path>, extension: &str) -> PathBuf {
    let mut path = match requested {
        Some(requested) => requested.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("narration"),
    };

    let matches = path
        .extension()
        .and_then(|existing| existing.to_str())
        .map(|existing| existing.eq_ignore_ascii_case(extension))
        .unwrap_or(false);
    if !matches {
        path.set_extension(extension);
    }
    path
}

/// Write the full byte sequence with no partially written file ever visible
/// at the final path: write a same-directory temp file, then rename it into
/// place.
///
/// The temp name carries the process id and a sequence number so concurrent
/// runs targeting the same output never share a temp file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
