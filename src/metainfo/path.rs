//! Validation of file paths taken from a torrent.
//!
//! Torrent files are untrusted input. Every path is checked before it is
//! accepted so that no entry can name a location outside the download
//! directory.

use super::error::MetainfoError;
use std::path::PathBuf;

/// Builds a relative path from torrent path segments.
///
/// Segments are split again on both `/` and `\`, so a single segment such
/// as `"../outside"` cannot smuggle a separator past the checks. Empty and
/// `.` segments are dropped.
///
/// # Errors
///
/// Returns [`MetainfoError::InvalidPath`] if the path is absolute, carries
/// a drive prefix, contains a `..` segment or a NUL byte, or is empty once
/// normalized.
pub fn sanitize_path<S: AsRef<str>>(segments: &[S]) -> Result<PathBuf, MetainfoError> {
    let joined = segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/");

    let invalid = || MetainfoError::InvalidPath(joined.clone());

    if joined.starts_with('/') || joined.starts_with('\\') || has_drive_prefix(&joined) {
        return Err(invalid());
    }

    if joined.contains('\0') {
        return Err(invalid());
    }

    let mut path = PathBuf::new();
    for part in joined.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => return Err(invalid()),
            part => path.push(part),
        }
    }

    if path.as_os_str().is_empty() {
        return Err(invalid());
    }

    Ok(path)
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
