//! File metadata extraction.
//!
//! Turns an enumerated path into a manifest [`Entry`]: identity, simplified
//! classification, and filesystem stat data. Classification resolves in a
//! fixed precedence order:
//!
//! 1. media-type family `image/*` → `image`
//! 2. `.ipynb` extension → `notebook`
//! 3. exactly `application/pdf` → `pdf`
//! 4. media-type family `text/*` → `text`
//! 5. everything else → `other`
//!
//! The extension rule sits above the generic text rule so notebooks (which
//! are textual JSON) classify as `notebook`, never `text`. A failed
//! media-type lookup falls back to `application/octet-stream` and `other`.

use crate::entry::{Entry, EntryKind, entry_id};
use chrono::{DateTime, SecondsFormat, Utc};
use mime_guess::mime;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Media type recorded when the lookup comes up empty.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Compute the root-relative path in canonical forward-slash form.
///
/// Returns `None` when `path` is not under `root` — the walker never
/// produces such a path, but the caller treats it as a skip, not a panic.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Classify a file by media type and extension. Returns the simplified
/// kind together with the media type string stored in the manifest.
pub fn classify(path: &Path) -> (EntryKind, String) {
    let guessed = mime_guess::from_path(path).first();
    let media_type = guessed
        .as_ref()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string());

    let is_notebook = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("ipynb"));

    let kind = match guessed {
        Some(m) if m.type_() == mime::IMAGE => EntryKind::Image,
        _ if is_notebook => EntryKind::Notebook,
        Some(m) if m == mime::APPLICATION_PDF => EntryKind::Pdf,
        Some(m) if m.type_() == mime::TEXT => EntryKind::Text,
        _ => EntryKind::Other,
    };

    (kind, media_type)
}

/// Render a filesystem timestamp as ISO-8601 UTC with millisecond
/// precision (`2026-08-27T10:15:30.000Z`).
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Read a path's mtime, falling back to the epoch when unavailable.
///
/// The epoch fallback (rather than "now") keeps unreadable timestamps from
/// masquerading as fresh content in date-sorted views.
pub fn modified_or_epoch(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(UNIX_EPOCH)
}

/// Build the manifest entry for a regular file.
///
/// `checksum` and `thumbnail_path` start out empty; the thumbnail stage
/// fills them in for image entries.
pub fn file_entry(root: &Path, path: &Path) -> io::Result<Entry> {
    let rel = relative_path(root, path).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path escapes scan root: {}", path.display()),
        )
    })?;

    let metadata = std::fs::metadata(path)?;
    let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
    let (kind, media_type) = classify(path);

    let name = rel.rsplit('/').next().unwrap_or(&rel).to_string();

    Ok(Entry {
        id: entry_id(&rel),
        name,
        path: rel,
        kind,
        mime: Some(media_type),
        size_bytes: metadata.len(),
        updated_at: format_timestamp(modified),
        checksum: None,
        thumbnail_path: None,
    })
}
