//! Manifest emission.
//!
//! Serializes the catalog as a single JSON array — folder entries first,
//! then file entries — and replaces any prior manifest atomically: the
//! document is written to a temp file in the destination directory and
//! renamed into place, so a concurrent reader sees either the old manifest
//! or the new one, never a truncated in-between. Ordering beyond
//! folders-before-files is the browser's concern, not ours.

use crate::entry::Entry;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the manifest to `path`, creating parent directories as needed.
///
/// Any failure here is fatal to the run: the previous manifest (if any)
/// is left untouched.
pub fn write_manifest(
    path: &Path,
    folders: &[Entry],
    files: &[Entry],
) -> Result<(), ManifestError> {
    let entries: Vec<&Entry> = folders.iter().chain(files.iter()).collect();
    let json = serde_json::to_string_pretty(&entries)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
