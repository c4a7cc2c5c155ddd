//! Manifest entry types shared across all indexing stages.
//!
//! One [`Entry`] per file or implied folder. The JSON field names are the
//! contract with the catalog browser and must not change: `id`, `name`,
//! `path`, `type`, `mime`, `size_bytes`, `updated_at`, `checksum`,
//! `thumbnail_path`. Every field is present on every entry; absent values
//! serialize as `null`, never disappear.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Simplified classification of an entry, rendered as lowercase strings
/// in the manifest (`"folder"`, `"image"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Folder,
    Image,
    Notebook,
    Pdf,
    Text,
    Other,
}

/// A single record in the catalog manifest.
///
/// Entries are created fresh on every scan; the manifest is always fully
/// regenerated. Only thumbnail artifacts on disk outlive a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable identifier: hex SHA-256 of `path`. Identical path across
    /// runs yields an identical id.
    pub id: String,
    /// Final path segment.
    pub name: String,
    /// Path relative to the scan root, forward slashes on every host,
    /// no leading or trailing separator.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Best-effort media type; `null` for folders.
    pub mime: Option<String>,
    pub size_bytes: u64,
    /// Last filesystem modification, ISO-8601 UTC.
    pub updated_at: String,
    /// Content hash of the file bytes. Only computed for images, where it
    /// doubles as the thumbnail cache key.
    pub checksum: Option<String>,
    /// Browser-fetchable path to the derived thumbnail, or `null`.
    pub thumbnail_path: Option<String>,
}

/// Derive the stable entry id from a root-relative path.
pub fn entry_id(rel_path: &str) -> String {
    let digest = Sha256::digest(rel_path.as_bytes());
    format!("{:x}", digest)
}
