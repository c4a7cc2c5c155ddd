//! Scan orchestration.
//!
//! One batch run over a quiescent tree:
//!
//! ```text
//! enumerate ──▶ per-file (parallel): stat + classify, hash + thumbnail images
//!                     │
//!                   join
//!                     ▼
//!            folder closure over the complete file list
//!                     ▼
//!            manifest write (atomic, the only fatal step besides setup)
//! ```
//!
//! Per-file work has no ordering dependency, so it runs on the rayon pool;
//! hashing and image decode dominate the cost. Everything that can go wrong
//! with an individual file — unreadable stat, undecodable image — is logged
//! and skipped or degraded, never fatal. A failed run writes nothing: the
//! previous manifest and all cached artifacts survive intact.

use crate::config::IndexConfig;
use crate::entry::{Entry, EntryKind};
use crate::hierarchy;
use crate::manifest::{self, ManifestError};
use crate::meta;
use crate::thumbs::{CacheStats, ThumbOutcome, ThumbnailCache, hash_file};
use crate::walk::{self, WalkError};
use log::{info, warn};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Manifest write failed: {0}")]
    Manifest(#[from] ManifestError),
}

/// What a completed scan produced, for CLI reporting.
#[derive(Debug)]
pub struct ScanSummary {
    pub files: usize,
    pub folders: usize,
    pub cache: CacheStats,
    pub manifest_path: PathBuf,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Indexed {} files and {} folders → {}",
            self.files,
            self.folders,
            self.manifest_path.display()
        )?;
        write!(f, "Thumbnails: {}", self.cache)
    }
}

/// Thumbnail resolution result for one image, kept alongside its entry so
/// cache stats can be aggregated after the parallel section joins.
enum ImageOutcome {
    Resolved(ThumbOutcome),
    Failed,
}

/// Run the full pipeline: walk, extract, thumbnail, reconstruct, emit.
pub fn scan(config: &IndexConfig) -> Result<ScanSummary, ScanError> {
    let root = Path::new(&config.root);
    let paths = walk::enumerate(root, &config.ignore)?;
    info!("enumerated {} files under {}", paths.len(), root.display());

    let cache = ThumbnailCache::new(&config.thumbnails);
    cache.ensure_dir()?;

    let results: Vec<(Entry, Option<ImageOutcome>)> = paths
        .par_iter()
        .filter_map(|path| build_entry(root, path, &cache))
        .collect();

    let mut stats = CacheStats::default();
    let mut files = Vec::with_capacity(results.len());
    for (entry, outcome) in results {
        match outcome {
            Some(ImageOutcome::Resolved(o)) => stats.record(&o),
            Some(ImageOutcome::Failed) => stats.failed += 1,
            None => {}
        }
        files.push(entry);
    }

    let folders = hierarchy::folder_entries(root, &files);

    let manifest_path = PathBuf::from(&config.manifest_path);
    manifest::write_manifest(&manifest_path, &folders, &files)?;

    Ok(ScanSummary {
        files: files.len(),
        folders: folders.len(),
        cache: stats,
        manifest_path,
    })
}

/// Per-file stage: metadata always, hash + thumbnail for images.
///
/// Returns `None` when the file can't even be stat'd — it is skipped with
/// a warning, matching the walker's treatment of unreadable subtrees.
fn build_entry(
    root: &Path,
    path: &Path,
    cache: &ThumbnailCache,
) -> Option<(Entry, Option<ImageOutcome>)> {
    let mut entry = match meta::file_entry(root, path) {
        Ok(e) => e,
        Err(err) => {
            warn!("skipping {}: {err}", path.display());
            return None;
        }
    };

    if entry.kind != EntryKind::Image {
        return Some((entry, None));
    }

    let checksum = match hash_file(path) {
        Ok(h) => h,
        Err(err) => {
            // Unhashable image: indexed without checksum or thumbnail.
            warn!("hashing failed for {}: {err}", path.display());
            return Some((entry, Some(ImageOutcome::Failed)));
        }
    };

    let outcome = match cache.resolve(path, &checksum, entry.size_bytes) {
        Ok(outcome) => {
            entry.thumbnail_path = outcome.thumbnail_path();
            ImageOutcome::Resolved(outcome)
        }
        Err(err) => {
            warn!("thumbnail failed for {}: {err}", path.display());
            ImageOutcome::Failed
        }
    };
    // The hash stays even when no thumbnail was produced: it is the cache
    // key any future run will look up first.
    entry.checksum = Some(checksum);

    Some((entry, Some(outcome)))
}

/// Validation-only summary for the `check` command.
#[derive(Debug)]
pub struct CheckSummary {
    pub files: usize,
    pub folders: usize,
    pub images: usize,
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files ({} images) across {} folders",
            self.files, self.images, self.folders
        )
    }
}

/// Enumerate and classify without hashing, thumbnailing, or writing.
pub fn check(config: &IndexConfig) -> Result<CheckSummary, ScanError> {
    let root = Path::new(&config.root);
    let paths = walk::enumerate(root, &config.ignore)?;

    let files: Vec<Entry> = paths
        .iter()
        .filter_map(|path| match meta::file_entry(root, path) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                None
            }
        })
        .collect();

    let images = files.iter().filter(|e| e.kind == EntryKind::Image).count();
    let folders = hierarchy::folder_paths(files.iter().map(|e| e.path.as_str())).len();

    Ok(CheckSummary {
        files: files.len(),
        folders,
        images,
    })
}
