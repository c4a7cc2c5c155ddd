//! Path enumeration.
//!
//! Walks the scan root and yields the set of regular files to index.
//! Filtering rules, in order:
//!
//! - dotfiles and dot-directories are always excluded
//! - configured ignore globs are excluded (`dir/**` prunes a subtree,
//!   a bare name matches an exact file)
//! - symlinks are not followed, so cycles cannot occur
//!
//! An unreadable file or subtree is skipped with a logged warning; partial
//! failure never aborts the scan. Only a missing or non-directory root is
//! fatal, since there would be nothing to index at all.

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use log::warn;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Scan root is not a directory: {0}")]
    RootNotFound(PathBuf),
    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] ignore::Error),
}

/// Enumerate every regular file under `root` not excluded by `ignore`
/// patterns, sorted for deterministic manifests.
pub fn enumerate(root: &Path, ignore: &[String]) -> Result<Vec<PathBuf>, WalkError> {
    if !root.is_dir() {
        return Err(WalkError::RootNotFound(root.to_path_buf()));
    }

    // Patterns are expressed as overrides with a `!` prefix: matching
    // paths are excluded, everything else stays in.
    let mut overrides = OverrideBuilder::new(root);
    for pattern in ignore {
        overrides.add(&format!("!{pattern}"))?;
    }

    let walker = WalkBuilder::new(root)
        // No .gitignore/.ignore handling: the config is the only source
        // of exclusion rules. Dotfile filtering is re-enabled below.
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .overrides(overrides.build()?)
        .build();

    let mut files = Vec::new();
    for result in walker {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|t| t.is_file()) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => warn!("skipping unreadable entry: {err}"),
        }
    }

    files.sort();
    Ok(files)
}
