//! # File Atlas
//!
//! A batch indexer that turns an arbitrary directory tree into a single
//! JSON manifest a static catalog site can browse. Your filesystem is the
//! data source: files become typed entries, their parent directories become
//! synthesized folder entries, and large images get content-addressed
//! thumbnails.
//!
//! # Architecture: One Pass, Then Emit
//!
//! A scan is a single batch job over a quiescent tree:
//!
//! ```text
//! 1. Enumerate   root/       →  file paths     (ignore globs, no dotfiles)
//! 2. Extract     paths       →  entries        (classify + stat, parallel)
//! 3. Thumbnail   image entry →  <hash>.webp    (content-addressed cache)
//! 4. Reconstruct entries     →  folder entries (closure over file paths)
//! 5. Emit        everything  →  index.json     (atomic overwrite)
//! ```
//!
//! The manifest is always regenerated whole — there is no incremental
//! update of individual entries. The thumbnail artifacts are the only
//! state that persists across runs: keyed by content hash, an unchanged
//! image is never re-encoded no matter how often you scan, and renaming
//! or moving it reuses the same artifact.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`walk`] | Enumerates regular files under the root, applying ignore globs |
//! | [`meta`] | Classifies files (image/notebook/pdf/text/other) and extracts stat metadata |
//! | [`thumbs`] | Content-addressed thumbnail cache: hash, threshold decision, WebP generation |
//! | [`hierarchy`] | Derives folder entries from the flat file-path list |
//! | [`manifest`] | Serializes folders-then-files and atomically replaces the manifest |
//! | [`scan`] | Orchestrates the pipeline with a bounded parallel worker pool |
//! | [`entry`] | The `Entry` record and stable id derivation shared by all stages |
//! | [`config`] | `catalog.toml` loading, validation, and stock config generation |
//!
//! # Design Decisions
//!
//! ## Content-Addressed Artifacts
//!
//! Thumbnails are named `<sha256-of-bytes>.webp`, not after their source
//! path. A cache hit is a single `exists()` check with no image decode, and
//! two byte-identical files share one artifact. Nothing ever garbage
//! collects the cache; artifacts are cheap and stale ones are harmless.
//!
//! ## Folder Derivation as a Pure Function
//!
//! Folders are computed from the complete file list after all per-file work
//! joins, not accumulated in shared state while walking. The set of folder
//! entries is therefore a deterministic function of the file paths, and the
//! closure property (every ancestor of every entry is present, exactly
//! once) holds by construction.
//!
//! ## Degrade, Don't Abort
//!
//! An unreadable subtree, an unhashable file, or a corrupt image costs that
//! entry its metadata, checksum, or thumbnail — and a logged warning — but
//! never the scan. Only configuration errors, a missing root, and manifest
//! write failures are fatal, and a fatal run leaves the previous manifest
//! untouched.

pub mod config;
pub mod entry;
pub mod hierarchy;
pub mod manifest;
pub mod meta;
pub mod scan;
pub mod thumbs;
pub mod walk;
