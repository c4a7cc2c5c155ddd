//! Content-addressed thumbnail cache.
//!
//! Image entries get a derived WebP preview, keyed by a hash of the file's
//! bytes rather than its path. Renaming or moving an unchanged image reuses
//! the existing artifact; re-scanning never regenerates it. The indexer
//! never deletes artifacts — stale thumbnails are left for an external
//! cleanup, if anyone ever cares.
//!
//! # Decision ladder
//!
//! For each image, cheapest check first:
//!
//! 1. `<hash>.webp` already on disk → reuse, no image bytes touched
//! 2. header dimensions + file size both under the configured thresholds
//!    → no thumbnail at all, the original is small enough to serve
//! 3. otherwise decode, resize to the target width (Lanczos3, aspect
//!    preserved), encode WebP
//!
//! # Write safety
//!
//! Artifacts are written to a temp file in the cache directory and renamed
//! into place. Two workers producing the same hash concurrently both write
//! identical bytes, so whichever rename lands last leaves a correct file.

use crate::config::ThumbnailsConfig;
use image::ImageFormat;
use image::imageops::FilterType;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Output format for every derived artifact.
const ARTIFACT_EXT: &str = "webp";

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Image decode/encode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// What happened to a single image entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbOutcome {
    /// Artifact already existed; carries its manifest path.
    Cached(String),
    /// Artifact was produced on this run.
    Generated(String),
    /// Under both thresholds — no artifact wanted.
    NotNeeded,
}

impl ThumbOutcome {
    /// Manifest `thumbnail_path` value for this outcome.
    pub fn thumbnail_path(&self) -> Option<String> {
        match self {
            Self::Cached(p) | Self::Generated(p) => Some(p.clone()),
            Self::NotNeeded => None,
        }
    }
}

/// The on-disk cache of derived previews.
pub struct ThumbnailCache {
    dir: PathBuf,
    url_prefix: String,
    size_threshold_bytes: u64,
    max_dimension: u32,
    width: u32,
}

impl ThumbnailCache {
    pub fn new(config: &ThumbnailsConfig) -> Self {
        let mut url_prefix = config.url_prefix.clone();
        if !url_prefix.is_empty() && !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self {
            dir: PathBuf::from(&config.dir),
            url_prefix,
            size_threshold_bytes: config.size_threshold_bytes,
            max_dimension: config.max_dimension,
            width: config.width,
        }
    }

    /// Create the artifact directory. Called once before workers start.
    pub fn ensure_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// On-disk location of the artifact for a content hash.
    pub fn artifact_path(&self, checksum: &str) -> PathBuf {
        self.dir.join(format!("{checksum}.{ARTIFACT_EXT}"))
    }

    /// Manifest-facing path of the artifact for a content hash.
    fn artifact_url(&self, checksum: &str) -> String {
        format!("{}{checksum}.{ARTIFACT_EXT}", self.url_prefix)
    }

    /// Resolve the thumbnail for one image, generating it when required.
    ///
    /// `checksum` is the content hash of `source` (see [`hash_file`]),
    /// `size_bytes` its stat size. Errors are returned to the caller, who
    /// logs and carries on with a null thumbnail; a bad image must never
    /// abort the scan.
    pub fn resolve(
        &self,
        source: &Path,
        checksum: &str,
        size_bytes: u64,
    ) -> Result<ThumbOutcome, ThumbError> {
        // Cache hit: cheap by contract, no decode of the source.
        if self.artifact_path(checksum).exists() {
            return Ok(ThumbOutcome::Cached(self.artifact_url(checksum)));
        }

        let (width, height) = image::image_dimensions(source)?;
        let oversized = width > self.max_dimension || height > self.max_dimension;
        if size_bytes <= self.size_threshold_bytes && !oversized {
            return Ok(ThumbOutcome::NotNeeded);
        }

        self.generate(source, checksum, (width, height))?;
        Ok(ThumbOutcome::Generated(self.artifact_url(checksum)))
    }

    /// Decode, resize to the target width, encode WebP, rename into place.
    fn generate(
        &self,
        source: &Path,
        checksum: &str,
        (width, height): (u32, u32),
    ) -> Result<(), ThumbError> {
        let img = image::open(source)?;

        // Never enlarge: a byte-heavy but small-dimension image keeps its size.
        let target_w = self.width.min(width);
        let target_h = ((height as f64) * (target_w as f64) / (width as f64))
            .round()
            .max(1.0) as u32;
        let resized = img.resize_exact(target_w, target_h, FilterType::Lanczos3);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        resized.write_to(&mut tmp, ImageFormat::WebP)?;
        tmp.persist(self.artifact_path(checksum))
            .map_err(|e| ThumbError::Io(e.error))?;
        Ok(())
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
///
/// This is both the manifest `checksum` field and the cache key.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Summary of thumbnail cache performance for a scan run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub generated: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl CacheStats {
    pub fn record(&mut self, outcome: &ThumbOutcome) {
        match outcome {
            ThumbOutcome::Cached(_) => self.hits += 1,
            ThumbOutcome::Generated(_) => self.generated += 1,
            ThumbOutcome::NotNeeded => self.skipped += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.hits + self.generated + self.skipped + self.failed
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cached, {} generated, {} under threshold",
            self.hits, self.generated, self.skipped
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} images)", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn cache_config(dir: &Path, threshold: u64, max_dim: u32, width: u32) -> ThumbnailsConfig {
        ThumbnailsConfig {
            dir: dir.to_string_lossy().into_owned(),
            url_prefix: "assets/thumbnails/".into(),
            size_threshold_bytes: threshold,
            max_dimension: max_dim,
            width,
        }
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        img.save(path).unwrap();
    }

    fn cache(tmp: &TempDir, threshold: u64, max_dim: u32, width: u32) -> ThumbnailCache {
        let c = ThumbnailCache::new(&cache_config(
            &tmp.path().join("thumbs"),
            threshold,
            max_dim,
            width,
        ));
        c.ensure_dir().unwrap();
        c
    }

    #[test]
    fn small_image_needs_no_thumbnail() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp, 1_000_000, 4096, 400);

        let src = tmp.path().join("small.png");
        write_png(&src, 16, 16);
        let checksum = hash_file(&src).unwrap();

        let outcome = cache.resolve(&src, &checksum, 16).unwrap();
        assert_eq!(outcome, ThumbOutcome::NotNeeded);
        assert_eq!(outcome.thumbnail_path(), None);
        assert!(!cache.artifact_path(&checksum).exists());
    }

    #[test]
    fn oversized_dimensions_trigger_generation() {
        let tmp = TempDir::new().unwrap();
        // Anything wider/taller than 8px gets thumbnailed down to width 4
        let cache = cache(&tmp, 1_000_000, 8, 4);

        let src = tmp.path().join("big.png");
        write_png(&src, 16, 12);
        let checksum = hash_file(&src).unwrap();

        let outcome = cache.resolve(&src, &checksum, 16).unwrap();
        let url = outcome.thumbnail_path().unwrap();
        assert!(matches!(outcome, ThumbOutcome::Generated(_)));
        assert_eq!(url, format!("assets/thumbnails/{checksum}.webp"));

        let artifact = cache.artifact_path(&checksum);
        assert!(artifact.exists());
        // Aspect preserved: 16x12 at width 4 → 4x3
        assert_eq!(image::image_dimensions(&artifact).unwrap(), (4, 3));
    }

    #[test]
    fn oversized_bytes_trigger_generation() {
        let tmp = TempDir::new().unwrap();
        // 1-byte threshold: every image is "too big" regardless of dimensions
        let cache = cache(&tmp, 1, 4096, 4);

        let src = tmp.path().join("dense.png");
        write_png(&src, 6, 6);
        let checksum = hash_file(&src).unwrap();
        let size = fs::metadata(&src).unwrap().len();

        let outcome = cache.resolve(&src, &checksum, size).unwrap();
        assert!(matches!(outcome, ThumbOutcome::Generated(_)));
        // Target width larger than the source: no enlargement
        let artifact = cache.artifact_path(&checksum);
        assert_eq!(image::image_dimensions(&artifact).unwrap(), (4, 4));
    }

    #[test]
    fn second_resolve_is_a_cache_hit_without_regeneration() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp, 1, 4096, 4);

        let src = tmp.path().join("img.png");
        write_png(&src, 10, 10);
        let checksum = hash_file(&src).unwrap();

        let first = cache.resolve(&src, &checksum, 100).unwrap();
        assert!(matches!(first, ThumbOutcome::Generated(_)));
        let mtime_before = fs::metadata(cache.artifact_path(&checksum))
            .unwrap()
            .modified()
            .unwrap();

        let second = cache.resolve(&src, &checksum, 100).unwrap();
        assert!(matches!(second, ThumbOutcome::Cached(_)));
        assert_eq!(first.thumbnail_path(), second.thumbnail_path());

        let mtime_after = fs::metadata(cache.artifact_path(&checksum))
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(mtime_before, mtime_after);
    }

    #[test]
    fn identical_content_shares_one_artifact() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp, 1, 4096, 4);

        let a = tmp.path().join("a.png");
        let b = tmp.path().join("renamed-copy.png");
        write_png(&a, 10, 10);
        fs::copy(&a, &b).unwrap();

        let hash_a = hash_file(&a).unwrap();
        let hash_b = hash_file(&b).unwrap();
        assert_eq!(hash_a, hash_b);

        let out_a = cache.resolve(&a, &hash_a, 100).unwrap();
        let out_b = cache.resolve(&b, &hash_b, 100).unwrap();
        assert!(matches!(out_a, ThumbOutcome::Generated(_)));
        assert!(matches!(out_b, ThumbOutcome::Cached(_)));
        assert_eq!(out_a.thumbnail_path(), out_b.thumbnail_path());
    }

    #[test]
    fn corrupt_image_surfaces_an_error() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp, 1, 4096, 4);

        let src = tmp.path().join("broken.png");
        fs::write(&src, b"this is not a png at all").unwrap();
        let checksum = hash_file(&src).unwrap();

        let result = cache.resolve(&src, &checksum, 24);
        assert!(matches!(result, Err(ThumbError::Image(_))));
        assert!(!cache.artifact_path(&checksum).exists());
    }

    #[test]
    fn hash_file_deterministic_and_content_sensitive() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.bin");

        fs::write(&path, b"version 1").unwrap();
        let h1 = hash_file(&path).unwrap();
        assert_eq!(h1, hash_file(&path).unwrap());
        assert_eq!(h1.len(), 64);

        fs::write(&path, b"version 2").unwrap();
        assert_ne!(h1, hash_file(&path).unwrap());
    }

    #[test]
    fn url_prefix_gets_trailing_slash() {
        let tmp = TempDir::new().unwrap();
        let mut config = cache_config(&tmp.path().join("t"), 1, 1, 1);
        config.url_prefix = "thumbs".into();
        let cache = ThumbnailCache::new(&config);
        assert_eq!(cache.artifact_url("abc"), "thumbs/abc.webp");
    }

    #[test]
    fn cache_stats_display() {
        let stats = CacheStats {
            hits: 3,
            generated: 2,
            skipped: 4,
            failed: 0,
        };
        assert_eq!(
            stats.to_string(),
            "3 cached, 2 generated, 4 under threshold (9 images)"
        );

        let with_failures = CacheStats {
            failed: 1,
            ..stats
        };
        assert_eq!(
            with_failures.to_string(),
            "3 cached, 2 generated, 4 under threshold, 1 failed (10 images)"
        );
    }
}
