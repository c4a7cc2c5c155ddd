//! Indexer configuration module.
//!
//! Handles loading and validating `catalog.toml`. Configuration is sparse:
//! every key is optional and falls back to a stock default, so a missing
//! config file is equivalent to an empty one.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! root = "."                         # Directory to index
//! ignore = [                         # Glob patterns excluded from the scan
//!     "node_modules/**",
//!     ".git/**",
//!     "_site/**",
//! ]
//! manifest_path = "src/index.json"   # Where the manifest is written
//!
//! [thumbnails]
//! dir = "src/assets/thumbnails"      # Artifact directory on disk
//! url_prefix = "assets/thumbnails/"  # Prefix used in manifest entries
//! size_threshold_bytes = 1000000     # Thumbnail if file is larger than this
//! max_dimension = 4096               # ...or either pixel dimension exceeds this
//! width = 400                        # Target thumbnail width
//!
//! [processing]
//! max_workers = 4                    # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! The thumbnail `dir` and `url_prefix` differ on purpose: artifacts are
//! written relative to the working directory, but manifest entries must be
//! fetchable from the *served* site root, which may not be the scan root.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Indexer configuration loaded from `catalog.toml`.
///
/// All fields have defaults mirroring the stock scanner behavior. User
/// config files need only specify the values they want to override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Directory to scan. All manifest paths are relative to this root.
    pub root: String,
    /// Glob patterns excluded from enumeration. Supports whole-subtree
    /// exclusion (`node_modules/**`) and exact names (`package.json`).
    pub ignore: Vec<String>,
    /// Destination of the generated manifest.
    pub manifest_path: String,
    /// Thumbnail cache settings.
    pub thumbnails: ThumbnailsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            ignore: default_ignore(),
            manifest_path: "src/index.json".to_string(),
            thumbnails: ThumbnailsConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

fn default_ignore() -> Vec<String> {
    [
        "node_modules/**",
        ".git/**",
        "_site/**",
        ".github/**",
        "scripts/**",
        "src/**",
        "package.json",
        "package-lock.json",
        ".gitignore",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl IndexConfig {
    /// Load from a TOML file, falling back to defaults when the file does
    /// not exist. Parse errors and unknown keys are reported, not ignored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_path.is_empty() {
            return Err(ConfigError::Validation(
                "manifest_path must not be empty".into(),
            ));
        }
        if self.thumbnails.width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width must be non-zero".into(),
            ));
        }
        if self.thumbnails.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_dimension must be non-zero".into(),
            ));
        }
        if self.thumbnails.dir.is_empty() {
            return Err(ConfigError::Validation(
                "thumbnails.dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Thumbnail cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Directory where derived artifacts are written.
    pub dir: String,
    /// Prefix prepended to artifact names in manifest entries. Relative to
    /// the served site root, so the browser can fetch it directly.
    pub url_prefix: String,
    /// Images larger than this many bytes get a thumbnail.
    pub size_threshold_bytes: u64,
    /// Images wider or taller than this get a thumbnail.
    pub max_dimension: u32,
    /// Target thumbnail width; height follows the source aspect ratio.
    pub width: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            dir: "src/assets/thumbnails".to_string(),
            url_prefix: "assets/thumbnails/".to_string(),
            size_threshold_bytes: 1_000_000,
            max_dimension: 4096,
            width: 400,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

/// A documented stock `catalog.toml` with every option at its default,
/// printed by the `gen-config` command.
pub fn stock_config_toml() -> String {
    let defaults = IndexConfig::default();
    let ignore_lines: String = defaults
        .ignore
        .iter()
        .map(|p| format!("    \"{p}\",\n"))
        .collect();
    format!(
        r#"# file-atlas configuration. All options shown at their defaults;
# delete anything you don't want to override.

# Directory to index. Manifest paths are relative to this root.
root = "{root}"

# Glob patterns excluded from the scan. "dir/**" excludes a whole
# subtree; a bare name excludes an exact file. Dotfiles are always
# excluded.
ignore = [
{ignore_lines}]

# Where the manifest is written. Overwritten atomically on each run.
manifest_path = "{manifest}"

[thumbnails]
# Artifact directory on disk, and the prefix entries use to reference
# artifacts from the served site root.
dir = "{dir}"
url_prefix = "{prefix}"
# An image gets a thumbnail when it is larger than this many bytes, or
# when either pixel dimension exceeds max_dimension. Smaller images are
# served directly.
size_threshold_bytes = {threshold}
max_dimension = {max_dim}
# Target thumbnail width; height preserves the source aspect ratio.
width = {width}

[processing]
# Maximum parallel workers. Omit for auto (all CPU cores).
# max_workers = 4
"#,
        root = defaults.root,
        manifest = defaults.manifest_path,
        dir = defaults.thumbnails.dir,
        prefix = defaults.thumbnails.url_prefix,
        threshold = defaults.thumbnails.size_threshold_bytes,
        max_dim = defaults.thumbnails.max_dimension,
        width = defaults.thumbnails.width,
    )
}
