use clap::{Parser, Subcommand};
use file_atlas::{config, scan};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "file-atlas")]
#[command(about = "Index a directory tree into a browsable JSON catalog")]
#[command(long_about = "\
Index a directory tree into a browsable JSON catalog

Walks the configured root once and writes a single manifest describing
every file and implied folder, so a static catalog site can filter,
search, and preview without re-touching the filesystem.

Each entry carries a stable id, a simplified type (folder, image,
notebook, pdf, text, other), stat metadata, and — for images — a content
hash. Images over the configured size or dimension thresholds get a WebP
thumbnail named by that hash, generated at most once per distinct
content and reused across scans, renames, and moves.

Run 'file-atlas gen-config' to generate a documented catalog.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "catalog.toml", global = true)]
    config: PathBuf,

    /// Override the configured scan root
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the tree and write the manifest and any needed thumbnails
    Scan,
    /// Enumerate and classify without writing anything
    Check,
    /// Print a stock catalog.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut cfg = config::IndexConfig::load(&cli.config)?;
    if let Some(root) = &cli.root {
        cfg.root = root.to_string_lossy().into_owned();
    }

    match cli.command {
        Command::Scan => {
            init_worker_pool(&cfg.processing);
            let summary = scan::scan(&cfg)?;
            println!("{summary}");
        }
        Command::Check => {
            println!("==> Checking {}", cfg.root);
            let summary = scan::check(&cfg)?;
            println!("{summary}");
            println!("==> Tree is scannable");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon worker pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_worker_pool(processing: &config::ProcessingConfig) {
    let workers = config::effective_workers(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .ok();
}
