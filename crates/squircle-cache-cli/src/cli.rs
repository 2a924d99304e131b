use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use squircle_cache::CacheConfig;

use crate::commands::{run_clear, run_decode, run_delete, run_inspect, run_list};
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "squircle-cache",
    about = "Inspect, decode, and clear Squircle editor document caches",
    version
)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Cache directory (overrides config and SQUIRCLE_CACHE_DIR).
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Registry JSON file (overrides config and SQUIRCLE_REGISTRY).
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a document's cache state and decoded stacks.
    Inspect {
        /// Document identifier.
        id: String,
    },

    /// Decode a raw undo/redo blob file.
    Decode {
        file: PathBuf,
    },

    /// Delete one document's blobs and registry entry.
    Delete {
        id: String,
    },

    /// Delete everything under the cache directory.
    Clear,

    /// List registered documents.
    List,
}

impl Cli {
    /// Resolve configuration: file, then environment, then flags.
    pub fn resolve_config(&self) -> Result<CacheConfig> {
        let base = match &self.config {
            Some(path) => CacheConfig::from_toml_file(path)?,
            None => CacheConfig::default(),
        };
        let mut config = base.with_env_overrides();
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(path) = &self.registry {
            config.registry_path = path.clone();
        }
        tracing::debug!(
            cache_dir = %config.cache_dir.display(),
            registry = %config.registry_path.display(),
            "resolved config"
        );
        Ok(config.validated()?)
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    // `decode` works on a bare file and needs no config.
    let config = || cli.resolve_config();
    match &cli.command {
        Commands::Inspect { id } => run_inspect(&config()?, id, out),
        Commands::Decode { file } => run_decode(file, out),
        Commands::Delete { id } => run_delete(&config()?, id, out),
        Commands::Clear => run_clear(&config()?, out),
        Commands::List => run_list(&config()?, out),
    }
}
