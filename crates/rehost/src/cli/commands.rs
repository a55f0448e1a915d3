//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Rehost - mirror vendor-hosted images and rewrite JSONL records to point at them
#[derive(Parser, Debug)]
#[command(name = "rehost")]
#[command(about = "Mirror vendor-hosted images into durable object storage", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra configuration file, layered above ./rehost.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite vendor photo URLs in a JSONL file to mirrored URLs
    Photos {
        #[command(flatten)]
        run: RunArgs,

        /// Append to --out, skipping the input records it already holds
        #[arg(long)]
        resume: bool,
    },

    /// Retry photos a previous run left on the vendor or with an error
    Repair {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Mirror a single URL and print where it went
    CacheOne {
        /// Vendor image URL
        url: String,

        /// Entity the image belongs to
        entity_id: String,

        /// Vendor media id, if known
        media_id: Option<String>,

        /// Keep mappings in memory instead of Postgres
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply pending database migrations
    Migrate,
}

/// Options shared by `photos` and `repair`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Input JSONL file
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Output JSONL file
    #[arg(long = "out", value_name = "PATH")]
    pub output: PathBuf,

    /// Records to process (0 = all)
    #[arg(long, default_value = "0")]
    pub limit: usize,

    /// In-flight resolutions (defaults to the [batch] config)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Log counters every N records, 0 to disable (defaults to the [batch] config)
    #[arg(long)]
    pub progress_every: Option<usize>,

    /// Keep mappings in memory instead of Postgres
    #[arg(long)]
    pub dry_run: bool,
}
