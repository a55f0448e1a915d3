//! Rehost CLI binary.
//!
//! This binary provides command-line access to the media cache:
//! - Rewrite vendor photo URLs in a JSONL export (`photos`)
//! - Retry failures and mark vanished images (`repair`)
//! - Mirror a single URL (`cache-one`)
//! - Apply database migrations (`migrate`)

use clap::Parser;
use rehost::RehostConfig;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, cache_one, migrate, run_photos, run_repair};

    // Parse command-line arguments
    let cli = Cli::parse();

    // Local secrets first, then the shared .env; neither overrides the shell
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = RehostConfig::load(cli.config.as_deref())?;

    // Execute the requested command
    match cli.command {
        Commands::Photos { run, resume } => {
            run_photos(&config, run, resume).await?;
        }

        Commands::Repair { run } => {
            run_repair(&config, run).await?;
        }

        Commands::CacheOne {
            url,
            entity_id,
            media_id,
            dry_run,
        } => {
            cache_one(&config, &url, &entity_id, media_id.as_deref(), dry_run).await?;
        }

        Commands::Migrate => {
            migrate(&config).await?;
        }
    }

    Ok(())
}
