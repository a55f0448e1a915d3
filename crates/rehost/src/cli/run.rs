//! Command handlers.

use super::RunArgs;
use rehost::{
    BatchOptions, BatchRehoster, Credentials, RehostConfig, RehostResult, RepairOptions,
    Repairer, ResolveOutcome, build_cache, database_url_from_env,
};
use rehost_database::{establish_pool, run_migrations};
use tracing::info;

/// Run the batch rehost pass.
pub async fn run_photos(config: &RehostConfig, run: RunArgs, resume: bool) -> RehostResult<()> {
    let credentials = Credentials::from_env(config, run.dry_run)?;
    let cache = build_cache(config, &credentials)?;

    let options = BatchOptions {
        input: run.input,
        output: run.output,
        limit: run.limit,
        concurrency: run.concurrency.unwrap_or(config.batch.concurrency),
        resume,
        progress_every: run.progress_every.unwrap_or(config.batch.progress_every),
    };

    let summary = BatchRehoster::from_config(cache, config)
        .run(&options)
        .await?;

    println!("done");
    println!("{}", summary);
    Ok(())
}

/// Run the repair pass.
pub async fn run_repair(config: &RehostConfig, run: RunArgs) -> RehostResult<()> {
    let credentials = Credentials::from_env(config, run.dry_run)?;
    let cache = build_cache(config, &credentials)?;

    let options = RepairOptions {
        input: run.input,
        output: run.output,
        limit: run.limit,
        concurrency: run.concurrency.unwrap_or(config.batch.repair_concurrency),
        progress_every: run.progress_every.unwrap_or(config.batch.progress_every),
    };

    let summary = Repairer::from_config(cache, config).run(&options).await?;

    println!("done");
    println!("{}", summary);
    Ok(())
}

/// Mirror one URL and print the result.
pub async fn cache_one(
    config: &RehostConfig,
    url: &str,
    entity_id: &str,
    media_id: Option<&str>,
    dry_run: bool,
) -> RehostResult<()> {
    let credentials = Credentials::from_env(config, dry_run)?;
    let cache = build_cache(config, &credentials)?;

    let resolution = cache.resolve_detailed(url, entity_id, media_id).await?;

    println!("{}", resolution.public_url);
    match resolution.outcome {
        ResolveOutcome::CacheHit { sha256 } => {
            println!("cached: {}", resolution.canonical_url);
            println!("sha256: {}", sha256);
        }
        ResolveOutcome::Mirrored { sha256, path } => {
            println!("mirrored: {} -> {}", resolution.canonical_url, path);
            println!("sha256: {}", sha256);
        }
    }
    Ok(())
}

/// Apply embedded migrations to `DATABASE_URL`.
pub async fn migrate(config: &RehostConfig) -> RehostResult<()> {
    let database_url = database_url_from_env()?;
    let pool = establish_pool(&database_url, config.database.pool_size)?;

    let applied = run_migrations(&pool).await?;
    if applied.is_empty() {
        println!("No pending migrations");
    }
    for name in applied {
        info!(migration = %name, "Applied");
        println!("applied: {}", name);
    }
    Ok(())
}
