//! Connection pool and migrations.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rehost_error::{DatabaseError, DatabaseErrorKind, RehostResult};
use std::time::Duration;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pooled PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Build a connection pool without opening any connection yet.
///
/// Connections are established on first use, so an unreachable database
/// surfaces as per-call errors rather than a startup failure.
///
/// # Errors
///
/// Returns an error if the URL is empty or the pool cannot be configured.
pub fn establish_pool(database_url: &str, pool_size: u32) -> RehostResult<PgPool> {
    if database_url.trim().is_empty() {
        return Err(DatabaseError::new(DatabaseErrorKind::Connection(
            "database URL is empty".to_string(),
        ))
        .into());
    }

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(pool_size.max(1))
        .min_idle(Some(0))
        .connection_timeout(Duration::from_secs(10))
        .build_unchecked(manager);

    tracing::debug!(pool_size, "Created database connection pool");
    Ok(pool)
}

/// Apply pending embedded migrations. Returns the versions that ran.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> RehostResult<Vec<String>> {
    let pool = pool.clone();

    tokio::task::spawn_blocking(move || -> RehostResult<Vec<String>> {
        let mut conn = pool.get().map_err(DatabaseError::from)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
        let versions: Vec<String> = applied.iter().map(ToString::to_string).collect();
        tracing::info!(count = versions.len(), "Applied migrations");
        Ok(versions)
    })
    .await
    .map_err(|e| DatabaseError::new(DatabaseErrorKind::Task(e.to_string())))?
}
