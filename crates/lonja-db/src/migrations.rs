//! Embedded schema migrations.
//!
//! SQL files under `migrations/sqlite/` are compiled into the binary by
//! `sqlx::migrate!`, so a fresh dashboard install needs nothing besides
//! the executable. Applied migrations are tracked in the
//! `_sqlx_migrations` bookkeeping table and never run twice.
//!
//! Conventions for new files:
//! - next sequence number, `NNN_description.sql` (e.g. `002_add_vendor_notes.sql`)
//! - idempotent SQL (`IF NOT EXISTS`), since dev databases get recreated a lot
//! - never edit a migration that has shipped, add a new one instead

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Brings the schema up to date, applying any embedded migrations that
/// have not run against this database yet.
///
/// Each migration runs inside its own transaction, so a failure leaves
/// the schema at the last fully-applied step.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(
        embedded = MIGRATOR.migrations.len(),
        "Checking for pending migrations"
    );

    MIGRATOR.run(pool).await?;

    let (embedded, applied) = migration_status(pool).await?;
    info!(applied, embedded, "Schema is up to date");
    Ok(())
}

/// Reports `(embedded, applied)` migration counts for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    // The bookkeeping table only exists once a migration has run.
    let applied = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((embedded, applied as usize))
}
