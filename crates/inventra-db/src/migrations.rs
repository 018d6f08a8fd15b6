//! # Database Migrations
//!
//! Embedded SQL migrations for Inventra.
//!
//! ## How Migrations Work
//! ```text
//! Startup
//!    │
//!    ▼
//! Check _sqlx_migrations table (create if missing)
//!    │
//!    ▼
//! Compare embedded migrations vs applied
//!    │
//!    ├── 001_initial_schema.sql ✓ (already applied)
//!    └── 002_....sql            ⬜ (pending)
//!    │
//!    ▼
//! Run pending migrations in filename order, record each one
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` (or `migrations/sequence/`
//!    for the counter store) with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
///
/// The schema holds products, orders and order items.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Embedded migrations for the sequence store, a separate database file
/// holding the named `sequences` counters.
static SEQUENCE_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sequence");

/// Runs all pending database migrations.
///
/// Idempotent; each migration runs in its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Runs pending migrations against the sequence store.
pub async fn run_sequence_migrations(pool: &SqlitePool) -> DbResult<()> {
    SEQUENCE_MIGRATOR.run(pool).await?;
    info!("Sequence store migrations applied");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)`.
///
/// For diagnostics and health checks.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((total, applied as usize))
}
