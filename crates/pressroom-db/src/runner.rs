//! The migration runner.
//!
//! Applies pending ledger entries to a PostgreSQL database, tracked by the
//! `_pressroom_migrations` table. Each entry runs inside its own transaction
//! together with its tracking row, so an entry either lands completely or not
//! at all (PostgreSQL DDL is transactional). A killed process loses at most
//! the in-flight entry's transaction.
//!
//! The runner takes a session-scoped advisory lock before reading any state,
//! so two invocations racing on the same database serialize instead of
//! interleaving. The lock is released when the session ends.

use crate::connect::Db;
use crate::ledger::{load_ledger, LedgerError};
use crate::plan::{plan, AppliedMigration, PlanError};
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

/// Name of the applied-migrations tracking table.
///
/// Created by the runner on first use; the runner is its only writer.
pub const TRACKING_TABLE: &str = "_pressroom_migrations";

/// Advisory lock key for migration runs (ASCII "pres").
const ADVISORY_LOCK_KEY: i64 = 0x7072_6573;

/// Errors that can occur during a migration run.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The ledger could not be loaded from disk.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The ledger and the applied record disagree about history.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Failed to query or bootstrap migration state.
    #[error("failed to read migration state: {0}")]
    StateQuery(tokio_postgres::Error),

    /// A statement within an entry failed; the entry was rolled back.
    #[error("migration '{name}' failed: {source}")]
    EntryFailed {
        /// The name of the entry that failed.
        name: String,
        /// The underlying database error.
        source: tokio_postgres::Error,
    },
}

/// Apply state of one ledger entry, as reported by [`status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Recorded in the tracking table.
    Applied {
        /// When the entry was applied.
        applied_at: DateTime<Utc>,
    },
    /// Not yet applied to this database.
    Pending,
}

/// One line of the [`status`] report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Entry identifier.
    pub name: String,
    /// Whether the entry has been applied.
    pub state: EntryState,
}

/// Applies all pending ledger entries from `ledger_dir`, in order.
///
/// Entries are applied oldest-first, one transaction per entry. The first
/// failing entry is rolled back and reported; no later entries are attempted,
/// and already-committed entries stay committed. Re-invoke after fixing the
/// failing script. Invariant violations ([`PlanError`]) abort before any DDL
/// runs.
///
/// Returns the number of entries applied; zero means the database was
/// already converged.
///
/// # Errors
///
/// Returns [`MigrateError`] on ledger, invariant, or execution failure.
pub async fn deploy(db: &mut Db, ledger_dir: &Path) -> Result<usize, MigrateError> {
    let ledger = load_ledger(ledger_dir)?;

    acquire_lock(db).await?;
    ensure_tracking_table(db).await?;
    let applied = fetch_applied(db).await?;
    let pending = plan(&ledger, &applied)?;

    if pending.is_empty() {
        tracing::info!("no pending migrations");
        return Ok(0);
    }

    let mut count = 0;
    for entry in pending {
        tracing::info!(migration = entry.name.as_str(), "applying migration");

        let tx = db
            .client_mut()
            .transaction()
            .await
            .map_err(|e| MigrateError::EntryFailed {
                name: entry.name.clone(),
                source: e,
            })?;

        tx.batch_execute(&entry.sql)
            .await
            .map_err(|e| MigrateError::EntryFailed {
                name: entry.name.clone(),
                source: e,
            })?;

        tx.execute(
            "INSERT INTO _pressroom_migrations (name, checksum) VALUES ($1, $2)",
            &[&entry.name, &entry.checksum],
        )
        .await
        .map_err(|e| MigrateError::EntryFailed {
            name: entry.name.clone(),
            source: e,
        })?;

        tx.commit().await.map_err(|e| MigrateError::EntryFailed {
            name: entry.name.clone(),
            source: e,
        })?;

        count += 1;
    }

    tracing::info!(count, "applied migrations");
    Ok(count)
}

/// Reports the apply state of every ledger entry without writing anything.
///
/// Pending entries are not an error here (status is a report, not an
/// enforcement point), but the same invariant checks as [`deploy`] run, so
/// checksum drift or a history gap still fails.
///
/// # Errors
///
/// Returns [`MigrateError`] on ledger, invariant, or query failure.
pub async fn status(db: &Db, ledger_dir: &Path) -> Result<Vec<MigrationStatus>, MigrateError> {
    let ledger = load_ledger(ledger_dir)?;

    let applied = if tracking_table_exists(db).await? {
        fetch_applied(db).await?
    } else {
        Vec::new()
    };

    // Invariant check only; the report below covers every entry.
    plan(&ledger, &applied)?;

    let mut report = Vec::with_capacity(ledger.len());
    for entry in &ledger {
        let state = applied
            .iter()
            .find(|r| r.name == entry.name)
            .map(|r| EntryState::Applied {
                applied_at: r.applied_at,
            })
            .unwrap_or(EntryState::Pending);
        report.push(MigrationStatus {
            name: entry.name.clone(),
            state,
        });
    }
    Ok(report)
}

/// Takes the session-scoped advisory lock, blocking until it is free.
async fn acquire_lock(db: &Db) -> Result<(), MigrateError> {
    db.client()
        .batch_execute(&format!("SELECT pg_advisory_lock({ADVISORY_LOCK_KEY})"))
        .await
        .map_err(MigrateError::StateQuery)
}

/// Creates the tracking table if this database has never been migrated.
async fn ensure_tracking_table(db: &Db) -> Result<(), MigrateError> {
    db.client()
        .batch_execute(
            "CREATE TABLE IF NOT EXISTS _pressroom_migrations (
                name TEXT PRIMARY KEY,
                checksum TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .await
        .map_err(MigrateError::StateQuery)
}

/// True if the tracking table is visible on the current search path.
async fn tracking_table_exists(db: &Db) -> Result<bool, MigrateError> {
    let row = db
        .client()
        .query_one(
            "SELECT to_regclass($1) IS NOT NULL",
            &[&TRACKING_TABLE],
        )
        .await
        .map_err(MigrateError::StateQuery)?;
    row.try_get(0).map_err(MigrateError::StateQuery)
}

/// Reads the applied-migrations record, ordered by entry name.
async fn fetch_applied(db: &Db) -> Result<Vec<AppliedMigration>, MigrateError> {
    let rows = db
        .client()
        .query(
            "SELECT name, checksum, applied_at FROM _pressroom_migrations ORDER BY name ASC",
            &[],
        )
        .await
        .map_err(MigrateError::StateQuery)?;

    let mut applied = Vec::with_capacity(rows.len());
    for row in &rows {
        applied.push(AppliedMigration {
            name: row.try_get(0).map_err(MigrateError::StateQuery)?,
            checksum: row.try_get(1).map_err(MigrateError::StateQuery)?,
            applied_at: row.try_get(2).map_err(MigrateError::StateQuery)?,
        });
    }
    Ok(applied)
}
