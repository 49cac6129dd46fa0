//! Pending-migration computation.
//!
//! Pure comparison of the on-disk ledger against the applied-migrations
//! record read from the database. All invariant checks live here, with no
//! I/O, so every refusal path is unit-testable: the runner only executes what
//! this module has already validated.

use crate::ledger::LedgerEntry;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// One row of the applied-migrations record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    /// Entry identifier, matching [`LedgerEntry::name`].
    pub name: String,
    /// Checksum of the script as it was when applied.
    pub checksum: String,
    /// When the entry was applied.
    pub applied_at: DateTime<Utc>,
}

/// Invariant violations between the ledger and the applied record.
///
/// Any of these means the database and the ledger disagree about history.
/// The runner refuses to apply anything until a human resolves the drift.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The database records an entry the ledger no longer contains.
    #[error("migration '{name}' is recorded as applied but missing from the ledger")]
    UnknownApplied {
        /// The recorded entry name.
        name: String,
    },

    /// An applied entry's script was edited after it was applied.
    #[error(
        "migration '{name}' was modified after being applied \
         (recorded checksum {recorded}, ledger checksum {actual})"
    )]
    ChecksumMismatch {
        /// The entry name.
        name: String,
        /// Checksum stored in the applied record.
        recorded: String,
        /// Checksum of the script currently in the ledger.
        actual: String,
    },

    /// A pending entry sorts before an entry that is already applied, so
    /// applying it now would run history out of order.
    #[error(
        "migration '{missing}' is pending but '{applied}', which sorts after it, \
         is already applied"
    )]
    HistoryGap {
        /// The earliest pending entry inside the gap.
        missing: String,
        /// The applied entry that proves the gap.
        applied: String,
    },
}

/// Computes the entries still to be applied, in apply order.
///
/// `ledger` must be sorted ascending by name (as [`crate::load_ledger`]
/// returns it). The applied record must name a contiguous prefix of the
/// ledger with matching checksums; otherwise the corresponding [`PlanError`]
/// is returned and nothing should be executed.
///
/// An empty result means the database has converged: re-running the runner
/// is a no-op.
pub fn plan<'a>(
    ledger: &'a [LedgerEntry],
    applied: &[AppliedMigration],
) -> Result<Vec<&'a LedgerEntry>, PlanError> {
    let by_name: HashMap<&str, &LedgerEntry> =
        ledger.iter().map(|e| (e.name.as_str(), e)).collect();

    for record in applied {
        match by_name.get(record.name.as_str()) {
            None => {
                return Err(PlanError::UnknownApplied {
                    name: record.name.clone(),
                })
            }
            Some(entry) if entry.checksum != record.checksum => {
                return Err(PlanError::ChecksumMismatch {
                    name: record.name.clone(),
                    recorded: record.checksum.clone(),
                    actual: entry.checksum.clone(),
                })
            }
            Some(_) => {}
        }
    }

    let applied_names: std::collections::HashSet<&str> =
        applied.iter().map(|r| r.name.as_str()).collect();

    let mut pending: Vec<&LedgerEntry> = Vec::new();
    for entry in ledger {
        if applied_names.contains(entry.name.as_str()) {
            if let Some(gap) = pending.first() {
                return Err(PlanError::HistoryGap {
                    missing: gap.name.clone(),
                    applied: entry.name.clone(),
                });
            }
        } else {
            pending.push(entry);
        }
    }

    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::checksum;

    fn entry(name: &str, sql: &str) -> LedgerEntry {
        LedgerEntry {
            name: name.to_string(),
            sql: sql.to_string(),
            checksum: checksum(sql),
        }
    }

    fn record(e: &LedgerEntry) -> AppliedMigration {
        AppliedMigration {
            name: e.name.clone(),
            checksum: e.checksum.clone(),
            applied_at: Utc::now(),
        }
    }

    fn sample_ledger() -> Vec<LedgerEntry> {
        vec![
            entry("20250101000000_posts", "CREATE TABLE posts (id INT);"),
            entry("20250102000000_comments", "CREATE TABLE comments (id INT);"),
            entry("20250103000000_index", "CREATE INDEX i ON posts (id);"),
        ]
    }

    #[test]
    fn fresh_database_applies_everything() {
        let ledger = sample_ledger();
        let pending = plan(&ledger, &[]).expect("plan should succeed");
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].name, "20250101000000_posts");
    }

    #[test]
    fn converged_database_plans_nothing() {
        let ledger = sample_ledger();
        let applied: Vec<_> = ledger.iter().map(record).collect();
        let pending = plan(&ledger, &applied).expect("plan should succeed");
        assert!(pending.is_empty());
    }

    #[test]
    fn prefix_applied_plans_the_suffix() {
        let ledger = sample_ledger();
        let applied = vec![record(&ledger[0])];
        let pending = plan(&ledger, &applied).expect("plan should succeed");
        assert_eq!(
            pending.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            ["20250102000000_comments", "20250103000000_index"]
        );
    }

    #[test]
    fn applied_entry_missing_from_ledger_is_rejected() {
        let ledger = sample_ledger();
        let orphan = entry("20240101000000_ancient", "SELECT 1;");
        let err = plan(&ledger, &[record(&orphan)]).expect_err("plan should fail");
        assert!(matches!(err, PlanError::UnknownApplied { name } if name == orphan.name));
    }

    #[test]
    fn edited_applied_entry_is_rejected() {
        let ledger = sample_ledger();
        let mut stale = record(&ledger[0]);
        stale.checksum = checksum("CREATE TABLE posts (id BIGINT);");

        let err = plan(&ledger, &[stale]).expect_err("plan should fail");
        match err {
            PlanError::ChecksumMismatch { name, recorded, actual } => {
                assert_eq!(name, "20250101000000_posts");
                assert_ne!(recorded, actual);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pending_entry_before_an_applied_one_is_rejected() {
        let ledger = sample_ledger();
        // Only the middle entry is applied; the first is pending.
        let applied = vec![record(&ledger[1])];

        let err = plan(&ledger, &applied).expect_err("plan should fail");
        match err {
            PlanError::HistoryGap { missing, applied } => {
                assert_eq!(missing, "20250101000000_posts");
                assert_eq!(applied, "20250102000000_comments");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn gap_in_the_middle_is_rejected() {
        let ledger = sample_ledger();
        let applied = vec![record(&ledger[0]), record(&ledger[2])];

        let err = plan(&ledger, &applied).expect_err("plan should fail");
        match err {
            PlanError::HistoryGap { missing, applied } => {
                assert_eq!(missing, "20250102000000_comments");
                assert_eq!(applied, "20250103000000_index");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
