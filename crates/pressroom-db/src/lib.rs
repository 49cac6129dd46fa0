//! Database layer for the pressroom platform.
//!
//! Provides PostgreSQL connection handling, the version-controlled migration
//! ledger, the migration runner, and the post/comment queries the server and
//! CLI are built on. Every table in pressroom is created through ledger
//! entries applied by this crate's runner.
//!
//! # Design decisions
//!
//! - **On-disk ledger**: migration scripts live in a `migrations/` directory
//!   committed to version control, one subdirectory per entry. The ledger is
//!   deployment data, applied by CI through the CLI, not compiled into the
//!   server binary.
//! - **Checksummed, append-only history**: the runner records a SHA-256
//!   checksum per applied entry and refuses to proceed when an applied script
//!   changed, when the ledger lost an applied entry, or when a pending entry
//!   sorts before an applied one. Drift stops the run; nothing is ever
//!   silently re-applied.
//! - **Transaction per entry**: each entry's DDL commits atomically with its
//!   tracking row, so a failed or interrupted run leaves no half-applied
//!   entry behind.
//! - **Advisory lock**: concurrent runner invocations against the same
//!   database serialize on a session-scoped `pg_advisory_lock`.

mod connect;
mod ledger;
mod plan;
mod queries;
mod runner;
mod seed;

pub use connect::{ConnectError, Db};
pub use ledger::{checksum, load_ledger, LedgerEntry, LedgerError, SCRIPT_FILE};
pub use plan::{plan, AppliedMigration, PlanError};
pub use queries::{
    count_posts, delete_all_posts, insert_comment, insert_post, list_comments_for_post,
    list_posts, post_exists, NewComment, NewPost, StoreError,
};
pub use runner::{deploy, status, EntryState, MigrateError, MigrationStatus, TRACKING_TABLE};
pub use seed::{seed_posts, SEED_POST_COUNT};
