//! Migrate command implementation.
//!
//! `deploy` is the entry point CI invokes: it applies pending ledger entries
//! and exits non-zero on any failure, which fails the CI job. `status` is
//! the read-only report for humans.

use anyhow::Result;
use pressroom_db::{deploy, status, EntryState};
use std::path::Path;

use crate::cli::{GlobalArgs, MigrateArgs, MigrateCommand};

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let mut db = super::connect(global).await?;
    let ledger_dir = Path::new(&global.ledger_dir);

    match args.command {
        MigrateCommand::Deploy => {
            let applied = deploy(&mut db, ledger_dir).await?;
            if applied == 0 {
                println!("Database is up to date; no pending migrations.");
            } else {
                println!("Applied {applied} migration(s).");
            }
        }
        MigrateCommand::Status => {
            let report = status(&db, ledger_dir).await?;
            let mut pending = 0;
            for entry in &report {
                match &entry.state {
                    EntryState::Applied { applied_at } => {
                        println!("applied  {}  {}", entry.name, applied_at.to_rfc3339());
                    }
                    EntryState::Pending => {
                        pending += 1;
                        println!("pending  {}", entry.name);
                    }
                }
            }
            println!(
                "{} entries, {} applied, {} pending",
                report.len(),
                report.len() - pending,
                pending
            );
        }
    }

    Ok(())
}
