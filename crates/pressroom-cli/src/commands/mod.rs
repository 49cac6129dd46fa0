//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use crate::cli::GlobalArgs;
use anyhow::{bail, Context, Result};
use pressroom_db::Db;

/// Resolves the database connection URL: the `--database-url` flag (which
/// clap also fills from `PRESSROOM_DIRECT_DATABASE_URL`), then the plain
/// `DATABASE_URL` environment variable. The value is treated as a secret and
/// never printed.
fn resolve_database_url(global: &GlobalArgs) -> Result<String> {
    if let Some(url) = &global.database_url {
        if !url.is_empty() {
            return Ok(url.clone());
        }
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        if !url.is_empty() {
            return Ok(url);
        }
    }
    bail!(
        "no database URL configured: pass --database-url or set \
         PRESSROOM_DIRECT_DATABASE_URL / DATABASE_URL"
    )
}

/// Connects to the configured database.
pub(crate) async fn connect(global: &GlobalArgs) -> Result<Db> {
    let url = resolve_database_url(global)?;
    Db::connect(&url)
        .await
        .context("failed to connect to database")
}
