//! Seed command implementation.

use anyhow::Result;
use pressroom_db::seed_posts;

use crate::cli::GlobalArgs;

/// Execute the seed command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let mut db = super::connect(global).await?;
    let inserted = seed_posts(&mut db).await?;
    println!("Seeded {inserted} posts.");
    Ok(())
}
