//! Deterministic development seeding.

use crate::connect::Db;
use crate::queries::StoreError;
use chrono::{Duration, Utc};

/// Number of posts the seeder leaves in the database.
pub const SEED_POST_COUNT: i64 = 10;

/// Resets the posts table to a fixed development dataset.
///
/// Deletes every comment and post, then inserts [`SEED_POST_COUNT`] published
/// posts titled `Post 1` through `Post 10`, with creation timestamps
/// backdated one day apart so the newest-first read order matches the title
/// order reversed. Delete-then-insert in a single transaction: running the
/// seeder twice leaves exactly [`SEED_POST_COUNT`] rows, not twenty.
///
/// # Errors
///
/// Returns [`StoreError`] if any statement fails; the transaction rolls back
/// and the previous contents survive.
pub async fn seed_posts(db: &mut Db) -> Result<usize, StoreError> {
    let tx = db.client_mut().transaction().await?;

    tx.execute("DELETE FROM comments", &[]).await?;
    let deleted = tx.execute("DELETE FROM posts", &[]).await?;

    let base = Utc::now() - Duration::days(SEED_POST_COUNT);
    for i in 0..SEED_POST_COUNT {
        let title = format!("Post {}", i + 1);
        let content = format!("Sample content for post number {}.", i + 1);
        let created_at = base + Duration::days(i);

        tx.execute(
            "INSERT INTO posts (title, content, published, created_at)
             VALUES ($1, $2, TRUE, $3)",
            &[&title, &content, &created_at],
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        deleted,
        inserted = SEED_POST_COUNT,
        "reseeded posts table"
    );
    Ok(SEED_POST_COUNT as usize)
}
