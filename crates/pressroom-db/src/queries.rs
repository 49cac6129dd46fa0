//! Post and comment queries.

use crate::connect::Db;
use chrono::{DateTime, Utc};
use pressroom_types::{Comment, Post};
use thiserror::Error;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;

/// Errors that can occur during post/comment operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] tokio_postgres::Error),
    #[error("post not found: {0}")]
    PostNotFound(i64),
}

/// Parameters for creating a new post.
///
/// `content` and `created_at` may be omitted; the database fills in NULL and
/// `now()` respectively.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters for creating a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub content: String,
}

fn map_row_to_post(row: &Row) -> Result<Post, tokio_postgres::Error> {
    Ok(Post {
        id: row.try_get(0)?,
        title: row.try_get(1)?,
        content: row.try_get(2)?,
        published: row.try_get(3)?,
        created_at: row.try_get(4)?,
    })
}

fn map_row_to_comment(row: &Row) -> Result<Comment, tokio_postgres::Error> {
    Ok(Comment {
        id: row.try_get(0)?,
        post_id: row.try_get(1)?,
        content: row.try_get(2)?,
        created_at: row.try_get(3)?,
    })
}

/// Lists all posts, newest first. Ties on `created_at` break by ID so the
/// order is stable.
pub async fn list_posts(db: &Db) -> Result<Vec<Post>, StoreError> {
    let rows = db
        .client()
        .query(
            "SELECT id, title, content, published, created_at
             FROM posts ORDER BY created_at DESC, id DESC",
            &[],
        )
        .await?;

    let mut posts = Vec::with_capacity(rows.len());
    for row in &rows {
        posts.push(map_row_to_post(row)?);
    }
    Ok(posts)
}

/// Returns the number of posts.
pub async fn count_posts(db: &Db) -> Result<i64, StoreError> {
    let row = db
        .client()
        .query_one("SELECT COUNT(*) FROM posts", &[])
        .await?;
    Ok(row.try_get(0)?)
}

/// Inserts a post and returns it as stored (with database-assigned ID and
/// timestamp).
pub async fn insert_post(db: &Db, params: &NewPost) -> Result<Post, StoreError> {
    let row = db
        .client()
        .query_one(
            "INSERT INTO posts (title, content, published, created_at)
             VALUES ($1, $2, $3, COALESCE($4, now()))
             RETURNING id, title, content, published, created_at",
            &[
                &params.title,
                &params.content,
                &params.published,
                &params.created_at,
            ],
        )
        .await?;
    Ok(map_row_to_post(&row)?)
}

/// Deletes every comment and post, in that order: the restrict-on-delete
/// foreign key forbids removing a post that still has comments. Runs in one
/// transaction; returns the number of posts deleted.
pub async fn delete_all_posts(db: &mut Db) -> Result<u64, StoreError> {
    let tx = db.client_mut().transaction().await?;
    tx.execute("DELETE FROM comments", &[]).await?;
    let deleted = tx.execute("DELETE FROM posts", &[]).await?;
    tx.commit().await?;
    Ok(deleted)
}

/// True if a post with this ID exists.
pub async fn post_exists(db: &Db, post_id: i64) -> Result<bool, StoreError> {
    let row = db
        .client()
        .query_one("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)", &[&post_id])
        .await?;
    Ok(row.try_get(0)?)
}

/// Lists the comments on a post, oldest first.
///
/// Returns [`StoreError::PostNotFound`] if the post does not exist, so
/// callers can distinguish "no comments" from "no such post".
pub async fn list_comments_for_post(db: &Db, post_id: i64) -> Result<Vec<Comment>, StoreError> {
    if !post_exists(db, post_id).await? {
        return Err(StoreError::PostNotFound(post_id));
    }

    let rows = db
        .client()
        .query(
            "SELECT id, post_id, content, created_at
             FROM comments WHERE post_id = $1 ORDER BY created_at ASC, id ASC",
            &[&post_id],
        )
        .await?;

    let mut comments = Vec::with_capacity(rows.len());
    for row in &rows {
        comments.push(map_row_to_comment(row)?);
    }
    Ok(comments)
}

/// Inserts a comment and returns it as stored.
///
/// A foreign-key violation maps to [`StoreError::PostNotFound`].
pub async fn insert_comment(db: &Db, params: &NewComment) -> Result<Comment, StoreError> {
    let row = db
        .client()
        .query_one(
            "INSERT INTO comments (post_id, content)
             VALUES ($1, $2)
             RETURNING id, post_id, content, created_at",
            &[&params.post_id, &params.content],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
                StoreError::PostNotFound(params.post_id)
            } else {
                StoreError::Db(e)
            }
        })?;
    Ok(map_row_to_comment(&row)?)
}
