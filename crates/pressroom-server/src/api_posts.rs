//! Read API for posts and comments.

use crate::AppState;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use pressroom_db::{list_comments_for_post, list_posts, StoreError};
use pressroom_types::{Comment, Post};
use std::sync::Arc;

/// Maps a [`StoreError`] to the correct HTTP status code, logging non-404 errors.
///
/// `PostNotFound` → 404, everything else → 500 (with error logged).
fn store_err_to_status(e: StoreError) -> StatusCode {
    match e {
        StoreError::PostNotFound(_) => StatusCode::NOT_FOUND,
        ref err => {
            tracing::error!(error = %err, "post query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// GET /api/posts
///
/// Returns every post, newest first.
pub async fn list_posts_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Post>>, StatusCode> {
    let posts = list_posts(&state.db).await.map_err(store_err_to_status)?;
    Ok(Json(posts))
}

/// GET /api/posts/{id}/comments
///
/// Returns the comments on one post, oldest first; 404 if the post does not
/// exist.
pub async fn list_comments_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, StatusCode> {
    let comments = list_comments_for_post(&state.db, post_id)
        .await
        .map_err(store_err_to_status)?;
    Ok(Json(comments))
}
