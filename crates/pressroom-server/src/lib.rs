//! pressroom server library logic.

pub mod api_posts;
pub mod config;

use axum::{routing::get, Extension, Json, Router};
use pressroom_db::Db;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
///
/// Holds the single database connection for the process, created once at
/// startup and reused for every request; there is no teardown during the
/// process lifetime. The server never applies migrations itself: the ledger
/// is deployed by the CLI under CI control, so a running server cannot race
/// a deploy.
pub struct AppState {
    /// Shared database connection.
    pub db: Db,
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/posts", get(api_posts::list_posts_handler))
        .route(
            "/api/posts/{id}/comments",
            get(api_posts::list_comments_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
