//! Route definitions for the Revlens web server

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Repository management
        .route(
            "/repositories",
            get(handlers::list_repositories).post(handlers::create_repository),
        )
        .route(
            "/repositories/{id}",
            get(handlers::get_repository).delete(handlers::delete_repository),
        )
        // Review lifecycle
        .route(
            "/review",
            get(handlers::list_reviews).post(handlers::create_review),
        )
        .route("/review/{id}", get(handlers::get_review))
        .route(
            "/review/{id}/report",
            post(handlers::generate_report).get(handlers::get_report),
        )
}
