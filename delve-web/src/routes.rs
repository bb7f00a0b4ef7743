//! Route definitions for the Delve web server

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
        // Research
        .route("/research", post(handlers::research))
        .route("/capabilities", get(handlers::capabilities))
        // Documentation
        .route("/openapi.json", get(handlers::openapi_json))
}
