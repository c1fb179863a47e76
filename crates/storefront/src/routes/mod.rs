//! HTTP route handlers for the storefront server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Code login (mock)
//! POST /api/auth/send-code     - Issue a one-time code for an email
//! POST /api/auth/verify-code   - Check a code for an email
//! ```

pub mod auth;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Create the code login API router.
pub fn auth_api_routes() -> Router<AppState> {
    Router::new()
        .route("/send-code", post(auth::send_code))
        .route("/verify-code", post(auth::verify_code))
}

/// All storefront routes, without rate limiting.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_api_routes())
}

/// All storefront routes, with the auth endpoints behind `limiter`.
pub fn rate_limited_routes(limiter: RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_api_routes().layer(limiter))
}

/// Health check endpoint.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
