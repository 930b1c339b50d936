//! API layer - HTTP handlers and routing
//!
//! Public, read-only JSON endpoints under `/api/v1`, plus the contact form
//! endpoint and a health check under `/api`.

pub mod categories;
pub mod common;
pub mod contact;
pub mod error;
pub mod globals;
pub mod health;
pub mod posts;
pub mod responses;
pub mod state;

use anyhow::{anyhow, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;
pub use state::AppState;

/// Build the `/api/v1` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/posts", posts::router())
        .nest("/globals", globals::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| anyhow!("Invalid CORS origin {:?}: {}", cors_origin, e))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .nest("/api/v1", build_api_router())
        .nest("/api/contact", contact::router())
        .route("/api/health", get(health::health))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
