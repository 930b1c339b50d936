//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
}

/// GET /api/health - pings the database
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state
        .pool
        .ping()
        .await
        .map_err(|e| ApiError::internal("Database unavailable", e))?;
    Ok(Json(HealthResponse {
        success: true,
        status: "ok",
    }))
}
