//! Globals API endpoints
//!
//! - GET /api/v1/globals/header - Header logo and navigation tree

use axum::{extract::State, routing::get, Json, Router};

use crate::api::error::ApiError;
use crate::api::responses::DataResponse;
use crate::api::state::AppState;
use crate::models::HeaderGlobal;

pub fn router() -> Router<AppState> {
    Router::new().route("/header", get(header))
}

async fn header(State(state): State<AppState>) -> Result<Json<DataResponse<HeaderGlobal>>, ApiError> {
    let header = state
        .nav_service
        .header()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch header", e))?;
    Ok(Json(DataResponse::new(header)))
}
