//! Category API endpoints
//!
//! - GET /api/v1/categories - Categories sorted by title with post counts

use axum::{extract::State, routing::get, Json, Router};

use crate::api::error::ApiError;
use crate::api::responses::ListResponse;
use crate::api::state::AppState;
use crate::models::CategoryWithCount;

/// Build the categories router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}

/// GET /api/v1/categories
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<CategoryWithCount>>, ApiError> {
    let listing = state
        .category_service
        .list()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch categories", e))?;

    Ok(Json(ListResponse::with_total(listing.categories, listing.total)))
}
