//! Post API endpoints
//!
//! Read-only queries over published posts:
//! - GET /api/v1/posts/latest
//! - GET /api/v1/posts/featured?limit=
//! - GET /api/v1/posts/categories?category=&page=&limit=
//! - GET /api/v1/posts/search?q=&page=&limit=
//! - GET /api/v1/posts/related/{slug}?limit=
//! - GET /api/v1/posts/archive
//! - GET /api/v1/posts/stats
//! - GET /api/v1/posts/{slug}

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::common::ListQuery;
use crate::api::error::ApiError;
use crate::api::responses::{DataResponse, ListResponse, PaginatedResponse};
use crate::api::state::AppState;
use crate::models::{ArchiveYear, PostDetail, PostStats, PostSummary};
use crate::services::post::{
    PostServiceError, DEFAULT_FEATURED_LIMIT, DEFAULT_LATEST_LIMIT, DEFAULT_RELATED_LIMIT,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/latest", get(latest_posts))
        .route("/featured", get(featured_posts))
        .route("/categories", get(posts_by_category))
        .route("/search", get(search_posts))
        .route("/related/{slug}", get(related_posts))
        .route("/archive", get(archive))
        .route("/stats", get(stats))
        .route("/{slug}", get(post_detail))
}

/// Map a service error, using `message` for internal failures
fn post_error(error: PostServiceError, message: &str) -> ApiError {
    match error {
        PostServiceError::PostNotFound => ApiError::not_found("Post not found"),
        PostServiceError::CategoryNotFound => ApiError::not_found("Category not found"),
        PostServiceError::Validation(msg) => ApiError::validation_error(msg),
        PostServiceError::Internal(e) => ApiError::internal(message, e),
    }
}

/// GET /api/v1/posts/latest
async fn latest_posts(State(state): State<AppState>) -> Result<Json<ListResponse<PostSummary>>, ApiError> {
    let posts = state
        .post_service
        .latest(DEFAULT_LATEST_LIMIT)
        .await
        .map_err(|e| post_error(e, "Failed to fetch latest posts"))?;
    Ok(Json(ListResponse::new(posts)))
}

/// GET /api/v1/posts/featured
async fn featured_posts(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<Json<ListResponse<PostSummary>>, ApiError> {
    let posts = state
        .post_service
        .featured(query.limit_or(DEFAULT_FEATURED_LIMIT))
        .await
        .map_err(|e| post_error(e, "Failed to fetch featured posts"))?;
    Ok(Json(ListResponse::new(posts)))
}

/// GET /api/v1/posts/categories
async fn posts_by_category(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<Json<PaginatedResponse<PostSummary>>, ApiError> {
    let slug = query.category.as_deref().unwrap_or_default();
    let result = state
        .post_service
        .by_category(slug, &query.list_params())
        .await
        .map_err(|e| post_error(e, "Failed to fetch posts by category"))?;

    Ok(Json(PaginatedResponse::new(result.posts).with_category(result.category)))
}

/// GET /api/v1/posts/search
async fn search_posts(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<Json<PaginatedResponse<PostSummary>>, ApiError> {
    let q = query.q.as_deref().unwrap_or_default().trim();
    let result = state
        .post_service
        .search(q, &query.list_params())
        .await
        .map_err(|e| post_error(e, "Failed to search posts"))?;

    Ok(Json(PaginatedResponse::new(result).with_query(q)))
}

/// GET /api/v1/posts/related/{slug}
async fn related_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: ListQuery,
) -> Result<Json<ListResponse<PostSummary>>, ApiError> {
    let posts = state
        .post_service
        .related(&slug, query.limit_or(DEFAULT_RELATED_LIMIT))
        .await
        .map_err(|e| post_error(e, "Failed to fetch related posts"))?;
    Ok(Json(ListResponse::new(posts)))
}

/// GET /api/v1/posts/archive
async fn archive(State(state): State<AppState>) -> Result<Json<ListResponse<ArchiveYear>>, ApiError> {
    let years = state
        .post_service
        .archive()
        .await
        .map_err(|e| post_error(e, "Failed to fetch archive"))?;

    let total = years.iter().map(|y| y.total_posts).sum();
    Ok(Json(ListResponse::with_total(years, total)))
}

/// GET /api/v1/posts/stats
async fn stats(State(state): State<AppState>) -> Result<Json<DataResponse<PostStats>>, ApiError> {
    let stats = state
        .post_service
        .stats()
        .await
        .map_err(|e| post_error(e, "Failed to fetch post stats"))?;
    Ok(Json(DataResponse::new(stats)))
}

/// GET /api/v1/posts/{slug}
async fn post_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<DataResponse<PostDetail>>, ApiError> {
    let post = state
        .post_service
        .detail(&slug)
        .await
        .map_err(|e| post_error(e, "Failed to fetch post"))?;
    Ok(Json(DataResponse::new(post)))
}
