//! Contact form endpoint
//!
//! - POST /api/contact - Validate and store a contact form submission

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::models::ContactFormRequest;
use crate::services::{ContactServiceError, RequestOrigin};

const UNKNOWN: &str = "unknown";

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_contact))
}

#[derive(Debug, Serialize)]
struct ContactResponse {
    success: bool,
    message: &'static str,
    id: i64,
}

/// Client address and user agent from the request headers
pub fn request_origin(headers: &HeaderMap) -> RequestOrigin {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    RequestOrigin {
        ip_address: header("x-forwarded-for")
            .or_else(|| header("x-real-ip"))
            .unwrap_or_else(|| UNKNOWN.to_string()),
        user_agent: header("user-agent").unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

/// POST /api/contact
async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: ContactFormRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::validation_error("Invalid JSON body"))?;

    let submission = state
        .contact_service
        .submit(&request, request_origin(&headers))
        .await
        .map_err(|e| match e {
            ContactServiceError::Validation(errors) => {
                ApiError::with_field_errors("Validation failed", errors)
            }
            ContactServiceError::Internal(e) => ApiError::internal("Internal server error", e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            success: true,
            message: "Contact form submitted successfully",
            id: submission.id,
        }),
    ))
}
