//! API error type
//!
//! Every failure leaves the API as `{ "success": false, "error": <message> }`,
//! with an `errors` array for field-level validation failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;

use crate::services::FieldError;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

#[derive(Debug)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
    pub errors: Option<Vec<FieldError>>,
}

/// Wire shape of an error response
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(NOT_FOUND, message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(VALIDATION_ERROR, message)
    }

    /// Validation failure listing each failing field
    pub fn with_field_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::validation_error(message)
        }
    }

    /// Log the underlying error and return `message` to the client
    pub fn internal(message: impl Into<String>, error: impl Display) -> Self {
        let message = message.into();
        tracing::error!("{}: {}", message, error);
        Self::new(INTERNAL_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            NOT_FOUND => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: &self.message,
            errors: self.errors.as_deref(),
        };
        (self.status(), Json(body)).into_response()
    }
}
