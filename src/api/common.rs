//! Common API utilities and shared types
//!
//! Query parameters are taken as raw strings. A value that does not parse
//! falls back to the endpoint default instead of rejecting the request, and
//! a repeated key keeps its first value.

use axum::{extract::FromRequestParts, extract::Query, http::request::Parts};

use crate::api::error::ApiError;
use crate::models::ListParams;

/// Default page number (1-indexed)
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size for paginated listings
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Upper bound for every `limit` parameter
pub const MAX_LIMIT: i64 = 100;

/// Pagination and filter query parameters
#[derive(Debug, Default, PartialEq)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
}

impl ListQuery {
    /// Build from decoded `key=value` pairs. Unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                "category" => &mut query.category,
                "q" => &mut query.q,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    pub fn list_params(&self) -> ListParams {
        ListParams::new(
            parse_number(self.page.as_deref()).unwrap_or(DEFAULT_PAGE as i64).clamp(1, u32::MAX as i64) as u32,
            parse_number(self.limit.as_deref())
                .unwrap_or(DEFAULT_PAGE_SIZE as i64)
                .clamp(1, MAX_LIMIT) as u32,
        )
    }

    /// `limit` for unpaginated listings, clamped to `1..=MAX_LIMIT`
    pub fn limit_or(&self, default: i64) -> i64 {
        parse_number(self.limit.as_deref()).unwrap_or(default).clamp(1, MAX_LIMIT)
    }
}

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::validation_error(format!("Invalid query string: {}", e.body_text())))?;
        Ok(Self::from_pairs(pairs))
    }
}

/// Parse a leading integer the way `parseInt` does: surrounding whitespace is
/// ignored and trailing garbage is dropped.
pub fn parse_number(value: Option<&str>) -> Option<i64> {
    let value = value?.trim();
    let digits_end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..digits_end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> ListQuery {
        ListQuery {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
            ..Default::default()
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_from_pairs_keeps_first_value() {
        let query = ListQuery::from_pairs(pairs(&[("q", "a"), ("q", "b"), ("page", "2"), ("sort", "x")]));
        assert_eq!(query.q.as_deref(), Some("a"));
        assert_eq!(query.page.as_deref(), Some("2"));
        assert_eq!(query.limit, None);
        assert_eq!(query.category, None);
    }

    #[tokio::test]
    async fn test_extract_from_uri() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/search?q=caf%C3%A9&q=other&limit=5")
            .body(())
            .unwrap()
            .into_parts();

        let query = ListQuery::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(query.q.as_deref(), Some("café"));
        assert_eq!(query.limit_or(3), 5);
    }

    #[tokio::test]
    async fn test_extract_without_query_string() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/latest")
            .body(())
            .unwrap()
            .into_parts();

        let query = ListQuery::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(query, ListQuery::default());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("3")), Some(3));
        assert_eq!(parse_number(Some(" 12 ")), Some(12));
        assert_eq!(parse_number(Some("7abc")), Some(7));
        assert_eq!(parse_number(Some("-2")), Some(-2));
        assert_eq!(parse_number(Some("abc")), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_list_params_defaults() {
        assert_eq!(query(None, None).list_params(), ListParams::new(1, 12));
        assert_eq!(query(Some("x"), Some("y")).list_params(), ListParams::new(1, 12));
    }

    #[test]
    fn test_list_params_clamped() {
        assert_eq!(query(Some("-4"), Some("5000")).list_params(), ListParams::new(1, 100));
        assert_eq!(query(Some("2"), Some("0")).list_params(), ListParams::new(2, 1));
    }

    #[test]
    fn test_limit_or() {
        assert_eq!(query(None, None).limit_or(6), 6);
        assert_eq!(query(None, Some("2")).limit_or(6), 2);
        assert_eq!(query(None, Some("999")).limit_or(6), MAX_LIMIT);
        assert_eq!(query(None, Some("0")).limit_or(6), 1);
    }
}
