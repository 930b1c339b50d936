//! Shared API response types
//!
//! Success bodies always carry `"success": true`.

use serde::Serialize;

use crate::models::{Category, PagedResult};

/// `{ success, data }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// `{ success, data, total }`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub total: i64,
}

impl<T> ListResponse<T> {
    /// A listing whose total is the number of items returned
    pub fn new(data: Vec<T>) -> Self {
        let total = data.len() as i64;
        Self::with_total(data, total)
    }

    pub fn with_total(data: Vec<T>, total: i64) -> Self {
        Self {
            success: true,
            data,
            total,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub total_docs: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl<T> From<&PagedResult<T>> for Pagination {
    fn from(result: &PagedResult<T>) -> Self {
        Self {
            page: result.page,
            total_pages: result.total_pages(),
            total_docs: result.total,
            has_next_page: result.has_next(),
            has_prev_page: result.has_prev(),
        }
    }
}

/// A page of results, echoing the category or search query it was filtered by
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(result: PagedResult<T>) -> Self {
        let pagination = Pagination::from(&result);
        Self {
            success: true,
            data: result.items,
            pagination,
            category: None,
            query: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListParams;

    #[test]
    fn test_pagination_shape() {
        let result = PagedResult::new(vec![1, 2, 3], 7, &ListParams::new(1, 3));
        let json = serde_json::to_value(PaginatedResponse::new(result).with_query("bridge")).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["pagination"]["totalPages"], 3);
        assert_eq!(json["pagination"]["totalDocs"], 7);
        assert_eq!(json["pagination"]["hasNextPage"], true);
        assert_eq!(json["pagination"]["hasPrevPage"], false);
        assert_eq!(json["query"], "bridge");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_list_total_defaults_to_len() {
        let json = serde_json::to_value(ListResponse::new(vec!["a", "b"])).unwrap();
        assert_eq!(json["total"], 2);
    }
}
