//! Category model
//!
//! Categories group posts by topic. A post can belong to several categories,
//! so counts are always computed over the `post_categories` link table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub title: String,
    /// URL-friendly slug, unique across categories
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The `{id, title, slug}` projection embedded in post summaries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            title: category.title.clone(),
            slug: category.slug.clone(),
        }
    }
}

/// Category with the number of published posts linked to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub post_count: i64,
}

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

impl CreateCategoryInput {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_with_count_flattens() {
        let now = Utc::now();
        let item = CategoryWithCount {
            category: Category {
                id: 1,
                title: "Economy".to_string(),
                slug: "economy".to_string(),
                description: None,
                created_at: now,
                updated_at: now,
            },
            post_count: 4,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["slug"], "economy");
        assert_eq!(json["postCount"], 4);
        assert!(json.get("category").is_none());
    }
}
