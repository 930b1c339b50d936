//! Post model
//!
//! Defines the stored post row, the summary shape served by list endpoints,
//! and the pagination helpers shared by paginated queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryRef, Media, PopulatedAuthor};

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Not visible to the public
    #[default]
    Draft,
    /// Visible to the public
    Published,
}

impl PostStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    /// Parse status from database string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A post as stored in the `posts` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    /// Markdown body
    pub content: String,
    pub hero_image_id: Option<i64>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image_id: Option<i64>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// SEO metadata attached to a post summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PostMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Media>,
}

/// The post shape returned by every list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub published_at: Option<DateTime<Utc>>,
    pub categories: Vec<CategoryRef>,
    pub hero_image: Option<Media>,
    pub meta: PostMeta,
    pub populated_authors: Vec<PopulatedAuthor>,
}

/// A single post with its body, for the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
    pub content_html: String,
}

/// Input for creating a post
///
/// A published post without an explicit `published_at` is stamped with the
/// current time.
#[derive(Debug, Clone, Default)]
pub struct CreatePostInput {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub hero_image_id: Option<i64>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image_id: Option<i64>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    /// Linked categories, in display order
    pub category_ids: Vec<i64>,
    /// Linked authors, in display order
    pub author_ids: Vec<i64>,
}

impl CreatePostInput {
    /// A published post with the given title and slug and no links
    pub fn published(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            status: PostStatus::Published,
            ..Default::default()
        }
    }

    pub fn draft(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            status: PostStatus::Draft,
            ..Default::default()
        }
    }

    pub fn at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn in_categories(mut self, category_ids: Vec<i64>) -> Self {
        self.category_ids = category_ids;
        self
    }

    pub fn by_authors(mut self, author_ids: Vec<i64>) -> Self {
        self.author_ids = author_ids;
        self
    }

    pub fn with_hero_image(mut self, media_id: i64) -> Self {
        self.hero_image_id = Some(media_id);
        self
    }

    pub fn with_meta(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.meta_title = Some(title.into());
        self.meta_description = Some(description.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 12,
        }
    }
}

impl ListParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.per_page as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 || self.total <= 0 {
            return 0;
        }
        let per_page = self.per_page as i64;
        ((self.total + per_page - 1) / per_page) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
