//! Category service
//!
//! Lists categories with their published post counts. The listing is read on
//! every page render, so it is cached and invalidated on writes.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CategoryWithCount, CreateCategoryInput};

/// Most categories returned by the listing
pub const CATEGORY_LIST_LIMIT: i64 = 100;

/// Cache key prefix for everything this service caches. Post writes drop it
/// too, since the listing carries published post counts.
pub const CATEGORY_CACHE_PREFIX: &str = "categories:";
const CACHE_KEY_LIST: &str = "categories:list";

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Category slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Categories sorted by title, plus the number of categories in the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryListing {
    pub categories: Vec<CategoryWithCount>,
    pub total: i64,
}

pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl CategoryService {
    /// Create a category service using the cache's default TTL
    pub fn new(repo: Arc<dyn CategoryRepository>, cache: Arc<Cache>) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repo,
            cache,
            cache_ttl,
        }
    }

    /// Categories sorted by title with their published post counts
    pub async fn list(&self) -> Result<CategoryListing, CategoryServiceError> {
        if let Some(listing) = self.cache.get::<CategoryListing>(CACHE_KEY_LIST).await.ok().flatten() {
            return Ok(listing);
        }

        let categories = self
            .repo
            .list(CATEGORY_LIST_LIMIT)
            .await
            .context("Failed to list categories")?;
        let counts = self
            .repo
            .published_post_counts()
            .await
            .context("Failed to count posts per category")?;
        let total = self.repo.count().await.context("Failed to count categories")?;

        let listing = CategoryListing {
            categories: categories
                .into_iter()
                .map(|category| CategoryWithCount {
                    post_count: counts.get(&category.id).copied().unwrap_or(0),
                    category,
                })
                .collect(),
            total,
        };

        if let Err(e) = self.cache.set(CACHE_KEY_LIST, &listing, self.cache_ttl).await {
            tracing::warn!("Failed to cache category listing: {}", e);
        }

        Ok(listing)
    }

    /// Create a category
    ///
    /// # Errors
    /// - `Validation` if the title or slug is blank
    /// - `DuplicateSlug` if the slug is taken
    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, CategoryServiceError> {
        if input.title.trim().is_empty() {
            return Err(CategoryServiceError::Validation("Category title cannot be empty".to_string()));
        }
        if input.slug.trim().is_empty() {
            return Err(CategoryServiceError::Validation("Category slug cannot be empty".to_string()));
        }

        if self
            .repo
            .get_by_slug(&input.slug)
            .await
            .context("Failed to check slug uniqueness")?
            .is_some()
        {
            return Err(CategoryServiceError::DuplicateSlug(input.slug));
        }

        let created = self.repo.create(&input).await.context("Failed to create category")?;
        self.invalidate_cache().await;
        Ok(created)
    }

    /// Drop every cached category listing
    pub async fn invalidate_cache(&self) {
        if let Err(e) = self.cache.delete_prefix(CATEGORY_CACHE_PREFIX).await {
            tracing::warn!("Failed to invalidate category cache: {}", e);
        }
    }
}
