//! Post service
//!
//! Business logic for published posts:
//! - Latest, featured, per-category and search listings
//! - Related posts by shared category
//! - Archive grouping and aggregate statistics
//! - Post detail with rendered Markdown
//! - Creating posts, which refreshes the cached category counts
//!
//! Every listing is hydrated into `PostSummary` values: category refs, hero
//! and meta images, and author names are loaded in one batch per listing.

use anyhow::Context;
use chrono::{Duration, Months, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::{CategoryRepository, MediaRepository, PostRepository, UserRepository};
use crate::models::{
    ArchiveYear, Category, CategoryStat, CreatePostInput, LatestPost, ListParams, PagedResult, Post,
    PostDetail, PostMeta, PostStats, PostSummary,
};
use crate::services::archive::{group_archive, monthly_stats, rank_category_stats};
use crate::services::category::CATEGORY_CACHE_PREFIX;
use crate::services::markdown::MarkdownRenderer;

pub const DEFAULT_LATEST_LIMIT: i64 = 5;
pub const DEFAULT_FEATURED_LIMIT: i64 = 6;
pub const DEFAULT_RELATED_LIMIT: i64 = 3;
/// Most posts considered by the archive
pub const ARCHIVE_LIMIT: i64 = 1000;
/// Most categories considered by the stats
const STATS_CATEGORY_LIMIT: i64 = 100;
const TOP_CATEGORIES: usize = 5;
const RECENT_DAYS: i64 = 30;
const MONTHLY_WINDOW: u32 = 12;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    #[error("Post not found")]
    PostNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Posts in one category, with the category itself
#[derive(Debug)]
pub struct CategoryPosts {
    pub category: Category,
    pub posts: PagedResult<PostSummary>,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    media: Arc<dyn MediaRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<Cache>,
    markdown: MarkdownRenderer,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        media: Arc<dyn MediaRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<Cache>,
    ) -> Self {
        Self {
            posts,
            categories,
            media,
            users,
            cache,
            markdown: MarkdownRenderer::new(),
        }
    }

    /// Create a post with its category and author links
    ///
    /// The cached category listing is dropped afterwards so its post counts
    /// include the new post.
    ///
    /// # Errors
    /// - `Validation` if the title or slug is blank
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        if input.title.trim().is_empty() {
            return Err(PostServiceError::Validation("Post title cannot be empty".to_string()));
        }
        if input.slug.trim().is_empty() {
            return Err(PostServiceError::Validation("Post slug cannot be empty".to_string()));
        }

        let post = self.posts.create(&input).await.context("Failed to create post")?;

        if let Err(e) = self.cache.delete_prefix(CATEGORY_CACHE_PREFIX).await {
            tracing::warn!("Failed to invalidate category cache: {}", e);
        }
        Ok(post)
    }

    /// Number of published posts
    pub async fn published_count(&self) -> Result<i64, PostServiceError> {
        Ok(self.posts.count_published().await.context("Failed to count posts")?)
    }

    /// The most recent published posts that have a publication date
    pub async fn latest(&self, limit: i64) -> Result<Vec<PostSummary>, PostServiceError> {
        let posts = self
            .posts
            .list_latest(limit, None)
            .await
            .context("Failed to list latest posts")?;
        self.summarize(posts).await
    }

    /// Published posts with a hero image, newest first
    pub async fn featured(&self, limit: i64) -> Result<Vec<PostSummary>, PostServiceError> {
        let posts = self
            .posts
            .list_featured(limit)
            .await
            .context("Failed to list featured posts")?;
        self.summarize(posts).await
    }

    /// Published posts in the category with the given slug
    ///
    /// # Errors
    /// - `Validation` if the slug is empty
    /// - `CategoryNotFound` if no category has the slug
    pub async fn by_category(
        &self,
        slug: &str,
        params: &ListParams,
    ) -> Result<CategoryPosts, PostServiceError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(PostServiceError::Validation("Category slug is required".to_string()));
        }

        let category = self
            .categories
            .get_by_slug(slug)
            .await
            .context("Failed to get category")?
            .ok_or(PostServiceError::CategoryNotFound)?;

        let page = self
            .posts
            .list_by_category(category.id, params)
            .await
            .context("Failed to list posts by category")?;

        Ok(CategoryPosts {
            category,
            posts: self.summarize_page(page).await?,
        })
    }

    /// Case-insensitive substring search over title and meta description
    ///
    /// # Errors
    /// - `Validation` if the query is blank
    pub async fn search(
        &self,
        query: &str,
        params: &ListParams,
    ) -> Result<PagedResult<PostSummary>, PostServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PostServiceError::Validation("Search query is required".to_string()));
        }

        let page = self
            .posts
            .search(query, params)
            .await
            .context("Failed to search posts")?;
        self.summarize_page(page).await
    }

    /// Published posts sharing a category with the given post.
    ///
    /// A post without categories gets the latest posts instead. The post
    /// itself is never included.
    pub async fn related(&self, slug: &str, limit: i64) -> Result<Vec<PostSummary>, PostServiceError> {
        let post = self
            .posts
            .get_published_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::PostNotFound)?;

        let category_ids = self
            .categories
            .ids_for_post(post.id)
            .await
            .context("Failed to get post categories")?;

        let related = if category_ids.is_empty() {
            self.posts
                .list_latest(limit, Some(post.id))
                .await
                .context("Failed to list latest posts")?
        } else {
            self.posts
                .list_related(&category_ids, post.id, limit)
                .await
                .context("Failed to list related posts")?
        };

        self.summarize(related).await
    }

    /// Published posts grouped by year and month
    pub async fn archive(&self) -> Result<Vec<ArchiveYear>, PostServiceError> {
        let posts = self
            .posts
            .list_latest(ARCHIVE_LIMIT, None)
            .await
            .context("Failed to list archive posts")?;
        Ok(group_archive(&posts))
    }

    /// Aggregate statistics over published posts
    pub async fn stats(&self) -> Result<PostStats, PostServiceError> {
        let now = Utc::now();

        let total_posts = self.published_count().await?;

        let recent_posts = self
            .posts
            .count_published_since(now - Duration::days(RECENT_DAYS))
            .await
            .context("Failed to count recent posts")?;

        let latest_post = self
            .posts
            .list_latest(1, None)
            .await
            .context("Failed to get latest post")?
            .into_iter()
            .next()
            .map(|post| LatestPost {
                id: post.id,
                title: post.title,
                slug: post.slug,
                published_at: post.published_at,
            });

        let categories = self
            .categories
            .list(STATS_CATEGORY_LIMIT)
            .await
            .context("Failed to list categories")?;
        let counts = self
            .categories
            .published_post_counts()
            .await
            .context("Failed to count posts per category")?;
        let category_stats = rank_category_stats(
            categories
                .into_iter()
                .map(|category| CategoryStat {
                    post_count: counts.get(&category.id).copied().unwrap_or(0),
                    id: category.id,
                    title: category.title,
                    slug: category.slug,
                })
                .collect(),
        );
        let top_categories = category_stats.iter().take(TOP_CATEGORIES).cloned().collect();

        let window_start = now
            .checked_sub_months(Months::new(MONTHLY_WINDOW))
            .unwrap_or(now - Duration::days(365));
        let dates = self
            .posts
            .published_dates_since(window_start)
            .await
            .context("Failed to load publication dates")?;

        Ok(PostStats {
            total_posts,
            recent_posts,
            latest_post,
            category_stats,
            monthly_stats: monthly_stats(&dates),
            top_categories,
        })
    }

    /// One published post with its rendered body
    pub async fn detail(&self, slug: &str) -> Result<PostDetail, PostServiceError> {
        let post = self
            .posts
            .get_published_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::PostNotFound)?;

        let content = post.content.clone();
        let content_html = self.markdown.render(&content);
        let summary = self
            .summarize(vec![post])
            .await?
            .pop()
            .ok_or(PostServiceError::PostNotFound)?;

        Ok(PostDetail {
            summary,
            content,
            content_html,
        })
    }

    async fn summarize_page(
        &self,
        page: PagedResult<Post>,
    ) -> Result<PagedResult<PostSummary>, PostServiceError> {
        let PagedResult {
            items,
            total,
            page,
            per_page,
        } = page;
        Ok(PagedResult {
            items: self.summarize(items).await?,
            total,
            page,
            per_page,
        })
    }

    /// Load the relations of a batch of posts and build their summaries
    async fn summarize(&self, posts: Vec<Post>) -> Result<Vec<PostSummary>, PostServiceError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let mut media_ids: Vec<i64> = posts
            .iter()
            .flat_map(|p| [p.hero_image_id, p.meta_image_id])
            .flatten()
            .collect();
        media_ids.sort_unstable();
        media_ids.dedup();

        let mut categories = self
            .categories
            .refs_for_posts(&post_ids)
            .await
            .context("Failed to load post categories")?;
        let media = self
            .media
            .get_many(&media_ids)
            .await
            .context("Failed to load post media")?;
        let mut authors = self
            .users
            .authors_for_posts(&post_ids)
            .await
            .context("Failed to load post authors")?;

        Ok(posts
            .into_iter()
            .map(|post| PostSummary {
                id: post.id,
                categories: categories.remove(&post.id).unwrap_or_default(),
                hero_image: lookup(&media, post.hero_image_id),
                meta: PostMeta {
                    title: post.meta_title,
                    description: post.meta_description,
                    image: lookup(&media, post.meta_image_id),
                },
                populated_authors: authors.remove(&post.id).unwrap_or_default(),
                title: post.title,
                slug: post.slug,
                published_at: post.published_at,
            })
            .collect())
    }
}

fn lookup<T: Clone>(map: &HashMap<i64, T>, id: Option<i64>) -> Option<T> {
    id.and_then(|id| map.get(&id).cloned())
}
