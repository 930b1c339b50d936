//! Category repository
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

use super::placeholders;
use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, CategoryRef, CreateCategoryInput};

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List categories ordered by title
    async fn list(&self, limit: i64) -> Result<Vec<Category>>;

    /// Number of categories in the store
    async fn count(&self) -> Result<i64>;

    /// Published post count per category id. Categories without
    /// published posts are absent from the map.
    async fn published_post_counts(&self) -> Result<HashMap<i64, i64>>;

    /// Ids of the categories a post belongs to, in link order
    async fn ids_for_post(&self, post_id: i64) -> Result<Vec<i64>>;

    /// Categories of each post, in link order, keyed by post id
    async fn refs_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<CategoryRef>>>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_CATEGORY: &str = r#"
    INSERT INTO categories (title, slug, description, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?)
"#;

const SELECT_BY_SLUG: &str = r#"
    SELECT id, title, slug, description, created_at, updated_at
    FROM categories
    WHERE slug = ?
"#;

const SELECT_LIST: &str = r#"
    SELECT id, title, slug, description, created_at, updated_at
    FROM categories
    ORDER BY title, id
    LIMIT ?
"#;

const COUNT_CATEGORIES: &str = "SELECT COUNT(*) AS count FROM categories";

const PUBLISHED_COUNTS: &str = r#"
    SELECT pc.category_id, COUNT(*) AS post_count
    FROM post_categories pc
    JOIN posts p ON p.id = pc.post_id
    WHERE p.status = 'published'
    GROUP BY pc.category_id
"#;

const IDS_FOR_POST: &str =
    "SELECT category_id FROM post_categories WHERE post_id = ? ORDER BY position, category_id";

fn refs_sql(count: usize) -> String {
    format!(
        r#"
        SELECT pc.post_id, c.id, c.title, c.slug
        FROM post_categories pc
        JOIN categories c ON c.id = pc.category_id
        WHERE pc.post_id IN ({})
        ORDER BY pc.post_id, pc.position, c.id
        "#,
        placeholders(count)
    )
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_category_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_category_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(SELECT_BY_SLUG)
                    .bind(slug)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get category by slug")?;
                Ok(row.as_ref().map(row_to_category_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(SELECT_BY_SLUG)
                    .bind(slug)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get category by slug")?;
                Ok(row.as_ref().map(row_to_category_mysql))
            }
        }
    }

    async fn list(&self, limit: i64) -> Result<Vec<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(SELECT_LIST)
                    .bind(limit)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list categories")?;
                Ok(rows.iter().map(row_to_category_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(SELECT_LIST)
                    .bind(limit)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list categories")?;
                Ok(rows.iter().map(row_to_category_mysql).collect())
            }
        }
    }

    async fn count(&self) -> Result<i64> {
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(COUNT_CATEGORIES)
                .fetch_one(self.pool.sqlite()?)
                .await
                .context("Failed to count categories")?
                .get("count"),
            DatabaseDriver::Mysql => sqlx::query(COUNT_CATEGORIES)
                .fetch_one(self.pool.mysql()?)
                .await
                .context("Failed to count categories")?
                .get("count"),
        };
        Ok(count)
    }

    async fn published_post_counts(&self) -> Result<HashMap<i64, i64>> {
        let counts = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(PUBLISHED_COUNTS)
                .fetch_all(self.pool.sqlite()?)
                .await
                .context("Failed to count posts per category")?
                .iter()
                .map(|row| (row.get("category_id"), row.get("post_count")))
                .collect(),
            DatabaseDriver::Mysql => sqlx::query(PUBLISHED_COUNTS)
                .fetch_all(self.pool.mysql()?)
                .await
                .context("Failed to count posts per category")?
                .iter()
                .map(|row| (row.get("category_id"), row.get("post_count")))
                .collect(),
        };
        Ok(counts)
    }

    async fn ids_for_post(&self, post_id: i64) -> Result<Vec<i64>> {
        let ids = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(IDS_FOR_POST)
                .bind(post_id)
                .fetch_all(self.pool.sqlite()?)
                .await
                .context("Failed to load post categories")?
                .iter()
                .map(|row| row.get("category_id"))
                .collect(),
            DatabaseDriver::Mysql => sqlx::query(IDS_FOR_POST)
                .bind(post_id)
                .fetch_all(self.pool.mysql()?)
                .await
                .context("Failed to load post categories")?
                .iter()
                .map(|row| row.get("category_id"))
                .collect(),
        };
        Ok(ids)
    }

    async fn refs_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<CategoryRef>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => refs_for_posts_sqlite(self.pool.sqlite()?, post_ids).await,
            DatabaseDriver::Mysql => refs_for_posts_mysql(self.pool.mysql()?, post_ids).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, input: &CreateCategoryInput) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_CATEGORY)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        slug: input.slug.clone(),
        description: input.description.clone(),
        created_at: now,
        updated_at: now,
    })
}

async fn refs_for_posts_sqlite(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<CategoryRef>>> {
    let sql = refs_sql(post_ids.len());
    let mut query = sqlx::query(&sql);
    for &id in post_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await.context("Failed to load post categories")?;

    let mut refs: HashMap<i64, Vec<CategoryRef>> = HashMap::new();
    for row in rows {
        refs.entry(row.get("post_id")).or_default().push(CategoryRef {
            id: row.get("id"),
            title: row.get("title"),
            slug: row.get("slug"),
        });
    }
    Ok(refs)
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, input: &CreateCategoryInput) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_CATEGORY)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_id() as i64,
        title: input.title.clone(),
        slug: input.slug.clone(),
        description: input.description.clone(),
        created_at: now,
        updated_at: now,
    })
}

async fn refs_for_posts_mysql(
    pool: &MySqlPool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<CategoryRef>>> {
    let sql = refs_sql(post_ids.len());
    let mut query = sqlx::query(&sql);
    for &id in post_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await.context("Failed to load post categories")?;

    let mut refs: HashMap<i64, Vec<CategoryRef>> = HashMap::new();
    for row in rows {
        refs.entry(row.get("post_id")).or_default().push(CategoryRef {
            id: row.get("id"),
            title: row.get("title"),
            slug: row.get("slug"),
        });
    }
    Ok(refs)
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Category {
    Category {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
