//! Media repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

use super::placeholders;
use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateMediaInput, Media};

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn create(&self, input: &CreateMediaInput) -> Result<Media>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Media>>;

    /// Fetch several media records at once, keyed by id
    async fn get_many(&self, ids: &[i64]) -> Result<HashMap<i64, Media>>;
}

pub struct SqlxMediaRepository {
    pool: DynDatabasePool,
}

impl SqlxMediaRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn MediaRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_MEDIA: &str = r#"
    INSERT INTO media (url, alt, filename, mime_type, width, height, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

const MEDIA_COLUMNS: &str = "id, url, alt, filename, mime_type, width, height, created_at";

#[async_trait]
impl MediaRepository for SqlxMediaRepository {
    async fn create(&self, input: &CreateMediaInput) -> Result<Media> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Media>> {
        let mut found = self.get_many(&[id]).await?;
        Ok(found.remove(&id))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<HashMap<i64, Media>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_many_sqlite(self.pool.sqlite()?, ids).await,
            DatabaseDriver::Mysql => get_many_mysql(self.pool.mysql()?, ids).await,
        }
    }
}

fn select_many_sql(count: usize) -> String {
    format!(
        "SELECT {} FROM media WHERE id IN ({})",
        MEDIA_COLUMNS,
        placeholders(count)
    )
}

fn created(input: &CreateMediaInput, id: i64, now: chrono::DateTime<Utc>) -> Media {
    Media {
        id,
        url: input.url.clone(),
        alt: input.alt.clone(),
        filename: input.filename.clone(),
        mime_type: input.mime_type.clone(),
        width: input.width,
        height: input.height,
        created_at: now,
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, input: &CreateMediaInput) -> Result<Media> {
    let now = Utc::now();
    let result = sqlx::query(INSERT_MEDIA)
        .bind(&input.url)
        .bind(&input.alt)
        .bind(&input.filename)
        .bind(&input.mime_type)
        .bind(input.width)
        .bind(input.height)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create media")?;

    Ok(created(input, result.last_insert_rowid(), now))
}

async fn get_many_sqlite(pool: &SqlitePool, ids: &[i64]) -> Result<HashMap<i64, Media>> {
    let sql = select_many_sql(ids.len());
    let mut query = sqlx::query(&sql);
    for &id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await.context("Failed to load media")?;

    Ok(rows
        .iter()
        .map(row_to_media_sqlite)
        .map(|media| (media.id, media))
        .collect())
}

fn row_to_media_sqlite(row: &sqlx::sqlite::SqliteRow) -> Media {
    Media {
        id: row.get("id"),
        url: row.get("url"),
        alt: row.get("alt"),
        filename: row.get("filename"),
        mime_type: row.get("mime_type"),
        width: row.get("width"),
        height: row.get("height"),
        created_at: row.get("created_at"),
    }
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, input: &CreateMediaInput) -> Result<Media> {
    let now = Utc::now();
    let result = sqlx::query(INSERT_MEDIA)
        .bind(&input.url)
        .bind(&input.alt)
        .bind(&input.filename)
        .bind(&input.mime_type)
        .bind(input.width)
        .bind(input.height)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create media")?;

    Ok(created(input, result.last_insert_id() as i64, now))
}

async fn get_many_mysql(pool: &MySqlPool, ids: &[i64]) -> Result<HashMap<i64, Media>> {
    let sql = select_many_sql(ids.len());
    let mut query = sqlx::query(&sql);
    for &id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await.context("Failed to load media")?;

    Ok(rows
        .iter()
        .map(row_to_media_mysql)
        .map(|media| (media.id, media))
        .collect())
}

fn row_to_media_mysql(row: &sqlx::mysql::MySqlRow) -> Media {
    Media {
        id: row.get("id"),
        url: row.get("url"),
        alt: row.get("alt"),
        filename: row.get("filename"),
        mime_type: row.get("mime_type"),
        width: row.get("width"),
        height: row.get("height"),
        created_at: row.get("created_at"),
    }
}
