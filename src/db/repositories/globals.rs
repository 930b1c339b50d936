//! Globals repository
//!
//! Key/value storage for singleton site settings such as the header logo.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;

/// Media id of the header logo
pub const HEADER_MAIN_LOGO: &str = "header.main_logo";

#[async_trait]
pub trait GlobalsRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

pub struct SqlxGlobalsRepository {
    pool: DynDatabasePool,
}

impl SqlxGlobalsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn GlobalsRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_VALUE: &str = "SELECT setting_value FROM globals WHERE setting_key = ?";
const DELETE_VALUE: &str = "DELETE FROM globals WHERE setting_key = ?";

#[async_trait]
impl GlobalsRepository for SqlxGlobalsRepository {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_sqlite(self.pool.sqlite()?, key).await,
            DatabaseDriver::Mysql => get_mysql(self.pool.mysql()?, key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => set_sqlite(self.pool.sqlite()?, key, value).await,
            DatabaseDriver::Mysql => set_mysql(self.pool.mysql()?, key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(DELETE_VALUE)
                    .bind(key)
                    .execute(self.pool.sqlite()?)
                    .await
                    .with_context(|| format!("Failed to delete global '{}'", key))?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(DELETE_VALUE)
                    .bind(key)
                    .execute(self.pool.mysql()?)
                    .await
                    .with_context(|| format!("Failed to delete global '{}'", key))?;
            }
        }
        Ok(())
    }
}

// SQLite implementations
async fn get_sqlite(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row = sqlx::query(SELECT_VALUE)
        .bind(key)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to read global '{}'", key))?;
    Ok(row.map(|r| r.get("setting_value")))
}

async fn set_sqlite(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO globals (setting_key, setting_value) VALUES (?, ?)
         ON CONFLICT(setting_key) DO UPDATE SET setting_value = excluded.setting_value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to write global '{}'", key))?;
    Ok(())
}

// MySQL implementations
async fn get_mysql(pool: &MySqlPool, key: &str) -> Result<Option<String>> {
    let row = sqlx::query(SELECT_VALUE)
        .bind(key)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to read global '{}'", key))?;
    Ok(row.map(|r| r.get("setting_value")))
}

async fn set_mysql(pool: &MySqlPool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO globals (setting_key, setting_value) VALUES (?, ?)
         ON DUPLICATE KEY UPDATE setting_value = VALUES(setting_value)",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to write global '{}'", key))?;
    Ok(())
}
