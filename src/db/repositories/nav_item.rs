//! Navigation item repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateNavItemInput, NavItem};

#[async_trait]
pub trait NavItemRepository: Send + Sync {
    async fn create(&self, input: &CreateNavItemInput) -> Result<NavItem>;

    /// All items, flat, ordered by sort order then id
    async fn list(&self) -> Result<Vec<NavItem>>;
}

pub struct SqlxNavItemRepository {
    pool: DynDatabasePool,
}

impl SqlxNavItemRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NavItemRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_NAV_ITEM: &str =
    "INSERT INTO nav_items (parent_id, name, icon, path, sort_order) VALUES (?, ?, ?, ?, ?)";

const SELECT_ALL: &str =
    "SELECT id, parent_id, name, icon, path, sort_order FROM nav_items ORDER BY sort_order, id";

#[async_trait]
impl NavItemRepository for SqlxNavItemRepository {
    async fn create(&self, input: &CreateNavItemInput) -> Result<NavItem> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, input).await?,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, input).await?,
        };
        Ok(NavItem {
            id,
            parent_id: input.parent_id,
            name: input.name.clone(),
            icon: input.icon.clone(),
            path: input.path.clone(),
            sort_order: input.sort_order,
        })
    }

    async fn list(&self) -> Result<Vec<NavItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.mysql()?).await,
        }
    }
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, input: &CreateNavItemInput) -> Result<i64> {
    let result = sqlx::query(INSERT_NAV_ITEM)
        .bind(input.parent_id)
        .bind(&input.name)
        .bind(&input.icon)
        .bind(&input.path)
        .bind(input.sort_order)
        .execute(pool)
        .await
        .context("Failed to create nav item")?;
    Ok(result.last_insert_rowid())
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<NavItem>> {
    let rows = sqlx::query(SELECT_ALL)
        .fetch_all(pool)
        .await
        .context("Failed to list nav items")?;
    Ok(rows.iter().map(row_to_nav_item_sqlite).collect())
}

fn row_to_nav_item_sqlite(row: &sqlx::sqlite::SqliteRow) -> NavItem {
    NavItem {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        name: row.get("name"),
        icon: row.get("icon"),
        path: row.get("path"),
        sort_order: row.get("sort_order"),
    }
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, input: &CreateNavItemInput) -> Result<i64> {
    let result = sqlx::query(INSERT_NAV_ITEM)
        .bind(input.parent_id)
        .bind(&input.name)
        .bind(&input.icon)
        .bind(&input.path)
        .bind(input.sort_order)
        .execute(pool)
        .await
        .context("Failed to create nav item")?;
    Ok(result.last_insert_id() as i64)
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<NavItem>> {
    let rows = sqlx::query(SELECT_ALL)
        .fetch_all(pool)
        .await
        .context("Failed to list nav items")?;
    Ok(rows.iter().map(row_to_nav_item_mysql).collect())
}

fn row_to_nav_item_mysql(row: &sqlx::mysql::MySqlRow) -> NavItem {
    NavItem {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        name: row.get("name"),
        icon: row.get("icon"),
        path: row.get("path"),
        sort_order: row.get("sort_order"),
    }
}
