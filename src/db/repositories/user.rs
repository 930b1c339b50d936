//! Author repository
//!
//! Authors are linked to posts through `post_authors`. The public listings
//! only need their ids and names, loaded in bulk for a page of posts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

use super::placeholders;
use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateUserInput, PopulatedAuthor, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Authors of each post, in link order, keyed by post id
    async fn authors_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<PopulatedAuthor>>>;
}

pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_USER: &str = "INSERT INTO users (name, email, created_at) VALUES (?, ?, ?)";

fn authors_sql(count: usize) -> String {
    format!(
        r#"
        SELECT pa.post_id, u.id, u.name
        FROM post_authors pa
        JOIN users u ON u.id = pa.user_id
        WHERE pa.post_id IN ({})
        ORDER BY pa.post_id, pa.position, u.id
        "#,
        placeholders(count)
    )
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        let now = Utc::now();
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_USER)
                .bind(&input.name)
                .bind(&input.email)
                .bind(now)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to create user")?
                .last_insert_rowid(),
            DatabaseDriver::Mysql => sqlx::query(INSERT_USER)
                .bind(&input.name)
                .bind(&input.email)
                .bind(now)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to create user")?
                .last_insert_id() as i64,
        };

        Ok(User {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            created_at: now,
        })
    }

    async fn authors_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<PopulatedAuthor>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => authors_for_posts_sqlite(self.pool.sqlite()?, post_ids).await,
            DatabaseDriver::Mysql => authors_for_posts_mysql(self.pool.mysql()?, post_ids).await,
        }
    }
}

async fn authors_for_posts_sqlite(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<PopulatedAuthor>>> {
    let sql = authors_sql(post_ids.len());
    let mut query = sqlx::query(&sql);
    for &id in post_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await.context("Failed to load post authors")?;

    let mut authors: HashMap<i64, Vec<PopulatedAuthor>> = HashMap::new();
    for row in rows {
        authors.entry(row.get("post_id")).or_default().push(PopulatedAuthor {
            id: row.get("id"),
            name: row.get("name"),
        });
    }
    Ok(authors)
}

async fn authors_for_posts_mysql(
    pool: &MySqlPool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<PopulatedAuthor>>> {
    let sql = authors_sql(post_ids.len());
    let mut query = sqlx::query(&sql);
    for &id in post_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await.context("Failed to load post authors")?;

    let mut authors: HashMap<i64, Vec<PopulatedAuthor>> = HashMap::new();
    for row in rows {
        authors.entry(row.get("post_id")).or_default().push(PopulatedAuthor {
            id: row.get("id"),
            name: row.get("name"),
        });
    }
    Ok(authors)
}
