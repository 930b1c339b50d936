//! Contact submission repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ContactStatus, ContactSubmission, CreateContactInput};

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Store a submission with status `new`
    async fn create(&self, input: &CreateContactInput) -> Result<ContactSubmission>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>>;
}

pub struct SqlxContactRepository {
    pool: DynDatabasePool,
}

impl SqlxContactRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_CONTACT: &str = r#"
    INSERT INTO contact_forms (full_name, email, phone, subject, message, status,
                               ip_address, user_agent, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_BY_ID: &str = r#"
    SELECT id, full_name, email, phone, subject, message, status,
           ip_address, user_agent, created_at, updated_at
    FROM contact_forms
    WHERE id = ?
"#;

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn create(&self, input: &CreateContactInput) -> Result<ContactSubmission> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(SELECT_BY_ID)
                    .bind(id)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get contact submission")?;
                row.as_ref().map(row_to_submission_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(SELECT_BY_ID)
                    .bind(id)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get contact submission")?;
                row.as_ref().map(row_to_submission_mysql).transpose()
            }
        }
    }
}

fn submission(input: &CreateContactInput, id: i64, now: chrono::DateTime<Utc>) -> ContactSubmission {
    ContactSubmission {
        id,
        full_name: input.full_name.clone(),
        email: input.email.clone(),
        phone: input.phone.clone(),
        subject: input.subject.clone(),
        message: input.message.clone(),
        status: ContactStatus::New,
        ip_address: input.ip_address.clone(),
        user_agent: input.user_agent.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn parse_status(status: &str) -> Result<ContactStatus> {
    ContactStatus::parse(status).ok_or_else(|| anyhow::anyhow!("Invalid contact status: {}", status))
}

// SQLite implementations
async fn create_sqlite(pool: &SqlitePool, input: &CreateContactInput) -> Result<ContactSubmission> {
    let now = Utc::now();
    let result = sqlx::query(INSERT_CONTACT)
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.subject)
        .bind(&input.message)
        .bind(ContactStatus::New.as_str())
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to store contact submission")?;

    Ok(submission(input, result.last_insert_rowid(), now))
}

fn row_to_submission_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ContactSubmission> {
    let status: String = row.get("status");
    Ok(ContactSubmission {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        subject: row.get("subject"),
        message: row.get("message"),
        status: parse_status(&status)?,
        ip_address: row.get("ip_address"),
        user_agent: row.get("user_agent"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// MySQL implementations
async fn create_mysql(pool: &MySqlPool, input: &CreateContactInput) -> Result<ContactSubmission> {
    let now = Utc::now();
    let result = sqlx::query(INSERT_CONTACT)
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.subject)
        .bind(&input.message)
        .bind(ContactStatus::New.as_str())
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to store contact submission")?;

    Ok(submission(input, result.last_insert_id() as i64, now))
}

fn row_to_submission_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ContactSubmission> {
    let status: String = row.get("status");
    Ok(ContactSubmission {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        subject: row.get("subject"),
        message: row.get("message"),
        status: parse_status(&status)?,
        ip_address: row.get("ip_address"),
        user_agent: row.get("user_agent"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
