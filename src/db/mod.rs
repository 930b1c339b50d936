//! Database layer
//!
//! SQLite is the default backend, MySQL is selectable through configuration.
//! Both sit behind the `DatabasePool` trait so repositories can dispatch on
//! `DatabasePool::driver`.
//!
//! ```ignore
//! use civicfolio::config::DatabaseConfig;
//! use civicfolio::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
