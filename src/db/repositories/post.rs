//! Post repository
//!
//! Every public query is restricted to published posts. Listings are ordered
//! newest first by `published_at`, then by id. Each query is built once as
//! SQL plus arguments and run against whichever backend is configured.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{MySql, MySqlPool, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use super::{escape_like, placeholders, LIKE_ESCAPE};
use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreatePostInput, ListParams, PagedResult, Post, PostStatus};

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a post along with its category and author links
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Most recent published posts that have a `published_at`,
    /// optionally leaving one post out
    async fn list_latest(&self, limit: i64, exclude_id: Option<i64>) -> Result<Vec<Post>>;

    /// Most recent published posts with a hero image and a `published_at`
    async fn list_featured(&self, limit: i64) -> Result<Vec<Post>>;

    async fn list_by_category(&self, category_id: i64, params: &ListParams) -> Result<PagedResult<Post>>;

    /// Case-insensitive substring match on title or meta description
    async fn search(&self, query: &str, params: &ListParams) -> Result<PagedResult<Post>>;

    /// Published posts sharing any of `category_ids`, excluding one post
    async fn list_related(&self, category_ids: &[i64], exclude_id: i64, limit: i64) -> Result<Vec<Post>>;

    async fn count_published(&self) -> Result<i64>;

    /// Published posts with `published_at` strictly after `since`
    async fn count_published_since(&self, since: DateTime<Utc>) -> Result<i64>;

    /// `published_at` of every published post after `since`, newest first
    async fn published_dates_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }

    async fn fetch_posts(&self, sql: &str, args: &[Arg]) -> Result<Vec<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = bind_sqlite(sqlx::query(sql), args)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to query posts")?;
                rows.iter().map(row_to_post_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = bind_mysql(sqlx::query(sql), args)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to query posts")?;
                rows.iter().map(row_to_post_mysql).collect()
            }
        }
    }

    async fn fetch_count(&self, sql: &str, args: &[Arg]) -> Result<i64> {
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => bind_sqlite(sqlx::query(sql), args)
                .fetch_one(self.pool.sqlite()?)
                .await
                .context("Failed to count posts")?
                .get("count"),
            DatabaseDriver::Mysql => bind_mysql(sqlx::query(sql), args)
                .fetch_one(self.pool.mysql()?)
                .await
                .context("Failed to count posts")?
                .get("count"),
        };
        Ok(count)
    }

    /// One page of posts matching `filter`, plus the total match count
    async fn fetch_page(&self, filter: &PostFilter, params: &ListParams) -> Result<PagedResult<Post>> {
        let total = self.fetch_count(&filter.count_sql(), &filter.args).await?;

        let mut args = filter.args.clone();
        args.push(Arg::Int(params.limit()));
        args.push(Arg::Int(params.offset()));
        let items = self
            .fetch_posts(&filter.select_sql("LIMIT ? OFFSET ?"), &args)
            .await?;

        Ok(PagedResult::new(items, total, params))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let filter = PostFilter::published().and("slug = ?", Arg::Text(slug.to_string()));
        let mut posts = self.fetch_posts(&filter.select_sql("LIMIT 1"), &filter.args).await?;
        Ok(posts.pop())
    }

    async fn list_latest(&self, limit: i64, exclude_id: Option<i64>) -> Result<Vec<Post>> {
        let mut filter = PostFilter::published().raw("published_at IS NOT NULL");
        if let Some(id) = exclude_id {
            filter = filter.and("id <> ?", Arg::Int(id));
        }
        self.fetch_limited(filter, limit).await
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<Post>> {
        let filter = PostFilter::published()
            .raw("published_at IS NOT NULL")
            .raw("hero_image_id IS NOT NULL");
        self.fetch_limited(filter, limit).await
    }

    async fn list_by_category(&self, category_id: i64, params: &ListParams) -> Result<PagedResult<Post>> {
        let filter = PostFilter::published().and(
            "id IN (SELECT post_id FROM post_categories WHERE category_id = ?)",
            Arg::Int(category_id),
        );
        self.fetch_page(&filter, params).await
    }

    async fn search(&self, query: &str, params: &ListParams) -> Result<PagedResult<Post>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let condition = format!("search_text LIKE ? ESCAPE '{}'", LIKE_ESCAPE);
        let filter = PostFilter::published().and(&condition, Arg::Text(pattern));
        self.fetch_page(&filter, params).await
    }

    async fn list_related(&self, category_ids: &[i64], exclude_id: i64, limit: i64) -> Result<Vec<Post>> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }
        let condition = format!(
            "id IN (SELECT post_id FROM post_categories WHERE category_id IN ({}))",
            placeholders(category_ids.len())
        );
        let filter = PostFilter::published()
            .and("id <> ?", Arg::Int(exclude_id))
            .and_many(&condition, category_ids.iter().map(|&id| Arg::Int(id)).collect());
        self.fetch_limited(filter, limit).await
    }

    async fn count_published(&self) -> Result<i64> {
        let filter = PostFilter::published();
        self.fetch_count(&filter.count_sql(), &filter.args).await
    }

    async fn count_published_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let filter = PostFilter::published().and("published_at > ?", Arg::Time(since));
        self.fetch_count(&filter.count_sql(), &filter.args).await
    }

    async fn published_dates_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>> {
        let filter = PostFilter::published().and("published_at > ?", Arg::Time(since));
        let sql = format!(
            "SELECT published_at FROM posts WHERE {} ORDER BY published_at DESC",
            filter.where_sql()
        );
        let dates = match self.pool.driver() {
            DatabaseDriver::Sqlite => bind_sqlite(sqlx::query(&sql), &filter.args)
                .fetch_all(self.pool.sqlite()?)
                .await
                .context("Failed to load publication dates")?
                .iter()
                .map(|row| row.get("published_at"))
                .collect(),
            DatabaseDriver::Mysql => bind_mysql(sqlx::query(&sql), &filter.args)
                .fetch_all(self.pool.mysql()?)
                .await
                .context("Failed to load publication dates")?
                .iter()
                .map(|row| row.get("published_at"))
                .collect(),
        };
        Ok(dates)
    }
}

impl SqlxPostRepository {
    async fn fetch_limited(&self, filter: PostFilter, limit: i64) -> Result<Vec<Post>> {
        let mut args = filter.args.clone();
        args.push(Arg::Int(limit));
        self.fetch_posts(&filter.select_sql("LIMIT ?"), &args).await
    }
}

// ============================================================================
// Query building
// ============================================================================

const POST_COLUMNS: &str = "id, title, slug, content, hero_image_id, meta_title, meta_description, \
                            meta_image_id, status, published_at, created_at, updated_at";

const ORDER_NEWEST: &str = "ORDER BY published_at DESC, id DESC";

/// A bound query argument
#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
}

/// WHERE conditions joined with AND, with their arguments in order
#[derive(Debug, Clone)]
struct PostFilter {
    conditions: Vec<String>,
    args: Vec<Arg>,
}

impl PostFilter {
    fn published() -> Self {
        Self {
            conditions: vec![format!("status = '{}'", PostStatus::Published.as_str())],
            args: Vec::new(),
        }
    }

    /// A condition without placeholders
    fn raw(mut self, condition: &str) -> Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// A condition with a single placeholder
    fn and(self, condition: &str, arg: Arg) -> Self {
        self.and_many(condition, vec![arg])
    }

    fn and_many(mut self, condition: &str, args: Vec<Arg>) -> Self {
        self.conditions.push(condition.to_string());
        self.args.extend(args);
        self
    }

    fn where_sql(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn select_sql(&self, tail: &str) -> String {
        format!(
            "SELECT {} FROM posts WHERE {} {} {}",
            POST_COLUMNS,
            self.where_sql(),
            ORDER_NEWEST,
            tail
        )
    }

    fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) AS count FROM posts WHERE {}", self.where_sql())
    }
}

fn bind_sqlite<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &'q [Arg],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            Arg::Int(v) => query.bind(*v),
            Arg::Text(v) => query.bind(v.as_str()),
            Arg::Time(v) => query.bind(*v),
        };
    }
    query
}

fn bind_mysql<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    args: &'q [Arg],
) -> Query<'q, MySql, MySqlArguments> {
    for arg in args {
        query = match arg {
            Arg::Int(v) => query.bind(*v),
            Arg::Text(v) => query.bind(v.as_str()),
            Arg::Time(v) => query.bind(*v),
        };
    }
    query
}

/// Publication timestamp for a new post
fn resolve_published_at(input: &CreatePostInput, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match input.status {
        PostStatus::Published => Some(input.published_at.unwrap_or(now)),
        PostStatus::Draft => input.published_at,
    }
}

fn created_post(input: &CreatePostInput, id: i64, published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Post {
    Post {
        id,
        title: input.title.clone(),
        slug: input.slug.clone(),
        content: input.content.clone(),
        hero_image_id: input.hero_image_id,
        meta_title: input.meta_title.clone(),
        meta_description: input.meta_description.clone(),
        meta_image_id: input.meta_image_id,
        status: input.status,
        published_at,
        created_at: now,
        updated_at: now,
    }
}

/// Lowercased title and meta description, newline separated, matched by
/// `search`. Folding happens here because SQLite's LOWER() is ASCII-only.
fn search_text(title: &str, meta_description: Option<&str>) -> String {
    format!(
        "{}\n{}",
        title.to_lowercase(),
        meta_description.unwrap_or_default().to_lowercase()
    )
}

const INSERT_POST: &str = r#"
    INSERT INTO posts (slug, title, content, hero_image_id, meta_title, meta_description,
                       meta_image_id, status, published_at, created_at, updated_at, search_text)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const LINK_CATEGORY: &str =
    "INSERT INTO post_categories (post_id, category_id, position) VALUES (?, ?, ?)";

const LINK_AUTHOR: &str = "INSERT INTO post_authors (post_id, user_id, position) VALUES (?, ?, ?)";

fn status_from_row(status: &str) -> Result<PostStatus> {
    PostStatus::parse(status).ok_or_else(|| anyhow::anyhow!("Invalid post status: {}", status))
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();
    let published_at = resolve_published_at(input, now);
    let mut tx = pool.begin().await?;

    let id = sqlx::query(INSERT_POST)
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.hero_image_id)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .bind(input.meta_image_id)
        .bind(input.status.as_str())
        .bind(published_at)
        .bind(now)
        .bind(now)
        .bind(search_text(&input.title, input.meta_description.as_deref()))
        .execute(&mut *tx)
        .await
        .context("Failed to create post")?
        .last_insert_rowid();

    for (position, &category_id) in input.category_ids.iter().enumerate() {
        sqlx::query(LINK_CATEGORY)
            .bind(id)
            .bind(category_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .context("Failed to link post category")?;
    }
    for (position, &user_id) in input.author_ids.iter().enumerate() {
        sqlx::query(LINK_AUTHOR)
            .bind(id)
            .bind(user_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .context("Failed to link post author")?;
    }

    tx.commit().await?;
    Ok(created_post(input, id, published_at, now))
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let status: String = row.get("status");
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        hero_image_id: row.get("hero_image_id"),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        meta_image_id: row.get("meta_image_id"),
        status: status_from_row(&status)?,
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();
    let published_at = resolve_published_at(input, now);
    let mut tx = pool.begin().await?;

    let id = sqlx::query(INSERT_POST)
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.hero_image_id)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .bind(input.meta_image_id)
        .bind(input.status.as_str())
        .bind(published_at)
        .bind(now)
        .bind(now)
        .bind(search_text(&input.title, input.meta_description.as_deref()))
        .execute(&mut *tx)
        .await
        .context("Failed to create post")?
        .last_insert_id() as i64;

    for (position, &category_id) in input.category_ids.iter().enumerate() {
        sqlx::query(LINK_CATEGORY)
            .bind(id)
            .bind(category_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .context("Failed to link post category")?;
    }
    for (position, &user_id) in input.author_ids.iter().enumerate() {
        sqlx::query(LINK_AUTHOR)
            .bind(id)
            .bind(user_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .context("Failed to link post author")?;
    }

    tx.commit().await?;
    Ok(created_post(input, id, published_at, now))
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    let status: String = row.get("status");
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        hero_image_id: row.get("hero_image_id"),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        meta_image_id: row.get("meta_image_id"),
        status: status_from_row(&status)?,
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CategoryRepository, MediaRepository, SqlxCategoryRepository, SqlxMediaRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateCategoryInput, CreateMediaInput};
    use chrono::{Duration, TimeZone};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxPostRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxPostRepository::new(pool.clone());
        (pool, repo)
    }

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, n, 12, 0, 0).unwrap()
    }

    async fn category(pool: &DynDatabasePool, slug: &str) -> i64 {
        SqlxCategoryRepository::new(pool.clone())
            .create(&CreateCategoryInput::new(slug.to_uppercase(), slug))
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_filter_sql() {
        let filter = PostFilter::published()
            .raw("published_at IS NOT NULL")
            .and("id <> ?", Arg::Int(4));

        assert_eq!(
            filter.count_sql(),
            "SELECT COUNT(*) AS count FROM posts WHERE status = 'published' AND published_at IS NOT NULL AND id <> ?"
        );
        assert!(filter.select_sql("LIMIT ?").ends_with("ORDER BY published_at DESC, id DESC LIMIT ?"));
        assert_eq!(filter.args, vec![Arg::Int(4)]);
    }

    #[test]
    fn test_resolve_published_at() {
        let now = day(10);
        assert_eq!(resolve_published_at(&CreatePostInput::published("a", "a"), now), Some(now));
        assert_eq!(
            resolve_published_at(&CreatePostInput::published("a", "a").at(day(1)), now),
            Some(day(1))
        );
        assert_eq!(resolve_published_at(&CreatePostInput::draft("a", "a"), now), None);
    }

    #[tokio::test]
    async fn test_create_and_get_published_by_slug() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&CreatePostInput::published("Town hall", "town-hall").at(day(2)))
            .await
            .unwrap();
        repo.create(&CreatePostInput::draft("Draft", "draft")).await.unwrap();

        let found = repo.get_published_by_slug("town-hall").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.published_at, Some(day(2)));
        assert_eq!(found.status, PostStatus::Published);

        assert!(repo.get_published_by_slug("draft").await.unwrap().is_none());
        assert!(repo.get_published_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_latest_orders_and_excludes() {
        let (_pool, repo) = setup_test_repo().await;
        let first = repo.create(&CreatePostInput::published("One", "one").at(day(1))).await.unwrap();
        let third = repo.create(&CreatePostInput::published("Three", "three").at(day(3))).await.unwrap();
        let second = repo.create(&CreatePostInput::published("Two", "two").at(day(2))).await.unwrap();
        repo.create(&CreatePostInput::draft("Hidden", "hidden").at(day(9))).await.unwrap();

        let ids: Vec<i64> = repo.list_latest(10, None).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let ids: Vec<i64> = repo
            .list_latest(10, Some(third.id))
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);

        assert_eq!(repo.list_latest(1, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_featured_requires_hero_image() {
        let (pool, repo) = setup_test_repo().await;
        let media = SqlxMediaRepository::new(pool.clone())
            .create(&CreateMediaInput::new("/hero.jpg"))
            .await
            .unwrap();

        let with_hero = repo
            .create(&CreatePostInput::published("Hero", "hero").at(day(1)).with_hero_image(media.id))
            .await
            .unwrap();
        repo.create(&CreatePostInput::published("Plain", "plain").at(day(2))).await.unwrap();

        let featured = repo.list_featured(6).await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].id, with_hero.id);
    }

    #[tokio::test]
    async fn test_list_by_category_paginates() {
        let (pool, repo) = setup_test_repo().await;
        let economy = category(&pool, "economy").await;
        let health = category(&pool, "health").await;

        for n in 1..=5 {
            repo.create(
                &CreatePostInput::published(format!("Budget {}", n), format!("budget-{}", n))
                    .at(day(n))
                    .in_categories(vec![economy]),
            )
            .await
            .unwrap();
        }
        repo.create(&CreatePostInput::published("Clinic", "clinic").at(day(6)).in_categories(vec![health]))
            .await
            .unwrap();
        repo.create(&CreatePostInput::draft("Draft", "draft-econ").in_categories(vec![economy]))
            .await
            .unwrap();

        let page = repo.list_by_category(economy, &ListParams::new(2, 2)).await.unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 3);
        let slugs: Vec<&str> = page.items.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["budget-3", "budget-2"]);
    }

    #[tokio::test]
    async fn test_search_matches_title_or_description_case_insensitively() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&CreatePostInput::published("Housing Plan", "housing").at(day(1)))
            .await
            .unwrap();
        repo.create(
            &CreatePostInput::published("Speech", "speech")
                .at(day(2))
                .with_meta("Speech", "Remarks on affordable HOUSING"),
        )
        .await
        .unwrap();
        repo.create(&CreatePostInput::published("Transit", "transit").at(day(3)))
            .await
            .unwrap();
        repo.create(&CreatePostInput::draft("Housing draft", "housing-draft"))
            .await
            .unwrap();

        let page = repo.search("housing", &ListParams::new(1, 12)).await.unwrap();
        let slugs: Vec<&str> = page.items.iter().map(|p| p.slug.as_str()).collect();

        assert_eq!(page.total, 2);
        assert_eq!(slugs, vec!["speech", "housing"]);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&CreatePostInput::published("Élections municipales", "elections").at(day(1)))
            .await
            .unwrap();
        repo.create(
            &CreatePostInput::published("Bilan", "bilan")
                .at(day(2))
                .with_meta("Bilan", "Retour sur l'ÉTÉ à Zürich"),
        )
        .await
        .unwrap();

        for query in ["élections", "ÉLECTIONS", "Élections"] {
            let page = repo.search(query, &ListParams::default()).await.unwrap();
            assert_eq!(page.total, 1, "{}", query);
            assert_eq!(page.items[0].slug, "elections");
        }

        let page = repo.search("été à zÜrich", &ListParams::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "bilan");
    }

    #[test]
    fn test_search_text_keeps_fields_apart() {
        assert_eq!(search_text("Élan", Some("Vers l'AVENIR")), "élan\nvers l'avenir");
        assert_eq!(search_text("Title", None), "title\n");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&CreatePostInput::published("Turnout hit 60%", "turnout").at(day(1)))
            .await
            .unwrap();
        repo.create(&CreatePostInput::published("Other news", "other").at(day(2)))
            .await
            .unwrap();

        let page = repo.search("%", &ListParams::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "turnout");

        let page = repo.search("_", &ListParams::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_list_related_shares_category_and_excludes_self() {
        let (pool, repo) = setup_test_repo().await;
        let economy = category(&pool, "economy").await;
        let health = category(&pool, "health").await;

        let source = repo
            .create(&CreatePostInput::published("Source", "source").at(day(5)).in_categories(vec![economy]))
            .await
            .unwrap();
        let sibling = repo
            .create(&CreatePostInput::published("Sibling", "sibling").at(day(4)).in_categories(vec![economy, health]))
            .await
            .unwrap();
        repo.create(&CreatePostInput::published("Unrelated", "unrelated").at(day(6)).in_categories(vec![health]))
            .await
            .unwrap();

        let related = repo.list_related(&[economy], source.id, 3).await.unwrap();
        let ids: Vec<i64> = related.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![sibling.id]);

        assert!(repo.list_related(&[], source.id, 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counts_and_dates() {
        let (_pool, repo) = setup_test_repo().await;
        let now = Utc::now();
        repo.create(&CreatePostInput::published("Old", "old").at(now - Duration::days(90)))
            .await
            .unwrap();
        repo.create(&CreatePostInput::published("Recent", "recent").at(now - Duration::days(3)))
            .await
            .unwrap();
        repo.create(&CreatePostInput::draft("Draft", "draft").at(now)).await.unwrap();

        assert_eq!(repo.count_published().await.unwrap(), 2);
        assert_eq!(
            repo.count_published_since(now - Duration::days(30)).await.unwrap(),
            1
        );

        let dates = repo.published_dates_since(now - Duration::days(365)).await.unwrap();
        assert_eq!(dates.len(), 2);
        assert!(dates[0] > dates[1]);
    }
}
