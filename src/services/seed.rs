//! Demo content
//!
//! Fills an empty database with sample categories, media, authors, posts and
//! header navigation so the API has something to serve during local
//! development. Only compiled with the `demo` feature.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use crate::db::repositories::{MediaRepository, UserRepository};
use crate::models::{
    CreateCategoryInput, CreateMediaInput, CreateNavItemInput, CreatePostInput, CreateUserInput,
};
use crate::services::{CategoryService, NavItemService, PostService};

/// Where the seeder writes. Posts, categories and navigation go through
/// their services so cached listings stay in step.
pub struct Seeder<'a> {
    pub posts: &'a PostService,
    pub categories: &'a CategoryService,
    pub nav: &'a NavItemService,
    pub media: &'a dyn MediaRepository,
    pub users: &'a dyn UserRepository,
}

/// Seed demo content unless the database already has posts or categories.
///
/// Returns whether anything was written.
pub async fn seed_demo_content(seeder: &Seeder<'_>) -> Result<bool> {
    if seeder.posts.published_count().await? > 0 || seeder.categories.list().await?.total > 0 {
        tracing::info!("Demo mode: content already present, skipping seed");
        return Ok(false);
    }

    let now = Utc::now();

    let mut category_ids = Vec::new();
    for (title, slug) in [
        ("Economy", "economy"),
        ("Education", "education"),
        ("Healthcare", "healthcare"),
        ("Infrastructure", "infrastructure"),
        ("Community", "community"),
    ] {
        let category = seeder
            .categories
            .create(CreateCategoryInput::new(title, slug))
            .await
            .with_context(|| format!("Failed to seed category {}", slug))?;
        category_ids.push(category.id);
    }

    let logo = seeder
        .media
        .create(&CreateMediaInput::new("/media/logo.svg").with_alt("Campaign logo"))
        .await?;
    let townhall = seeder
        .media
        .create(&CreateMediaInput::new("/media/townhall.jpg").with_alt("Town hall meeting"))
        .await?;
    let school = seeder
        .media
        .create(&CreateMediaInput::new("/media/school-visit.jpg").with_alt("School visit"))
        .await?;

    let author = seeder
        .users
        .create(&CreateUserInput {
            name: "Campaign Office".to_string(),
            email: Some("office@example.org".to_string()),
        })
        .await?;

    let posts = [
        CreatePostInput::published("Town hall on the city budget", "town-hall-city-budget")
            .at(now - Duration::days(2))
            .in_categories(vec![category_ids[0], category_ids[4]])
            .with_hero_image(townhall.id)
            .with_meta("City budget town hall", "Join the open discussion on next year's budget.")
            .with_content("# Town hall\n\nWe will walk through the **proposed budget** line by line."),
        CreatePostInput::published("Visiting Lincoln Elementary", "visiting-lincoln-elementary")
            .at(now - Duration::days(12))
            .in_categories(vec![category_ids[1]])
            .with_hero_image(school.id)
            .with_meta("School visit", "Notes from a morning with teachers and students.")
            .with_content("Teachers asked for smaller class sizes and better after-school programs."),
        CreatePostInput::published("Expanding rural clinics", "expanding-rural-clinics")
            .at(now - Duration::days(45))
            .in_categories(vec![category_ids[2]])
            .with_meta("Rural clinics", "A plan to add three clinics in the county.")
            .with_content("- Three new clinics\n- Extended evening hours\n- Mobile screening vans"),
        CreatePostInput::published("Fixing the Route 9 bridge", "fixing-route-9-bridge")
            .at(now - Duration::days(120))
            .in_categories(vec![category_ids[3]])
            .with_content("Repairs start in spring and the bridge stays open to one lane."),
        CreatePostInput::published("Thank you, volunteers", "thank-you-volunteers")
            .at(now - Duration::days(400))
            .with_content("Over 300 volunteers knocked on doors this season."),
        CreatePostInput::draft("Small business grants", "small-business-grants")
            .in_categories(vec![category_ids[0]])
            .with_content("Draft: eligibility rules are still being finalized."),
    ];
    for input in posts {
        seeder
            .posts
            .create(input.by_authors(vec![author.id]))
            .await
            .context("Failed to seed post")?;
    }

    nav(seeder.nav, None, "Home", Some("home"), "/", 1).await?;
    let issues = nav(seeder.nav, None, "Issues", Some("list"), "/issues", 2).await?;
    let economy = nav(seeder.nav, Some(issues), "Economy", None, "/posts/categories/economy", 1).await?;
    nav(seeder.nav, Some(economy), "Jobs plan", None, "/posts/jobs-plan", 1).await?;
    nav(seeder.nav, Some(issues), "Education", None, "/posts/categories/education", 2).await?;
    nav(seeder.nav, None, "Contact", Some("mail"), "/contact", 3).await?;

    seeder.nav.set_main_logo(Some(logo.id)).await?;

    tracing::info!("Demo mode: seeded sample content");
    Ok(true)
}

async fn nav(
    service: &NavItemService,
    parent_id: Option<i64>,
    name: &str,
    icon: Option<&str>,
    path: &str,
    sort_order: i64,
) -> Result<i64> {
    let item = service
        .create(CreateNavItemInput {
            parent_id,
            name: name.to_string(),
            icon: icon.map(str::to_string),
            path: path.to_string(),
            sort_order,
        })
        .await?;
    Ok(item.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxGlobalsRepository, SqlxMediaRepository, SqlxNavItemRepository,
        SqlxPostRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};

    #[tokio::test]
    async fn test_seed_once() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let cache = create_cache(&CacheConfig::default());

        let categories_repo = SqlxCategoryRepository::boxed(pool.clone());
        let media = SqlxMediaRepository::boxed(pool.clone());
        let users = SqlxUserRepository::boxed(pool.clone());
        let posts = PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            categories_repo.clone(),
            media.clone(),
            users.clone(),
            cache.clone(),
        );
        let categories = CategoryService::new(categories_repo, cache.clone());
        let nav = NavItemService::new(
            SqlxNavItemRepository::boxed(pool.clone()),
            SqlxGlobalsRepository::boxed(pool),
            media.clone(),
            cache,
        );
        let seeder = Seeder {
            posts: &posts,
            categories: &categories,
            nav: &nav,
            media: media.as_ref(),
            users: users.as_ref(),
        };

        // The emptiness check warms both caches before anything is written
        assert!(nav.header().await.unwrap().nav_items.is_empty());
        assert!(seed_demo_content(&seeder).await.unwrap());

        assert_eq!(posts.published_count().await.unwrap(), 5);
        let listing = categories.list().await.unwrap();
        assert_eq!(listing.total, 5);
        let economy = listing
            .categories
            .iter()
            .find(|c| c.category.slug == "economy")
            .unwrap();
        assert_eq!(economy.post_count, 1);

        let header = nav.header().await.unwrap();
        assert_eq!(header.nav_items.len(), 3);
        assert_eq!(header.main_logo.unwrap().url, "/media/logo.svg");

        assert!(!seed_demo_content(&seeder).await.unwrap());
        assert_eq!(categories.list().await.unwrap().total, 5);
    }
}
