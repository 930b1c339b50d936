//! HTTP contract tests
//!
//! Drive the full router against an in-memory SQLite database.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use civicfolio::api::{build_router, AppState};
use civicfolio::cache::create_cache;
use civicfolio::config::{CacheConfig, MailConfig};
use civicfolio::db::repositories::{
    CategoryRepository, GlobalsRepository, MediaRepository, NavItemRepository, PostRepository,
    SqlxCategoryRepository, SqlxGlobalsRepository, SqlxMediaRepository, SqlxNavItemRepository,
    SqlxPostRepository, HEADER_MAIN_LOGO,
};
use civicfolio::db::{create_test_pool, migrations, DynDatabasePool};
use civicfolio::models::{CreateCategoryInput, CreateMediaInput, CreateNavItemInput, CreatePostInput};

struct TestApp {
    router: Router,
    pool: DynDatabasePool,
    state: AppState,
}

impl TestApp {
    async fn new() -> Self {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let state = AppState::new(
            pool.clone(),
            create_cache(&CacheConfig::default()),
            &MailConfig::default(),
        )
        .unwrap();
        let router = build_router(state.clone(), "http://localhost:3000").unwrap();
        Self { router, pool, state }
    }

    fn posts(&self) -> SqlxPostRepository {
        SqlxPostRepository::new(self.pool.clone())
    }

    async fn category(&self, title: &str, slug: &str) -> i64 {
        SqlxCategoryRepository::new(self.pool.clone())
            .create(&CreateCategoryInput::new(title, slug))
            .await
            .unwrap()
            .id
    }

    async fn post(&self, input: CreatePostInput) -> i64 {
        self.posts().create(&input).await.unwrap().id
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.20")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
}

fn slugs(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap().to_string())
        .collect()
}

fn field_messages(body: &Value, field: &str) -> Vec<String> {
    body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["field"] == field)
        .map(|e| e["message"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn search_without_query_is_rejected() {
    let app = TestApp::new().await;

    for uri in ["/api/v1/posts/search", "/api/v1/posts/search?q=", "/api/v1/posts/search?q=%20%20"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().is_some());
    }
}

#[tokio::test]
async fn search_matches_published_posts_and_echoes_query() {
    let app = TestApp::new().await;
    app.post(CreatePostInput::published("Bridge repairs begin", "bridge-repairs").at(at(2024, 4, 1)))
        .await;
    app.post(
        CreatePostInput::published("Spring update", "spring-update")
            .at(at(2024, 4, 2))
            .with_meta("Spring", "News about the BRIDGE and parks"),
    )
    .await;
    app.post(CreatePostInput::draft("Bridge draft", "bridge-draft")).await;

    let (status, body) = app.get("/api/v1/posts/search?q=bridge&limit=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["query"], "bridge");
    assert_eq!(slugs(&body), vec!["spring-update"]);
    assert_eq!(
        body["pagination"],
        json!({ "page": 1, "totalPages": 2, "totalDocs": 2, "hasNextPage": true, "hasPrevPage": false })
    );
}

#[tokio::test]
async fn search_folds_accented_text_and_echoes_trimmed_query() {
    let app = TestApp::new().await;
    app.post(CreatePostInput::published("Élections municipales", "elections-municipales").at(at(2024, 6, 1)))
        .await;

    let (status, body) = app.get("/api/v1/posts/search?q=%C3%A9lections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slugs(&body), vec!["elections-municipales"]);

    let (status, body) = app.get("/api/v1/posts/search?q=%20%C3%89LECTIONS%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "ÉLECTIONS");
    assert_eq!(body["pagination"]["totalDocs"], 1);
}

#[tokio::test]
async fn repeated_query_keys_use_the_first_value() {
    let app = TestApp::new().await;
    app.post(CreatePostInput::published("Budget vote", "budget-vote").at(at(2024, 6, 1))).await;

    let (status, body) = app.get("/api/v1/posts/search?q=budget&q=transit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "budget");
    assert_eq!(slugs(&body), vec!["budget-vote"]);

    let (status, body) = app.get("/api/v1/posts/related/budget-vote?limit=1&limit=9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

// ============================================================================
// Category listing
// ============================================================================

#[tokio::test]
async fn posts_by_category_requires_known_slug() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/posts/categories").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category slug is required");

    let (status, _) = app.get("/api/v1/posts/categories?category=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/v1/posts/categories?category=unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category not found");
}

#[tokio::test]
async fn posts_by_category_paginates_and_returns_category() {
    let app = TestApp::new().await;
    let transit = app.category("Transit", "transit").await;
    for day in 1..=3 {
        app.post(
            CreatePostInput::published(format!("Transit {}", day), format!("transit-{}", day))
                .at(at(2024, 2, day))
                .in_categories(vec![transit]),
        )
        .await;
    }

    let (status, body) = app.get("/api/v1/posts/categories?category=transit&page=2&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["slug"], "transit");
    assert_eq!(slugs(&body), vec!["transit-1"]);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["hasPrevPage"], true);
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["data"][0]["categories"][0]["title"], "Transit");
}

#[tokio::test]
async fn categories_listing_counts_published_posts() {
    let app = TestApp::new().await;
    let parks = app.category("Parks", "parks").await;
    app.category("Arts", "arts").await;
    app.post(CreatePostInput::published("New park", "new-park").in_categories(vec![parks])).await;
    app.post(CreatePostInput::draft("Park draft", "park-draft").in_categories(vec![parks])).await;

    let (status, body) = app.get("/api/v1/categories").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["slug"], "arts");
    assert_eq!(body["data"][0]["postCount"], 0);
    assert_eq!(body["data"][1]["postCount"], 1);
}

#[tokio::test]
async fn categories_listing_reflects_newly_published_posts() {
    let app = TestApp::new().await;
    let parks = app.category("Parks", "parks").await;

    let (_, body) = app.get("/api/v1/categories").await;
    assert_eq!(body["data"][0]["postCount"], 0);

    app.state
        .post_service
        .create(CreatePostInput::published("New park", "new-park").in_categories(vec![parks]))
        .await
        .unwrap();

    let (_, body) = app.get("/api/v1/categories").await;
    assert_eq!(body["data"][0]["postCount"], 1);
}

// ============================================================================
// Latest, featured, related, detail
// ============================================================================

#[tokio::test]
async fn latest_and_featured() {
    let app = TestApp::new().await;
    let hero = SqlxMediaRepository::new(app.pool.clone())
        .create(&CreateMediaInput::new("/media/rally.jpg").with_alt("Rally"))
        .await
        .unwrap();
    for day in 1..=6 {
        let mut input = CreatePostInput::published(format!("Post {}", day), format!("post-{}", day)).at(at(2024, 3, day));
        if day % 2 == 0 {
            input = input.with_hero_image(hero.id);
        }
        app.post(input).await;
    }

    let (status, body) = app.get("/api/v1/posts/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(slugs(&body)[0], "post-6");

    let (_, body) = app.get("/api/v1/posts/featured?limit=2").await;
    assert_eq!(slugs(&body), vec!["post-6", "post-4"]);
    assert_eq!(body["data"][0]["heroImage"]["alt"], "Rally");
}

#[tokio::test]
async fn related_without_categories_returns_latest_excluding_itself() {
    let app = TestApp::new().await;
    let own_id = app.post(CreatePostInput::published("Solo", "solo").at(at(2024, 5, 10))).await;
    app.post(CreatePostInput::published("Newer", "newer").at(at(2024, 5, 12))).await;
    app.post(CreatePostInput::published("Older", "older").at(at(2024, 5, 1))).await;
    app.post(CreatePostInput::published("Oldest", "oldest").at(at(2024, 4, 1))).await;
    app.post(CreatePostInput::published("Ancient", "ancient").at(at(2023, 4, 1))).await;

    let (status, body) = app.get("/api/v1/posts/related/solo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(slugs(&body), vec!["newer", "older", "oldest"]);
    for post in body["data"].as_array().unwrap() {
        assert_ne!(post["id"], own_id);
    }
}

#[tokio::test]
async fn related_unknown_post_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/v1/posts/related/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found");
}

#[tokio::test]
async fn post_detail_renders_content() {
    let app = TestApp::new().await;
    app.post(
        CreatePostInput::published("Platform", "platform")
            .at(at(2024, 1, 15))
            .with_content("## Priorities\n\n1. Housing\n2. Transit"),
    )
    .await;

    let (status, body) = app.get("/api/v1/posts/platform").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "platform");
    assert!(body["data"]["contentHtml"].as_str().unwrap().contains("<h2>Priorities</h2>"));
    assert!(body["data"]["populatedAuthors"].as_array().unwrap().is_empty());

    let (status, _) = app.get("/api/v1/posts/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Archive and stats
// ============================================================================

#[tokio::test]
async fn archive_groups_are_exhaustive_and_consistent() {
    let app = TestApp::new().await;
    let dates = [
        at(2024, 3, 3),
        at(2024, 3, 28),
        at(2024, 11, 5),
        at(2023, 1, 9),
        at(2023, 12, 31),
        at(2022, 7, 4),
    ];
    for (i, date) in dates.iter().enumerate() {
        app.post(CreatePostInput::published(format!("Post {}", i), format!("post-{}", i)).at(*date))
            .await;
    }
    app.post(CreatePostInput::draft("Draft", "draft").at(at(2024, 3, 5))).await;

    let (status, body) = app.get("/api/v1/posts/archive").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], dates.len());

    let years = body["data"].as_array().unwrap();
    let year_numbers: Vec<i64> = years.iter().map(|y| y["year"].as_i64().unwrap()).collect();
    assert_eq!(year_numbers, vec![2024, 2023, 2022]);

    let mut seen = Vec::new();
    for year in years {
        let months = year["months"].as_array().unwrap();
        let month_sum: i64 = months.iter().map(|m| m["postCount"].as_i64().unwrap()).sum();
        assert_eq!(year["totalPosts"].as_i64().unwrap(), month_sum);

        for month in months {
            let posts = month["posts"].as_array().unwrap();
            assert_eq!(month["postCount"].as_u64().unwrap(), posts.len() as u64);
            for post in posts {
                let published: DateTime<Utc> = post["publishedAt"].as_str().unwrap().parse().unwrap();
                assert_eq!(published.year() as i64, year["year"].as_i64().unwrap());
                assert_eq!(published.month() as u64, month["month"].as_u64().unwrap());
                seen.push(post["slug"].as_str().unwrap().to_string());
            }
        }
    }

    seen.sort();
    let mut expected: Vec<String> = (0..dates.len()).map(|i| format!("post-{}", i)).collect();
    expected.sort();
    assert_eq!(seen, expected);

    let march = &years[0]["months"][0];
    assert_eq!(march["monthName"], "March");
    assert_eq!(march["postCount"], 2);
}

#[tokio::test]
async fn stats_total_matches_published_count_and_is_stable() {
    let app = TestApp::new().await;
    let now = Utc::now();
    let budget = app.category("Budget", "budget").await;
    app.post(CreatePostInput::published("Recent", "recent").at(now - Duration::days(3)).in_categories(vec![budget]))
        .await;
    app.post(CreatePostInput::published("Last year", "last-year").at(now - Duration::days(200))).await;
    app.post(CreatePostInput::draft("Draft", "draft")).await;

    let (status, first) = app.get("/api/v1/posts/stats").await;
    assert_eq!(status, StatusCode::OK);

    let published = app.posts().count_published().await.unwrap();
    assert_eq!(first["data"]["totalPosts"], published);
    assert_eq!(first["data"]["totalPosts"], 2);
    assert_eq!(first["data"]["recentPosts"], 1);
    assert_eq!(first["data"]["latestPost"]["slug"], "recent");
    assert_eq!(first["data"]["topCategories"][0]["postCount"], 1);

    let (_, second) = app.get("/api/v1/posts/stats").await;
    assert_eq!(second["data"]["totalPosts"], first["data"]["totalPosts"]);
}

// ============================================================================
// Contact form
// ============================================================================

fn contact_body(full_name: &str, message: &str) -> String {
    json!({
        "fullName": full_name,
        "email": "resident@example.org",
        "phone": "+1 555 0199",
        "subject": "Street lights",
        "message": message,
    })
    .to_string()
}

#[tokio::test]
async fn contact_rejects_short_message() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/api/contact", &contact_body("Jane Doe", "Too short"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(
        field_messages(&body, "message"),
        vec!["Message must be at least 10 characters".to_string()]
    );
}

#[tokio::test]
async fn contact_rejects_name_with_digits() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/api/contact", &contact_body("R2 D2", "The lights on 5th street are out."))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        field_messages(&body, "fullName"),
        vec!["Full name can only contain letters and spaces".to_string()]
    );
}

#[tokio::test]
async fn contact_accepts_valid_submission() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/api/contact", &contact_body("Jane Doe", "The lights on 5th street are out."))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Contact form submitted successfully");
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn contact_rejects_invalid_json() {
    let app = TestApp::new().await;

    let (status, body) = app.post_json("/api/contact", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON body");
}

#[tokio::test]
async fn contact_reports_missing_fields() {
    let app = TestApp::new().await;

    let (status, body) = app.post_json("/api/contact", "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);
    assert_eq!(field_messages(&body, "email"), vec!["Required".to_string()]);
}

// ============================================================================
// Globals, health, fallback
// ============================================================================

#[tokio::test]
async fn header_global_nests_navigation() {
    let app = TestApp::new().await;
    let nav = SqlxNavItemRepository::new(app.pool.clone());
    let logo = SqlxMediaRepository::new(app.pool.clone())
        .create(&CreateMediaInput::new("/media/logo.svg"))
        .await
        .unwrap();
    SqlxGlobalsRepository::new(app.pool.clone())
        .set(HEADER_MAIN_LOGO, &logo.id.to_string())
        .await
        .unwrap();
    let about = nav
        .create(&CreateNavItemInput {
            parent_id: None,
            name: "About".to_string(),
            icon: Some("user".to_string()),
            path: "/about".to_string(),
            sort_order: 1,
        })
        .await
        .unwrap();
    nav.create(&CreateNavItemInput {
        parent_id: Some(about.id),
        name: "Record".to_string(),
        icon: None,
        path: "/about/record".to_string(),
        sort_order: 1,
    })
    .await
    .unwrap();

    let (status, body) = app.get("/api/v1/globals/header").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mainLogo"]["url"], "/media/logo.svg");
    assert_eq!(body["data"]["navItems"][0]["icon"], "user");
    assert_eq!(body["data"]["navItems"][0]["dropdown"][0]["name"], "Record");
    assert!(body["data"]["navItems"][0]["dropdown"][0]["subDropdown"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "status": "ok" }));

    let (status, body) = app.get("/api/v1/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
