//! civicfolio - content API for a political portfolio website

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use civicfolio::{
    api::{self, AppState},
    cache::create_cache,
    config::Config,
    db,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civicfolio=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting civicfolio...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    // Initialize cache
    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized");

    if config.mail.enabled {
        tracing::info!("Contact notifications go to {:?}", config.mail.notify_to);
    } else {
        tracing::info!("Mail disabled, contact submissions will only be logged");
    }

    // Build application state and router
    let state = AppState::new(pool.clone(), cache, &config.mail)?;

    // Demo mode: seed sample content into an empty database
    #[cfg(feature = "demo")]
    {
        use civicfolio::db::repositories::{SqlxMediaRepository, SqlxUserRepository};
        use civicfolio::services::seed::{seed_demo_content, Seeder};

        let media = SqlxMediaRepository::new(pool.clone());
        let users = SqlxUserRepository::new(pool.clone());
        seed_demo_content(&Seeder {
            posts: &state.post_service,
            categories: &state.category_service,
            nav: &state.nav_service,
            media: &media,
            users: &users,
        })
        .await?;
    }

    let app = api::build_router(state, &config.server.cors_origin)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    pool.close().await;
    Ok(())
}
