//! Header global service
//!
//! Builds the Header global from the flat nav items and the `main_logo`
//! setting. The result is cached and invalidated by every write made here.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::{GlobalsRepository, MediaRepository, NavItemRepository, HEADER_MAIN_LOGO};
use crate::models::{build_header_nav, CreateNavItemInput, HeaderGlobal, NavItem};

const CACHE_KEY_HEADER: &str = "globals:header";

pub struct NavItemService {
    nav_repo: Arc<dyn NavItemRepository>,
    globals_repo: Arc<dyn GlobalsRepository>,
    media_repo: Arc<dyn MediaRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl NavItemService {
    pub fn new(
        nav_repo: Arc<dyn NavItemRepository>,
        globals_repo: Arc<dyn GlobalsRepository>,
        media_repo: Arc<dyn MediaRepository>,
        cache: Arc<Cache>,
    ) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            nav_repo,
            globals_repo,
            media_repo,
            cache,
            cache_ttl,
        }
    }

    /// The Header global: logo plus the three-level navigation tree
    pub async fn header(&self) -> Result<HeaderGlobal> {
        if let Some(header) = self.cache.get::<HeaderGlobal>(CACHE_KEY_HEADER).await.ok().flatten() {
            return Ok(header);
        }

        let items = self.nav_repo.list().await.context("Failed to list nav items")?;
        let main_logo = match self.main_logo_id().await? {
            Some(id) => self.media_repo.get_by_id(id).await.context("Failed to load header logo")?,
            None => None,
        };

        let header = HeaderGlobal {
            main_logo,
            nav_items: build_header_nav(items),
        };

        if let Err(e) = self.cache.set(CACHE_KEY_HEADER, &header, self.cache_ttl).await {
            tracing::warn!("Failed to cache header global: {}", e);
        }

        Ok(header)
    }

    pub async fn create(&self, input: CreateNavItemInput) -> Result<NavItem> {
        let item = self.nav_repo.create(&input).await.context("Failed to create nav item")?;
        self.invalidate_cache().await;
        Ok(item)
    }

    /// Point the header logo at a media item, or clear it
    pub async fn set_main_logo(&self, media_id: Option<i64>) -> Result<()> {
        match media_id {
            Some(id) => self.globals_repo.set(HEADER_MAIN_LOGO, &id.to_string()).await?,
            None => self.globals_repo.delete(HEADER_MAIN_LOGO).await?,
        }
        self.invalidate_cache().await;
        Ok(())
    }

    async fn main_logo_id(&self) -> Result<Option<i64>> {
        let value = self
            .globals_repo
            .get(HEADER_MAIN_LOGO)
            .await
            .context("Failed to read header logo setting")?;
        Ok(value.and_then(|v| match v.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Ignoring invalid {} value: {:?}", HEADER_MAIN_LOGO, v);
                None
            }
        }))
    }

    async fn invalidate_cache(&self) {
        if let Err(e) = self.cache.delete(CACHE_KEY_HEADER).await {
            tracing::warn!("Failed to invalidate header cache: {}", e);
        }
    }
}
