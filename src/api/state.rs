//! Application state shared by handlers

use anyhow::Result;
use std::sync::Arc;

use crate::cache::Cache;
use crate::config::MailConfig;
use crate::db::repositories::{
    SqlxCategoryRepository, SqlxContactRepository, SqlxGlobalsRepository, SqlxMediaRepository,
    SqlxNavItemRepository, SqlxPostRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{CategoryService, ContactService, EmailService, NavItemService, PostService};

#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub post_service: Arc<PostService>,
    pub category_service: Arc<CategoryService>,
    pub contact_service: Arc<ContactService>,
    pub nav_service: Arc<NavItemService>,
}

impl AppState {
    /// Wire repositories and services over one pool and cache
    pub fn new(pool: DynDatabasePool, cache: Arc<Cache>, mail: &MailConfig) -> Result<Self> {
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let media_repo = SqlxMediaRepository::boxed(pool.clone());
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let contact_repo = SqlxContactRepository::boxed(pool.clone());
        let nav_repo = SqlxNavItemRepository::boxed(pool.clone());
        let globals_repo = SqlxGlobalsRepository::boxed(pool.clone());

        let post_service = Arc::new(PostService::new(
            post_repo,
            category_repo.clone(),
            media_repo.clone(),
            user_repo,
            cache.clone(),
        ));
        let category_service = Arc::new(CategoryService::new(category_repo, cache.clone()));
        let email_service = Arc::new(EmailService::new(mail.clone()));
        let contact_service = Arc::new(ContactService::new(contact_repo, email_service)?);
        let nav_service = Arc::new(NavItemService::new(nav_repo, globals_repo, media_repo, cache));

        Ok(Self {
            pool,
            post_service,
            category_service,
            contact_service,
            nav_service,
        })
    }
}
