//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories. They:
//! - Validate input
//! - Hydrate stored rows into response shapes
//! - Cache read-mostly listings and invalidate them on writes

pub mod archive;
pub mod category;
pub mod contact;
pub mod email;
pub mod markdown;
pub mod nav_item;
pub mod post;
#[cfg(feature = "demo")]
pub mod seed;

pub use category::{CategoryListing, CategoryService, CategoryServiceError};
pub use contact::{ContactService, ContactServiceError, ContactValidator, FieldError, RequestOrigin};
pub use email::EmailService;
pub use markdown::MarkdownRenderer;
pub use nav_item::NavItemService;
pub use post::{CategoryPosts, PostService, PostServiceError};
