//! Data models
//!
//! Database entities (Post, Category, Media, User, ContactSubmission,
//! NavItem), the response shapes built from them, and input types.

mod archive;
mod category;
mod contact;
mod media;
mod nav_item;
mod post;
mod user;

pub use archive::{
    ArchiveMonth, ArchivePost, ArchiveYear, CategoryStat, LatestPost, MonthlyStat, PostStats,
};
pub use category::{Category, CategoryRef, CategoryWithCount, CreateCategoryInput};
pub use contact::{ContactFormRequest, ContactStatus, ContactSubmission, CreateContactInput};
pub use media::{CreateMediaInput, Media};
pub use nav_item::{
    build_header_nav, CreateNavItemInput, DropdownItem, HeaderGlobal, HeaderNavItem, NavItem,
    SubDropdownItem,
};
pub use post::{
    CreatePostInput, ListParams, PagedResult, Post, PostDetail, PostMeta, PostStatus, PostSummary,
};
pub use user::{CreateUserInput, PopulatedAuthor, User};
