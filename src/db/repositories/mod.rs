//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the queries for a specific entity.

pub mod category;
pub mod contact;
pub mod globals;
pub mod media;
pub mod nav_item;
pub mod post;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use contact::{ContactRepository, SqlxContactRepository};
pub use globals::{GlobalsRepository, SqlxGlobalsRepository, HEADER_MAIN_LOGO};
pub use media::{MediaRepository, SqlxMediaRepository};
pub use nav_item::{NavItemRepository, SqlxNavItemRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use user::{SqlxUserRepository, UserRepository};

/// `?, ?, ?` with `count` placeholders, for `IN (...)` lists
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Escape character for LIKE patterns. A backslash would need different
/// quoting in SQLite and MySQL string literals.
pub(crate) const LIKE_ESCAPE: char = '!';

/// Escape `%`, `_` and the escape character itself so user input matches
/// literally inside a `LIKE ... ESCAPE '!'` pattern
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
