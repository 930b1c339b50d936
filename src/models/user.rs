//! Author model
//!
//! Users exist only as post authors. Public responses expose their id and
//! name as `populatedAuthors`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The public projection of an author attached to a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulatedAuthor {
    pub id: i64,
    pub name: String,
}

impl From<&User> for PopulatedAuthor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Input for creating an author
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub name: String,
    pub email: Option<String>,
}
