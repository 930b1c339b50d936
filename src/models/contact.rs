//! Contact form submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContactStatus {
    #[default]
    New,
    InProgress,
    Replied,
    Closed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::InProgress => "in-progress",
            ContactStatus::Replied => "replied",
            ContactStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ContactStatus::New),
            "in-progress" => Some(ContactStatus::InProgress),
            "replied" => Some(ContactStatus::Replied),
            "closed" => Some(ContactStatus::Closed),
            _ => None,
        }
    }
}

/// A stored contact form submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The JSON body posted by the contact form
///
/// Every field is optional here so that missing fields surface as
/// validation errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFormRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// Validated input ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct CreateContactInput {
    pub full_name: String,
    pub email: String,
    /// `None` when the form left the phone blank
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub ip_address: String,
    pub user_agent: String,
}
