//! Media model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded image or file referenced by posts and globals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    /// Public URL of the file
    pub url: String,
    /// Alternative text for images
    pub alt: Option<String>,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a media reference
#[derive(Debug, Clone, Default)]
pub struct CreateMediaInput {
    pub url: String,
    pub alt: Option<String>,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

impl CreateMediaInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_serializes_camel_case() {
        let media = Media {
            id: 3,
            url: "/media/townhall.jpg".to_string(),
            alt: Some("Town hall".to_string()),
            filename: Some("townhall.jpg".to_string()),
            mime_type: Some("image/jpeg".to_string()),
            width: Some(1200),
            height: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["mimeType"], "image/jpeg");
        assert_eq!(json["alt"], "Town hall");
        assert!(json["height"].is_null());
        assert!(json.get("createdAt").is_some());
    }
}
