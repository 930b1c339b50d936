//! Archive and statistics response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post listed inside an archive month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchivePost {
    pub title: String,
    pub slug: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveMonth {
    /// 1-based month number
    pub month: u32,
    /// English month name, e.g. "March"
    pub month_name: String,
    pub posts: Vec<ArchivePost>,
    pub post_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveYear {
    pub year: i32,
    pub months: Vec<ArchiveMonth>,
    pub total_posts: i64,
}

/// The newest published post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatestPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub post_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyStat {
    /// "YYYY-MM"
    pub month: String,
    pub count: i64,
}

/// Aggregate numbers for the published posts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostStats {
    pub total_posts: i64,
    pub recent_posts: i64,
    pub latest_post: Option<LatestPost>,
    pub category_stats: Vec<CategoryStat>,
    pub monthly_stats: Vec<MonthlyStat>,
    pub top_categories: Vec<CategoryStat>,
}
