//! Archive grouping and post statistics
//!
//! Pure functions over already-loaded posts, so the grouping rules can be
//! tested without a database. All calendar math is done in UTC.

use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;

use crate::models::{ArchiveMonth, ArchivePost, ArchiveYear, CategoryStat, MonthlyStat, Post};

/// Group posts into years (newest first) and months (January first).
///
/// Posts without a publication date are skipped. Within a month, posts keep
/// the order they were given in.
pub fn group_archive(posts: &[Post]) -> Vec<ArchiveYear> {
    let mut years: BTreeMap<i32, BTreeMap<u32, Vec<ArchivePost>>> = BTreeMap::new();

    for post in posts {
        let Some(published_at) = post.published_at else {
            continue;
        };
        years
            .entry(published_at.year())
            .or_default()
            .entry(published_at.month())
            .or_default()
            .push(ArchivePost {
                title: post.title.clone(),
                slug: post.slug.clone(),
                published_at,
            });
    }

    years
        .into_iter()
        .rev()
        .map(|(year, months)| {
            let months: Vec<ArchiveMonth> = months
                .into_iter()
                .map(|(month, posts)| ArchiveMonth {
                    month,
                    month_name: month_name(month),
                    post_count: posts.len() as i64,
                    posts,
                })
                .collect();
            let total_posts = months.iter().map(|m| m.post_count).sum();
            ArchiveYear {
                year,
                months,
                total_posts,
            }
        })
        .collect()
}

/// English name of a 1-based month
pub fn month_name(month: u32) -> String {
    chrono::Month::try_from(month as u8)
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

/// Count publication dates per "YYYY-MM", newest month first
pub fn monthly_stats(dates: &[DateTime<Utc>]) -> Vec<MonthlyStat> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for date in dates {
        *counts.entry(date.format("%Y-%m").to_string()).or_default() += 1;
    }
    counts
        .into_iter()
        .rev()
        .map(|(month, count)| MonthlyStat { month, count })
        .collect()
}

/// Sort category stats by post count, highest first. Ties keep their input
/// order.
pub fn rank_category_stats(mut stats: Vec<CategoryStat>) -> Vec<CategoryStat> {
    stats.sort_by(|a, b| b.post_count.cmp(&a.post_count));
    stats
}
