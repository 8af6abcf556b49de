//! Statistics generation from the article store
//!
//! This module provides functionality for summarising what the store
//! currently holds, independent of any single run.

use crate::storage::{ArticleStore, StorageResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Store contents summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatistics {
    /// Total number of stored articles
    pub total_articles: u64,

    /// Articles refreshed at least once
    pub updated_articles: u64,

    /// Articles kept as URL-only records with no body
    pub empty_articles: u64,

    /// Article count by the index page where each was first seen
    pub articles_by_page: BTreeMap<u32, u64>,

    /// Articles with no recorded index page
    pub unpaged_articles: u64,
}

/// Loads statistics from the store
pub fn load_statistics(store: &dyn ArticleStore) -> StorageResult<StoreStatistics> {
    let articles = store.find_all()?;
    let mut stats = StoreStatistics {
        total_articles: articles.len() as u64,
        ..StoreStatistics::default()
    };

    for article in &articles {
        if article.is_updated {
            stats.updated_articles += 1;
        }
        if article.content.is_empty() {
            stats.empty_articles += 1;
        }
        match article.page_number {
            Some(page) => *stats.articles_by_page.entry(page).or_insert(0) += 1,
            None => stats.unpaged_articles += 1,
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Total articles: {}", stats.total_articles);
    println!("  Refreshed: {}", stats.updated_articles);
    println!("  Without content: {}", stats.empty_articles);
    println!();

    if stats.articles_by_page.is_empty() && stats.unpaged_articles == 0 {
        return;
    }

    println!("Articles by Index Page:");
    for (page, count) in &stats.articles_by_page {
        let percentage = if stats.total_articles > 0 {
            (*count as f64 / stats.total_articles as f64) * 100.0
        } else {
            0.0
        };
        println!("  Page {}: {} ({:.1}%)", page, count, percentage);
    }
    if stats.unpaged_articles > 0 {
        println!("  Unknown: {}", stats.unpaged_articles);
    }
}
