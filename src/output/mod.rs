//! Output module for reporting run results and store contents
//!
//! This module handles:
//! - Printing crawl and refresh counters for people
//! - Rendering the same results as JSON for scripts
//! - Summarising what the article store holds

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::crawler::{RefreshSummary, RunStats};
use crate::storage::ArticleRecord;
use serde::Serialize;

/// Number of characters shown when previewing article content
const PREVIEW_CHARS: usize = 200;

/// Renders any report value as pretty-printed JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Prints the counters of a finished crawl run
pub fn print_run_stats(stats: &RunStats) {
    println!("=== Crawl Complete ===\n");
    println!("  Pages processed: {}", stats.pages_processed);
    println!("  Saved: {}", stats.saved);
    println!("  Duplicates: {}", stats.duplicates);
    println!("  Skipped: {}", stats.skipped);
    println!("  Errors: {}", stats.errors);
}

/// Prints the tally of a bulk refresh
pub fn print_refresh_summary(summary: &RefreshSummary) {
    println!("=== Refresh Complete ===\n");
    println!("  Total articles: {}", summary.total_articles);
    println!("  Updated: {}", summary.updated);
    println!("  Skipped: {}", summary.skipped);
    println!("  Errors: {}", summary.errors);
}

/// Prints one stored article with a short content preview
pub fn print_article(article: &ArticleRecord) {
    println!("ID: {}", article.id);
    println!("Title: {}", article.title);
    println!("URL: {}", article.url);
    if let Some(page) = article.page_number {
        println!("Index page: {}", page);
    }
    println!("Refreshed: {}", if article.is_updated { "yes" } else { "no" });
    println!("Updated at: {}", article.updated_at);
    println!(
        "Content ({} characters): {}",
        article.content.chars().count(),
        content_preview(&article.content)
    );
}

/// First characters of `content`, with an ellipsis when truncated
pub fn content_preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        return content.to_string();
    }
    let head: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}
