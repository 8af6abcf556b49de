//! Storage module for persisting articles
//!
//! This module defines the record types and the read/write contract the
//! pipeline needs from its store, plus a SQLite-backed implementation:
//! - Exact-match lookup by URL (the dedup check)
//! - Creation of new articles with URL uniqueness enforced
//! - In-place updates for refreshed articles
//! - Enumeration of all articles, newest first

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteArticleStore;
pub use traits::{ArticleStore, StorageError, StorageResult};

use crate::HarvestError;
use serde::Serialize;
use std::path::Path;

/// Initializes or opens an article store
pub fn open_storage(path: &Path) -> Result<SqliteArticleStore, HarvestError> {
    SqliteArticleStore::new(path)
}

/// A persisted article
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: i64,
    /// Natural key, immutable after creation
    pub url: String,
    pub title: String,
    /// Whitespace-collapsed body text
    pub content: String,
    /// Latest refreshed extraction, set only by the refresh path
    pub updated_content: Option<String>,
    /// Index page where the article was first seen
    pub page_number: Option<u32>,
    pub is_updated: bool,
    pub references: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// An article about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    pub page_number: Option<u32>,
}
