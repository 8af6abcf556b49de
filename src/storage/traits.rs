//! Storage traits and error types
//!
//! This module defines the trait interface for article stores and
//! associated error types.

use crate::storage::{ArticleRecord, NewArticle};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Article not found: {0}")]
    NotFound(String),

    /// A create was attempted for a URL that is already stored
    #[error("Article already exists: {0}")]
    Conflict(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for article store implementations
///
/// The store is keyed by article URL. Each call is its own unit of work;
/// no multi-record transaction is assumed.
pub trait ArticleStore {
    /// Looks up an article by exact URL
    fn find_by_url(&self, url: &str) -> StorageResult<Option<ArticleRecord>>;

    /// Returns true if an article with this URL is already stored
    ///
    /// The crawl consults this before spending a fetch on a discovered link.
    fn exists(&self, url: &str) -> StorageResult<bool> {
        Ok(self.find_by_url(url)?.is_some())
    }

    /// Creates a new article
    ///
    /// Fails with [`StorageError::Conflict`] if the URL is already stored.
    fn create(&mut self, article: &NewArticle) -> StorageResult<ArticleRecord>;

    /// Writes back a modified article, matched by its id
    ///
    /// Fails with [`StorageError::NotFound`] if the article no longer exists.
    fn update(&mut self, article: &ArticleRecord) -> StorageResult<ArticleRecord>;

    /// Returns every stored article, most recently created first
    fn find_all(&self) -> StorageResult<Vec<ArticleRecord>>;

    /// Counts stored articles
    fn count(&self) -> StorageResult<u64>;
}
