//! Re-extraction of already stored articles
//!
//! Refreshing re-fetches an article's URL, runs the body strategy chain
//! again and overwrites the stored title and content in place. Two entry
//! points exist:
//! - [`Refresher::refresh_all`] walks every stored article with the full
//!   minimum length and the politeness delay between fetches
//! - [`Refresher::refresh_one`] handles a single URL and accepts a shorter
//!   body, for manual retries of pages that failed the full minimum
//!
//! A failed refresh never modifies the stored record.

use crate::config::Config;
use crate::crawler::content::{ArticleContent, ContentExtractor};
use crate::crawler::rate_limit::RateLimiter;
use crate::crawler::stats::RefreshSummary;
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::storage::{open_storage, ArticleRecord, ArticleStore, StorageError};
use crate::HarvestError;
use reqwest::Client;
use std::path::Path;
use thiserror::Error;

/// Reasons a single-article refresh did not update the record
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("No stored article with URL {0}")]
    NotFound(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Could not extract sufficient content from {url} ({length} characters)")]
    InsufficientContent { url: String, length: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Re-extracts stored articles and writes the results back
pub struct Refresher<S: ArticleStore> {
    store: S,
    client: Client,
    extractor: ContentExtractor,
    limiter: RateLimiter,
    single_min_length: usize,
}

impl<S: ArticleStore> Refresher<S> {
    pub fn new(config: &Config, store: S) -> Result<Self, HarvestError> {
        Ok(Self {
            store,
            client: build_http_client(&config.fetcher)?,
            extractor: ContentExtractor::new(config.crawler.min_content_length),
            limiter: RateLimiter::from_millis(config.crawler.request_delay_ms),
            single_min_length: config.crawler.refresh_min_content_length,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Refreshes every stored article, newest first
    ///
    /// Articles whose page no longer yields the full minimum body are left
    /// untouched and counted as skipped. Fetch and write failures are
    /// counted as errors. Failing to enumerate the store ends the refresh
    /// with a single error and nothing processed.
    pub async fn refresh_all(&mut self) -> RefreshSummary {
        let mut summary = RefreshSummary::default();

        let articles = match self.store.find_all() {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!("Failed to list stored articles: {}", e);
                summary.errors += 1;
                return summary;
            }
        };

        summary.total_articles = articles.len() as u64;
        tracing::info!(total = summary.total_articles, "Starting refresh of stored articles");

        for article in articles {
            self.limiter.wait().await;

            let url = article.url.clone();
            let min_length = self.extractor.min_length();

            match self.refresh_record(article, min_length).await {
                Ok(updated) => {
                    tracing::info!(
                        url = %url,
                        length = updated.content.chars().count(),
                        "Updated article: {}",
                        updated.title
                    );
                    summary.updated += 1;
                }
                Err(RefreshError::InsufficientContent { length, .. }) => {
                    tracing::warn!(url = %url, length, "Could not extract valid content, skipping");
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(url = %url, "Refresh failed: {}", e);
                    summary.errors += 1;
                }
            }
        }

        tracing::info!(
            "Refresh completed: {} of {} articles updated",
            summary.updated,
            summary.total_articles
        );

        summary
    }

    /// Refreshes the stored article with exactly this URL
    ///
    /// Accepts a body down to the single-article minimum. Returns the
    /// updated record, or the reason the record was left unchanged.
    pub async fn refresh_one(&mut self, url: &str) -> Result<ArticleRecord, RefreshError> {
        let article = self
            .store
            .find_by_url(url)?
            .ok_or_else(|| RefreshError::NotFound(url.to_string()))?;

        tracing::info!(url, id = article.id, "Refreshing article");

        let floor = self.single_min_length;
        let updated = self.refresh_record(article, floor).await?;

        tracing::info!(
            url,
            length = updated.content.chars().count(),
            "Updated article: {}",
            updated.title
        );

        Ok(updated)
    }

    /// Fetches and re-extracts one record, persisting it if the body
    /// reaches `floor` characters
    async fn refresh_record(
        &mut self,
        mut article: ArticleRecord,
        floor: usize,
    ) -> Result<ArticleRecord, RefreshError> {
        let body = match fetch_url(&self.client, &article.url).await {
            FetchResult::Success { body } => body,
            failure => {
                return Err(RefreshError::Fetch {
                    url: article.url,
                    reason: failure.describe(),
                })
            }
        };

        let extraction = self.extractor.extract(&body);
        let length = extraction.content_length();

        let Some(ArticleContent { title, content }) = extraction.accept(floor) else {
            return Err(RefreshError::InsufficientContent {
                url: article.url,
                length,
            });
        };

        if !title.is_empty() {
            article.title = title;
        }
        article.updated_content = Some(content.clone());
        article.content = content;
        article.is_updated = true;

        Ok(self.store.update(&article)?)
    }
}

/// Refreshes every article in the configured SQLite database
pub async fn run_refresh_all(config: Config) -> Result<RefreshSummary, HarvestError> {
    let store = open_storage(Path::new(&config.storage.database_path))?;
    let mut refresher = Refresher::new(&config, store)?;
    Ok(refresher.refresh_all().await)
}

/// Refreshes a single article in the configured SQLite database
///
/// The outer error covers opening the store; the inner result is the
/// refresh outcome itself.
pub async fn run_refresh_one(
    config: Config,
    url: &str,
) -> Result<Result<ArticleRecord, RefreshError>, HarvestError> {
    let store = open_storage(Path::new(&config.storage.database_path))?;
    let mut refresher = Refresher::new(&config, store)?;
    Ok(refresher.refresh_one(url).await)
}
