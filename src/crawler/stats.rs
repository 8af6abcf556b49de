//! Per-run outcome counters
//!
//! A [`RunStats`] value is created at the start of a crawl, passed by
//! mutable reference through each step of the loop and handed back to the
//! caller when the run ends. It is never persisted.

use serde::Serialize;

/// Counters for one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Index pages fetched and parsed, including the empty page ending pagination
    pub pages_processed: u64,
    /// New articles persisted
    pub saved: u64,
    /// Discovered links already present in the store
    pub duplicates: u64,
    /// Articles that could not be fetched or yielded too little content
    pub skipped: u64,
    /// Page-level network failures, lookup failures, and create conflicts
    pub errors: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&mut self) {
        self.pages_processed += 1;
    }

    pub fn record_saved(&mut self) {
        self.saved += 1;
    }

    pub fn record_duplicate(&mut self) {
        self.duplicates += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}

/// Tally returned by a bulk refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    /// Articles in the store when the refresh started
    pub total_articles: u64,
    pub updated: u64,
    /// Articles whose page no longer yields enough content
    pub skipped: u64,
    /// Fetch or storage failures
    pub errors: u64,
}
