//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ArticleStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use crate::storage::{ArticleRecord, NewArticle};
use crate::HarvestError;
use chrono::{SecondsFormat, Utc};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const ARTICLE_COLUMNS: &str = "id, url, title, content, updated_content, page_number, is_updated,
     created_at, updated_at";

/// SQLite article store
pub struct SqliteArticleStore {
    conn: Connection,
}

impl SqliteArticleStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn get_by_id(&self, id: i64) -> StorageResult<Option<ArticleRecord>> {
        let sql = format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS);
        let article = self
            .conn
            .query_row(&sql, params![id], row_to_article)
            .optional()?;

        article.map(|a| self.with_references(a)).transpose()
    }

    fn with_references(&self, mut article: ArticleRecord) -> StorageResult<ArticleRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT reference FROM article_references WHERE article_id = ?1 ORDER BY id",
        )?;

        article.references = stmt
            .query_map(params![article.id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(article)
    }

    fn replace_references(&self, article_id: i64, references: &[String]) -> StorageResult<()> {
        self.conn.execute(
            "DELETE FROM article_references WHERE article_id = ?1",
            params![article_id],
        )?;

        for reference in references {
            self.conn.execute(
                "INSERT OR IGNORE INTO article_references (article_id, reference) VALUES (?1, ?2)",
                params![article_id, reference],
            )?;
        }

        Ok(())
    }
}

impl ArticleStore for SqliteArticleStore {
    fn find_by_url(&self, url: &str) -> StorageResult<Option<ArticleRecord>> {
        let sql = format!("SELECT {} FROM articles WHERE url = ?1", ARTICLE_COLUMNS);
        let article = self
            .conn
            .query_row(&sql, params![url], row_to_article)
            .optional()?;

        article.map(|a| self.with_references(a)).transpose()
    }

    fn exists(&self, url: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM articles WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn create(&mut self, article: &NewArticle) -> StorageResult<ArticleRecord> {
        let now = timestamp();
        let inserted = self.conn.execute(
            "INSERT INTO articles (url, title, content, page_number, is_updated, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
            params![article.url, article.title, article.content, article.page_number, now],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StorageError::Conflict(article.url.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| StorageError::NotFound(article.url.clone()))
    }

    fn update(&mut self, article: &ArticleRecord) -> StorageResult<ArticleRecord> {
        let changed = self.conn.execute(
            "UPDATE articles SET title = ?1, content = ?2, updated_content = ?3, page_number = ?4,
             is_updated = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                article.title,
                article.content,
                article.updated_content,
                article.page_number,
                article.is_updated,
                timestamp(),
                article.id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::NotFound(article.url.clone()));
        }

        self.replace_references(article.id, &article.references)?;

        self.get_by_id(article.id)?
            .ok_or_else(|| StorageError::NotFound(article.url.clone()))
    }

    fn find_all(&self) -> StorageResult<Vec<ArticleRecord>> {
        let sql = format!(
            "SELECT {} FROM articles ORDER BY created_at DESC, id DESC",
            ARTICLE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let articles = stmt
            .query_map([], row_to_article)?
            .collect::<Result<Vec<_>, _>>()?;

        articles
            .into_iter()
            .map(|a| self.with_references(a))
            .collect()
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn row_to_article(row: &Row<'_>) -> rusqlite::Result<ArticleRecord> {
    Ok(ArticleRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        updated_content: row.get(4)?,
        page_number: row.get(5)?,
        is_updated: row.get(6)?,
        references: Vec::new(),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// True only for UNIQUE constraint failures, not NOT NULL or foreign keys
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Fixed-width RFC 3339 timestamp so text ordering matches time ordering
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
