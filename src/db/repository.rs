use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleNavigation, NewArticle};

use super::schema::SCHEMA;

/// Stored timestamp format. Text ordering equals chronological ordering as
/// long as every row uses it, which keeps the (timestamp DESC, id DESC)
/// listing contract cheap to satisfy.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const ARTICLE_COLUMNS: &str =
    "id, headline, commentary, article_url, image_url, timestamp, slug, meta_description, image_alt_text";

/// One connection per logical operation: open, query, drop.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref()).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// The only mutation. `id` is always store-assigned; `timestamp`
    /// defaults to now. A duplicate slug fails with `ConstraintViolation`
    /// and leaves the table unchanged.
    pub async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        let timestamp = article.timestamp.unwrap_or_else(Utc::now);
        let stored = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO articles (headline, commentary, article_url, image_url, timestamp, slug, meta_description, image_alt_text)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        article.headline,
                        article.commentary,
                        article.article_url,
                        article.image_url,
                        timestamp.format(TIMESTAMP_FORMAT).to_string(),
                        article.slug,
                        article.meta_description,
                        article.image_alt_text,
                    ],
                )?;
                let id = conn.last_insert_rowid();
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"
                ))?;
                let article = stmt.query_row(params![id], |row| Ok(article_from_row(row)))?;
                Ok(article)
            })
            .await
            .map_err(map_insert_error)?;
        Ok(stored)
    }

    /// Up to `limit` rows, most recent first, ties broken by id.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY timestamp DESC, id DESC LIMIT ?1"
                ))?;
                let articles = stmt
                    .query_map(params![limit], |row| Ok(article_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    /// Every row, most recent first. Used for the full-catalog export.
    pub async fn list_all(&self) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY timestamp DESC, id DESC"
                ))?;
                let articles = stmt
                    .query_map([], |row| Ok(article_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    /// The row plus its neighbors in the canonical ordering: `previous` is
    /// the smallest id strictly greater than `id`, `next` the largest id
    /// strictly less. Relies on id assignment following timestamp order,
    /// which holds while appends never backdate.
    pub async fn get_with_neighbors(&self, id: i64) -> Result<Option<ArticleNavigation>> {
        let navigation = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"
                ))?;
                let current = stmt
                    .query_row(params![id], |row| Ok(article_from_row(row)))
                    .optional()?;
                let Some(current) = current else {
                    return Ok(None);
                };

                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id > ?1 ORDER BY id ASC LIMIT 1"
                ))?;
                let previous = stmt
                    .query_row(params![id], |row| Ok(article_from_row(row)))
                    .optional()?;

                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id < ?1 ORDER BY id DESC LIMIT 1"
                ))?;
                let next = stmt
                    .query_row(params![id], |row| Ok(article_from_row(row)))
                    .optional()?;

                Ok(Some(ArticleNavigation {
                    current,
                    previous,
                    next,
                }))
            })
            .await?;
        Ok(navigation)
    }
}

fn map_insert_error(err: tokio_rusqlite::Error) -> AppError {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, ref message)) = err
    {
        if code.code == rusqlite::ErrorCode::ConstraintViolation {
            return AppError::ConstraintViolation(
                message
                    .clone()
                    .unwrap_or_else(|| "unique constraint failed".to_string()),
            );
        }
    }
    AppError::DatabaseTask(err)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Stored format, with or without fractional seconds
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    // RFC3339 for rows written by other tools
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

fn article_from_row(row: &Row) -> Article {
    Article {
        id: row.get(0).unwrap(),
        headline: row.get(1).unwrap(),
        commentary: row.get(2).unwrap(),
        article_url: row.get(3).unwrap(),
        image_url: row.get(4).unwrap(),
        timestamp: row
            .get::<_, String>(5)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        slug: row.get(6).unwrap(),
        meta_description: row.get(7).unwrap(),
        image_alt_text: row.get(8).unwrap(),
    }
}
