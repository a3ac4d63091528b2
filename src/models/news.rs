use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

/// A row of the modern `news` table. The legacy CMS rows never pass through
/// this type — see `content::legacy` for those.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
    pub published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewsForm {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
    pub published: bool,
}

impl News {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let published: i64 = row.get("published")?;
        Ok(News {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            category: row.get("category")?,
            image: row.get("image")?,
            published: published != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row("SELECT * FROM news WHERE id = ?1", params![id], Self::from_row)
            .ok()
    }

    pub fn find_published_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM news WHERE id = ?1 AND published = 1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    /// Published items, newest first. Secondary id tie-break keeps the order
    /// deterministic when several rows share a created_at second.
    pub fn published(pool: &DbPool, limit: i64, offset: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let mut stmt = match conn.prepare(
            "SELECT * FROM news WHERE published = 1
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map(params![limit, offset], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn published_by_category(pool: &DbPool, category: &str, limit: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let mut stmt = match conn.prepare(
            "SELECT * FROM news WHERE published = 1 AND category = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map(params![category, limit], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn list(pool: &DbPool, limit: i64, offset: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let mut stmt = match conn
            .prepare("SELECT * FROM news ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map(params![limit, offset], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool, published_only: bool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };

        if published_only {
            conn.query_row("SELECT COUNT(*) FROM news WHERE published = 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
        } else {
            conn.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))
                .unwrap_or(0)
        }
    }

    pub fn create(pool: &DbPool, form: &NewsForm) -> Result<i64, String> {
        let conn = pool.get().map_err(|e| e.to_string())?;

        conn.execute(
            "INSERT INTO news (title, content, category, image, published)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                form.title,
                form.content,
                form.category,
                form.image,
                form.published as i64,
            ],
        )
        .map_err(|e| e.to_string())?;

        Ok(conn.last_insert_rowid())
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM news WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
