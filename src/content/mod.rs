//! Content-resolution layer.
//!
//! Serves reads from whichever backing schema is available: the legacy CMS
//! tables when present (preferred), else the modern `news` table. Raw rows
//! from either side are normalized into `CanonicalPost` and every post gets
//! an image via the priority chain in `image`.
//!
//! No query failure below this layer reaches the caller. List operations
//! degrade (down to an unfiltered listing, or an empty one) and `by_id`
//! reports not-found; the fallback tiers log at warn.

use std::sync::OnceLock;

use log::warn;

use crate::db::DbPool;
use crate::models::news::News;

pub mod image;
pub mod legacy;
pub mod normalize;

pub use normalize::CanonicalPost;

pub struct ContentResolver {
    pool: DbPool,
    // Probe result for the process lifetime; the schema doesn't change at
    // runtime, so adding/removing legacy tables requires a restart.
    legacy_present: OnceLock<bool>,
}

impl ContentResolver {
    pub fn new(pool: DbPool) -> Self {
        ContentResolver {
            pool,
            legacy_present: OnceLock::new(),
        }
    }

    pub fn legacy_schema_present(&self) -> bool {
        *self.legacy_present.get_or_init(|| {
            let conn = match self.pool.get() {
                Ok(c) => c,
                Err(_) => return false,
            };
            legacy::schema_present(&conn)
        })
    }

    /// Most recent published posts, newest first, at most `limit`.
    pub fn recent(&self, limit: i64) -> Vec<CanonicalPost> {
        if !self.legacy_schema_present() {
            return News::published(&self.pool, limit, 0)
                .iter()
                .map(|n| CanonicalPost::from_news(n, false))
                .collect();
        }

        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        match legacy::recent(&conn, limit) {
            Ok(rows) => rows
                .iter()
                .map(|r| CanonicalPost::from_legacy(r, false))
                .collect(),
            Err(e) => {
                warn!("Legacy recent-posts query failed: {}", e);
                vec![]
            }
        }
    }

    /// Published posts in a category, newest first.
    ///
    /// Legacy mode runs a three-tier fallback over the taxonomy join: each
    /// table-name prefix in turn, then an unfiltered recent listing. A
    /// degraded (unfiltered) list beats a failed request.
    pub fn by_category(&self, category_slug: &str, limit: i64) -> Vec<CanonicalPost> {
        if !self.legacy_schema_present() {
            return News::published_by_category(&self.pool, category_slug, limit)
                .iter()
                .map(|n| CanonicalPost::from_news(n, false))
                .collect();
        }

        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        for prefix in legacy::TAXONOMY_PREFIXES {
            match legacy::by_category(&conn, prefix, category_slug, limit) {
                Ok(rows) => {
                    return rows
                        .iter()
                        .map(|r| CanonicalPost::from_legacy(r, false))
                        .collect();
                }
                Err(e) => {
                    warn!(
                        "Legacy category query failed for prefix '{}': {}",
                        prefix, e
                    );
                }
            }
        }

        warn!(
            "Category filtering unavailable for '{}', returning unfiltered posts",
            category_slug
        );
        match legacy::recent(&conn, limit) {
            Ok(rows) => rows
                .iter()
                .map(|r| CanonicalPost::from_legacy(r, false))
                .collect(),
            Err(e) => {
                warn!("Legacy fallback listing failed: {}", e);
                vec![]
            }
        }
    }

    /// Single published post. Not-found is the only caller-visible outcome
    /// besides success; there is no cross-schema fallback for id lookups —
    /// legacy and modern ids are different keyspaces, and a legacy id
    /// resolving to an unrelated modern row would be worse than a 404.
    pub fn by_id(&self, id: &str) -> Option<CanonicalPost> {
        let numeric_id: i64 = id.parse().ok()?;

        if !self.legacy_schema_present() {
            return News::find_published_by_id(&self.pool, numeric_id)
                .map(|n| CanonicalPost::from_news(&n, true));
        }

        let conn = self.pool.get().ok()?;
        match legacy::by_id(&conn, numeric_id) {
            Ok(row) => row.map(|r| CanonicalPost::from_legacy(&r, true)),
            Err(e) => {
                warn!("Legacy single-post query failed for id {}: {}", numeric_id, e);
                None
            }
        }
    }
}
