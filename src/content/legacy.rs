use rusqlite::{params, Connection, OptionalExtension, Row};

/// The legacy posts table and its optimized-image side table keep the old
/// site's `wpj8_` prefix. The taxonomy triple exists under either prefix
/// depending on which migration produced the database — see
/// `TAXONOMY_PREFIXES`.
pub const LEGACY_POSTS_TABLE: &str = "wpj8_posts";

/// Taxonomy table-name prefixes, tried in order.
pub const TAXONOMY_PREFIXES: [&str; 2] = ["wp_", "wpj8_"];

/// Raw legacy CMS row, columns as stored. Normalization into a
/// `CanonicalPost` happens in `content::normalize`.
#[derive(Debug, Clone, Default)]
pub struct LegacyRow {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub guid: Option<String>,
    pub optim_src: Option<String>,
}

impl LegacyRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LegacyRow {
            id: row.get("ID")?,
            title: row.get("post_title")?,
            name: row.get("post_name")?,
            date: row.get("post_date")?,
            content: row.get("post_content")?,
            excerpt: row.get("post_excerpt")?,
            guid: row.get("guid")?,
            optim_src: row.get("optim_src")?,
        })
    }
}

const SELECT: &str = "SELECT p.ID, p.post_title, p.post_name, p.post_date, p.post_content, \
     p.post_excerpt, p.guid, i.src AS optim_src \
     FROM wpj8_posts p \
     LEFT JOIN wpj8_litespeed_img_optming i ON p.ID = i.post_id";

/// Existence probe for the legacy schema. An empty table still counts as
/// present; only a failing query (table missing, malformed db) means absent.
pub fn schema_present(conn: &Connection) -> bool {
    let sql = format!("SELECT 1 FROM {LEGACY_POSTS_TABLE} LIMIT 1");
    match conn.query_row(&sql, [], |_| Ok(())) {
        Ok(()) => true,
        Err(rusqlite::Error::QueryReturnedNoRows) => true,
        Err(_) => false,
    }
}

pub fn recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<LegacyRow>> {
    let sql = format!(
        "{SELECT} WHERE p.post_status = 'publish' AND p.post_type = 'post' \
         ORDER BY p.post_date DESC, p.ID DESC LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit], LegacyRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Category listing joined through the taxonomy triple under the given
/// table-name prefix. The prefix comes from `TAXONOMY_PREFIXES`, never from
/// user input.
pub fn by_category(
    conn: &Connection,
    prefix: &str,
    category_slug: &str,
    limit: i64,
) -> rusqlite::Result<Vec<LegacyRow>> {
    let sql = format!(
        "{SELECT} \
         INNER JOIN {prefix}term_relationships tr ON p.ID = tr.object_id \
         INNER JOIN {prefix}term_taxonomy tt ON tr.term_taxonomy_id = tt.term_taxonomy_id \
         INNER JOIN {prefix}terms t ON tt.term_id = t.term_id \
         WHERE p.post_status = 'publish' AND p.post_type = 'post' \
           AND tt.taxonomy = 'category' AND t.slug = ?1 \
         ORDER BY p.post_date DESC, p.ID DESC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![category_slug, limit], LegacyRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<LegacyRow>> {
    let sql = format!(
        "{SELECT} WHERE p.ID = ?1 AND p.post_status = 'publish' AND p.post_type = 'post' LIMIT 1"
    );
    conn.query_row(&sql, params![id], LegacyRow::from_row)
        .optional()
}
