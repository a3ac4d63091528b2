use serde::Serialize;

use super::image::{resolve_image, PLACEHOLDER_IMAGE};
use super::legacy::LegacyRow;
use crate::models::news::News;

pub const NO_TITLE: &str = "(No title)";

/// How many characters of content stand in for a missing excerpt on
/// single-item fetches from the modern schema.
const EXCERPT_CHARS: usize = 200;

/// The uniform post shape both schemas normalize into. Built fresh on every
/// read, never cached or mutated. `excerpt` is populated only on single-post
/// fetches; `image` always resolves (terminating in the placeholder).
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CanonicalPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub date: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub image: String,
}

impl CanonicalPost {
    pub fn from_legacy(row: &LegacyRow, with_excerpt: bool) -> Self {
        let content = row.content.clone().unwrap_or_default();
        let image = resolve_image(row.optim_src.as_deref(), &content, row.guid.as_deref());

        CanonicalPost {
            id: row.id.to_string(),
            title: non_empty(row.title.as_deref()).unwrap_or_else(|| NO_TITLE.to_string()),
            slug: non_empty(row.name.as_deref()).unwrap_or_else(|| row.id.to_string()),
            date: row.date.clone().unwrap_or_default(),
            content,
            excerpt: with_excerpt.then(|| row.excerpt.clone().unwrap_or_default()),
            image,
        }
    }

    /// Modern rows carry an explicit image column; the full priority chain
    /// (content scan, guid) applies to legacy rows only.
    pub fn from_news(news: &News, with_excerpt: bool) -> Self {
        let image = news
            .image
            .clone()
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

        CanonicalPost {
            id: news.id.to_string(),
            title: non_empty(Some(&news.title)).unwrap_or_else(|| NO_TITLE.to_string()),
            slug: news.id.to_string(),
            date: news.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            content: news.content.clone(),
            // char-based so multibyte content (the archive is largely Bengali)
            // never splits mid-codepoint
            excerpt: with_excerpt.then(|| news.content.chars().take(EXCERPT_CHARS).collect()),
            image,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|v| !v.is_empty()).map(|v| v.to_string())
}
