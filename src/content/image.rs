use regex::Regex;
use std::sync::OnceLock;

/// Served by this app's own static mount; the terminal tier of the chain.
pub const PLACEHOLDER_IMAGE: &str = "/static/img/news-placeholder.jpg";

/// Single-pass, case-insensitive, first occurrence only. Does not parse the
/// HTML tree and does not validate the URL.
fn img_src_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)<img[^>]+src=["']?([^"' >]+)["']?"#).unwrap())
}

pub fn extract_first_image(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    img_src_re()
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// Pick the best image reference for a legacy row.
///
/// Priority: optimized side-table src, first <img> in the content HTML, the
/// row's guid (a permalink in the legacy schema — not guaranteed to be an
/// image, preserved as-is), then the placeholder. Never fails.
pub fn resolve_image(optimized: Option<&str>, content_html: &str, guid: Option<&str>) -> String {
    if let Some(src) = optimized.filter(|s| !s.is_empty()) {
        return src.to_string();
    }
    if let Some(src) = extract_first_image(content_html) {
        return src;
    }
    if let Some(g) = guid.filter(|s| !s.is_empty()) {
        return g.to_string();
    }
    PLACEHOLDER_IMAGE.to_string()
}
