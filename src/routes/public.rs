use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::content::ContentResolver;
use crate::db::DbPool;
use crate::models::settings::Setting;

// ── Homepage ───────────────────────────────────────────

#[get("/")]
pub fn homepage(pool: &State<DbPool>, resolver: &State<ContentResolver>) -> Template {
    let per_page = Setting::get_i64(pool, "posts_per_page").max(1);
    let posts = resolver.recent(per_page);

    let context = json!({
        "settings": Setting::all(pool),
        "posts": posts,
        "page_type": "home",
    });

    Template::render("home", &context)
}

// ── Category listing ───────────────────────────────────

/// Always renders. If category filtering is unavailable underneath, the
/// resolver hands back an unfiltered listing instead of failing.
#[get("/category/<slug>")]
pub fn category(pool: &State<DbPool>, resolver: &State<ContentResolver>, slug: &str) -> Template {
    let per_page = Setting::get_i64(pool, "posts_per_page").max(1);
    let posts = resolver.by_category(slug, per_page);

    let context = json!({
        "settings": Setting::all(pool),
        "posts": posts,
        "category": slug,
        "page_type": "category",
    });

    Template::render("category", &context)
}

// ── Single article ─────────────────────────────────────

#[get("/news/<id>")]
pub fn news_single(
    pool: &State<DbPool>,
    resolver: &State<ContentResolver>,
    id: &str,
) -> Option<Template> {
    let post = resolver.by_id(id)?;

    let context = json!({
        "settings": Setting::all(pool),
        "post": post,
        "page_type": "news_single",
    });

    Some(Template::render("news", &context))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![homepage, category, news_single]
}
