use rand::Rng;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use std::path::Path;

use crate::auth::AdminUser;
use crate::content::{CanonicalPost, ContentResolver};
use crate::db::DbPool;
use crate::models::news::{News, NewsForm};

// ── Create (multipart, admin only) ─────────────────────

#[derive(FromForm)]
pub struct NewsCreateForm<'f> {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    #[field(name = "featuredImage")]
    pub featured_image: Option<TempFile<'f>>,
    #[field(name = "reporterImage")]
    pub reporter_image: Option<TempFile<'f>>,
}

#[post("/news/create", data = "<form>")]
pub async fn news_create(
    admin: Option<AdminUser>,
    pool: &State<DbPool>,
    mut form: Form<NewsCreateForm<'_>>,
) -> Custom<Json<Value>> {
    if admin.is_none() {
        return Custom(
            Status::Unauthorized,
            Json(json!({"error": "Unauthorized. Please login first."})),
        );
    }

    let title = form.title.clone().unwrap_or_default();
    let content = form.content.clone().unwrap_or_default();
    if title.is_empty() || content.is_empty() {
        return Custom(
            Status::BadRequest,
            Json(json!({"error": "Title and content are required"})),
        );
    }

    let featured = match form.featured_image.as_mut() {
        Some(f) if f.len() > 0 => match save_upload(f, "news-featured").await {
            Ok(path) => Some(path),
            Err(e) => return persistence_error(e),
        },
        _ => None,
    };

    // Persisted for future use; nothing references it yet (matches the
    // old site, which uploaded reporter photos without storing the path).
    if let Some(f) = form.reporter_image.as_mut() {
        if f.len() > 0 {
            if let Err(e) = save_upload(f, "reporter").await {
                return persistence_error(e);
            }
        }
    }

    let category = form
        .category
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "Uncategorized".to_string());

    let news_form = NewsForm {
        title,
        content,
        category,
        image: featured,
        // Always publish when creating news
        published: true,
    };

    match News::create(pool, &news_form) {
        Ok(id) => {
            log::info!("News created: id={} title={}", id, news_form.title);
            Custom(
                Status::Ok,
                Json(json!({
                    "success": true,
                    "message": "News created successfully!",
                    "news": {
                        "id": id,
                        "title": news_form.title,
                        "category": news_form.category,
                        "published": news_form.published,
                    },
                })),
            )
        }
        Err(e) => persistence_error(e),
    }
}

fn persistence_error(details: String) -> Custom<Json<Value>> {
    log::error!("Error creating news: {}", details);
    Custom(
        Status::InternalServerError,
        Json(json!({"error": "Failed to create news", "details": details})),
    )
}

/// Persist an upload under `website/uploads/<subdir>/` with a
/// collision-resistant name: `{epochMillis}-{randomInt}-{sanitizedName}`.
/// Returns the public URL path.
async fn save_upload(file: &mut TempFile<'_>, subdir: &str) -> Result<String, String> {
    let original = file
        .raw_name()
        .map(|rn| rn.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_else(|| "upload".to_string());

    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let filename = format!("{}-{}-{}", millis, suffix, sanitize_filename(&original));

    let dir = Path::new("website/uploads").join(subdir);
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    let dest = dir.join(&filename);

    file.persist_to(&dest).await.map_err(|e| e.to_string())?;

    Ok(format!("/uploads/{}/{}", subdir, filename))
}

/// Whitespace becomes '-'; path separators are stripped since the original
/// name arrives unsanitized from the client.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '/' && *c != '\\')
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

// ── Load more ──────────────────────────────────────────

#[get("/news/load-more?<offset>&<limit>")]
pub fn load_more(
    resolver: &State<ContentResolver>,
    offset: Option<i64>,
    limit: Option<i64>,
) -> Json<Vec<CanonicalPost>> {
    let offset = offset.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(100).max(1);

    // Fetch through offset + limit, then return only the posts past the offset
    let posts = resolver.recent(offset + limit);
    Json(posts.into_iter().skip(offset as usize).collect())
}

// ── Connectivity probe ─────────────────────────────────

#[get("/db-test")]
pub fn db_test(pool: &State<DbPool>) -> Custom<Json<Value>> {
    match pool.get() {
        Ok(conn) => {
            let version: String = conn
                .query_row("SELECT sqlite_version()", [], |row| row.get(0))
                .unwrap_or_default();
            Custom(
                Status::Ok,
                Json(json!({
                    "success": true,
                    "message": "Database connected successfully!",
                    "data": {
                        "version": version,
                        "news_count": News::count(pool, false),
                    },
                })),
            )
        }
        Err(e) => Custom(
            Status::InternalServerError,
            Json(json!({
                "success": false,
                "message": "Failed to connect to database",
                "error": e.to_string(),
            })),
        ),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![news_create, load_more, db_test]
}
