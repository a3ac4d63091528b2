use rocket::response::Redirect;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::models::news::News;
use crate::models::settings::Setting;

#[get("/")]
pub fn dashboard(admin: AdminUser, pool: &State<DbPool>) -> Template {
    let recent = News::list(pool, 20, 0);

    let context = json!({
        "page_title": "Dashboard",
        "user": admin.user.safe_json(),
        "news": recent,
        "count_all": News::count(pool, false),
        "count_published": News::count(pool, true),
        "settings": Setting::all(pool),
    });

    Template::render("admin/dashboard", &context)
}

// Unauthenticated requests forward past the guard and land here.
#[get("/", rank = 2)]
pub fn dashboard_redirect() -> Redirect {
    Redirect::to("/admin/login")
}

#[get("/news/new")]
pub fn news_new(admin: AdminUser, pool: &State<DbPool>) -> Template {
    let context = json!({
        "page_title": "Create News",
        "user": admin.user.safe_json(),
        "default_category": Setting::get_or(pool, "default_category", "Uncategorized"),
        "settings": Setting::all(pool),
    });

    Template::render("admin/news_form", &context)
}

#[get("/news/new", rank = 2)]
pub fn news_new_redirect() -> Redirect {
    Redirect::to("/admin/login")
}

pub fn routes() -> Vec<rocket::Route> {
    routes![dashboard, dashboard_redirect, news_new, news_new_redirect]
}
