use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::State;
use rocket_dyn_templates::Template;
use std::collections::HashMap;

use crate::auth::{self, ClientIp};
use crate::db::DbPool;
use crate::models::settings::Setting;

#[derive(Debug, FromForm)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[get("/login")]
pub fn login_page(pool: &State<DbPool>) -> Template {
    let mut context: HashMap<String, String> = HashMap::new();
    context.insert(
        "site_name".to_string(),
        Setting::get_or(pool, "site_name", "Newsdesk"),
    );
    Template::render("admin/login", &context)
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    form: Form<LoginForm>,
    pool: &State<DbPool>,
    cookies: &CookieJar<'_>,
    client_ip: ClientIp,
) -> Result<Redirect, Template> {
    let site_name = Setting::get_or(pool, "site_name", "Newsdesk");

    let make_err = |code: &str, msg: &str| -> Template {
        let mut ctx = HashMap::new();
        ctx.insert("error_code".to_string(), code.to_string());
        ctx.insert("error".to_string(), msg.to_string());
        ctx.insert("site_name".to_string(), site_name.clone());
        Template::render("admin/login", &ctx)
    };

    if !auth::check_login_rate_limit(pool, &client_ip.0) {
        return Err(make_err(
            "rate_limited",
            "Too many login attempts. Please try again in 15 minutes.",
        ));
    }

    let user = match auth::authenticate(pool, &form.email, &form.password) {
        Ok(u) => u,
        Err(e) => {
            log::info!("Login failed for {}: {}", form.email, e.code());
            return Err(make_err(e.code(), e.message()));
        }
    };

    let ip_hash = auth::hash_ip(&client_ip.0);
    match auth::create_session(pool, user.id, Some(&ip_hash), None) {
        Ok(session_id) => {
            auth::set_session_cookie(cookies, &session_id);
            Ok(Redirect::to("/admin"))
        }
        Err(e) => {
            log::error!("Session creation failed: {}", e);
            Err(make_err("unknown", "Authentication failed"))
        }
    }
}

#[post("/logout")]
pub fn logout(pool: &State<DbPool>, cookies: &CookieJar<'_>) -> Redirect {
    if let Some(session_id) = auth::session_cookie_value(cookies) {
        let _ = auth::destroy_session(pool, &session_id);
    }
    auth::clear_session_cookie(cookies);
    Redirect::to("/admin/login")
}

pub fn routes() -> Vec<rocket::Route> {
    routes![login_page, login_submit, logout]
}
