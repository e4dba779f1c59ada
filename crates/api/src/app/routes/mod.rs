use axum::{
    Router,
    routing::{delete, get, post},
};

pub mod admin;
pub mod auth;
pub mod pages;
pub mod roles;
pub mod system;
pub mod todos;

/// Routes open to anonymous callers. Pages that adapt to a signed-in user
/// read the request's `Identity`.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/token", post(auth::token))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/theme", post(pages::set_theme))
        .route("/docs", get(system::docs))
        .route("/openapi.json", get(system::openapi))
}

/// Routes that require an authenticated caller.
pub fn protected_router() -> Router {
    Router::new()
        .route("/profile", get(pages::profile))
        .route("/todos", get(todos::list).post(todos::create))
        .route("/todos/:id/toggle", post(todos::toggle))
        .route("/todos/:id", delete(todos::delete))
        .nest("/admin", admin::router().merge(roles::router()))
}
