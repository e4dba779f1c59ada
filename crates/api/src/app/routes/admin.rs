//! User administration and the admin dashboard.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    http::HeaderMap,
    response::{Html, Response},
    routing::{get, post},
};
use serde_json::json;

use keystone_auth::{
    RoleName, authorize, check_password_policy, generate_password,
    password::GENERATED_PASSWORD_LEN,
    permissions::{MANAGE_USERS, VIEW_SYSTEM, VIEW_USERS},
};
use keystone_core::{Email, UserId};
use keystone_infra::repo::{NewUser, UserUpdate};

use crate::app::dto::{CreateUserForm, UpdateUserForm, optional_text, parse_flag};
use crate::app::errors::ApiError;
use crate::app::extract::{ApiForm, ApiPath};
use crate::app::services::AppServices;
use crate::app::htmx;
use crate::app::themes;
use crate::app::views::{self, PageContext};
use crate::authz::require_permission;
use crate::context::CurrentUser;

/// Number of accounts listed on the dashboard.
const RECENT_USERS: i64 = 5;

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users).post(create_user))
        .route("/users/new", get(new_user_form))
        .route("/users/:id", axum::routing::put(update_user))
        .route("/users/:id/edit", get(edit_user_form))
        .route("/users/:id/reset-password", post(reset_password))
}

/// GET /admin/dashboard - user count and the newest accounts
pub async fn dashboard(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, ApiError> {
    require_permission(&current, &VIEW_SYSTEM)?;

    let users = services.users();
    let user_count = users.count().await?;
    let recent = users.recent(RECENT_USERS).await?;

    let ctx = PageContext::new(themes::current(&headers), Some(&current));
    Ok(Html(views::admin::dashboard(&ctx, user_count, &recent)))
}

/// GET /admin/users
pub async fn list_users(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, ApiError> {
    require_permission(&current, &VIEW_USERS)?;

    let users = services.users().list().await?;
    let can_manage = authorize(current.principal(), &MANAGE_USERS).is_ok();

    let ctx = PageContext::new(themes::current(&headers), Some(&current));
    Ok(Html(views::admin::users(&ctx, &users, can_manage)))
}

/// GET /admin/users/new
pub async fn new_user_form(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, ApiError> {
    require_permission(&current, &MANAGE_USERS)?;

    let roles = services.roles().list().await?;
    let ctx = PageContext::new(themes::current(&headers), Some(&current));
    Ok(Html(views::admin::user_form(&ctx, None, &roles)))
}

/// GET /admin/users/:id/edit
pub async fn edit_user_form(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Html<String>, ApiError> {
    require_permission(&current, &MANAGE_USERS)?;

    let user = services
        .users()
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;
    let roles = services.roles().list().await?;

    let ctx = PageContext::new(themes::current(&headers), Some(&current));
    Ok(Html(views::admin::user_form(&ctx, Some(&user), &roles)))
}

/// POST /admin/users
pub async fn create_user(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiForm(form): ApiForm<CreateUserForm>,
) -> Result<Response, ApiError> {
    require_permission(&current, &MANAGE_USERS)?;

    let email = Email::parse(&form.email)?;
    if services.users().find_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }
    let role = existing_role(&services, form.role.as_deref()).await?;
    let is_active = parse_flag(form.is_active.as_deref(), true)?;
    check_password_policy(&form.password)?;

    let user = services
        .users()
        .create(NewUser {
            email,
            name: optional_text(form.name),
            hashed_password: services.hash_password(&form.password).await?,
            role,
            is_active,
        })
        .await?;

    tracing::info!(admin_id = %current.id(), user_id = %user.id, role = %user.role, "user created by admin");
    Ok(htmx::redirect(&headers, "/admin/users"))
}

/// PUT /admin/users/:id
pub async fn update_user(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<UserId>,
    ApiForm(form): ApiForm<UpdateUserForm>,
) -> Result<Response, ApiError> {
    require_permission(&current, &MANAGE_USERS)?;

    let users = services.users();
    let user = users.find_by_id(id).await?.ok_or(ApiError::NotFound("User not found"))?;
    if user.id == current.id() {
        return Err(ApiError::bad_request("Cannot modify your own account"));
    }

    let email = Email::parse(&form.email)?;
    if users.email_taken(&email, Some(id)).await? {
        return Err(ApiError::bad_request("Email already taken"));
    }
    let role = existing_role(&services, form.role.as_deref()).await?;
    let is_active = parse_flag(form.is_active.as_deref(), true)?;

    let updated = users
        .update(
            id,
            UserUpdate {
                email,
                name: optional_text(form.name),
                role,
                is_active,
            },
        )
        .await?;

    tracing::info!(
        admin_id = %current.id(),
        user_id = %updated.id,
        role = %updated.role,
        is_active = updated.is_active,
        "user updated by admin"
    );
    Ok(htmx::redirect(&headers, "/admin/users"))
}

/// POST /admin/users/:id/reset-password - returns the new password once
pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_permission(&current, &MANAGE_USERS)?;

    let user = services
        .users()
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;
    if user.id == current.id() {
        return Err(ApiError::bad_request(
            "Cannot reset your own password. Use the profile page instead.",
        ));
    }

    let password = generate_password(GENERATED_PASSWORD_LEN);
    let hashed = services.hash_password(&password).await?;
    services.users().set_password(user.id, &hashed).await?;

    tracing::info!(admin_id = %current.id(), user_id = %user.id, "password reset by admin");
    Ok(Json(json!({ "success": true, "password": password })))
}

/// Resolve the submitted role name (default `user`) to an existing role.
async fn existing_role(services: &AppServices, raw: Option<&str>) -> Result<RoleName, ApiError> {
    let name = match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(name) => RoleName::parse(name).map_err(|_| ApiError::bad_request("Invalid role"))?,
        None => RoleName::default_role(),
    };
    match services.roles().find_by_name(name.as_str()).await? {
        Some(role) => Ok(role.name),
        None => Err(ApiError::bad_request("Invalid role")),
    }
}
