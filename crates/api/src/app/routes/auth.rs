//! Login, registration, logout, and the token endpoint.

use std::sync::Arc;

use axum::{
    Extension, Json,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;

use keystone_auth::{RoleName, check_password_policy};
use keystone_core::Email;
use keystone_infra::StoreError;
use keystone_infra::repo::NewUser;

use crate::app::cookies::{ACCESS_TOKEN_COOKIE, SetCookie};
use crate::app::dto::{LoginForm, RegisterForm, TokenForm, TokenResponse};
use crate::app::errors::ApiError;
use crate::app::extract::ApiForm;
use crate::app::htmx::{HxTrigger, ToastKind};
use crate::app::services::AppServices;
use crate::app::themes;
use crate::app::views::{self, PageContext};
use crate::context::Identity;

/// POST /token - exchange form credentials for a bearer token
pub async fn token(
    Extension(services): Extension<Arc<AppServices>>,
    ApiForm(form): ApiForm<TokenForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = services
        .authenticate(&form.username, &form.password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let access_token = services
        .issue_token(&user.email, services.config().access_token_ttl())
        .map_err(ApiError::internal)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// GET /register
pub async fn register_page(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Response {
    render_register(&headers, &identity, None, services.config().secure_cookies)
}

/// POST /register - validation failures re-render the form with a message
pub async fn register(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    ApiForm(form): ApiForm<RegisterForm>,
) -> Result<Response, ApiError> {
    let secure = services.config().secure_cookies;
    let fail = |msg: &str| -> Result<Response, ApiError> {
        Ok(render_register(&headers, &identity, Some(msg), secure))
    };

    if form.password != form.confirm_password {
        return fail("Passwords do not match");
    }
    let Ok(email) = Email::parse(&form.email) else {
        return fail("Please enter a valid email address");
    };
    if let Err(e) = check_password_policy(&form.password) {
        return fail(&capitalize(&e.to_string()));
    }
    if services.users().find_by_email(&email).await?.is_some() {
        return fail("Email already registered");
    }

    let hashed_password = services.hash_password(&form.password).await?;
    let created = services
        .users()
        .create(NewUser {
            email,
            name: None,
            hashed_password,
            role: RoleName::default_role(),
            is_active: true,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user registered");
            Ok((
                themes::cookie(themes::current(&headers), secure),
                HxTrigger::toast("Registration successful! Please log in.", ToastKind::Success),
                Redirect::to("/login"),
            )
                .into_response())
        }
        Err(StoreError::Conflict(_)) => fail("Email already registered"),
        Err(e) => Err(e.into()),
    }
}

/// GET /login
pub async fn login_page(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Response {
    render_login(&headers, &identity, None, services.config().secure_cookies)
}

/// POST /login - sets the `access_token` cookie on success
pub async fn login(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Response, ApiError> {
    let config = services.config();

    let Some(user) = services.authenticate(&form.email, &form.password).await? else {
        return Ok(render_login(&headers, &identity, Some("Invalid email or password"), config.secure_cookies));
    };

    let ttl = if form.remember_me() {
        config.remember_me_ttl()
    } else {
        config.access_token_ttl()
    };
    let token = services.issue_token(&user.email, ttl).map_err(ApiError::internal)?;
    services.users().touch_last_login(user.id, Utc::now()).await?;

    tracing::info!(user_id = %user.id, remember_me = form.remember_me(), "user logged in");

    let session = SetCookie::new(ACCESS_TOKEN_COOKIE, token, ttl.num_seconds())
        .http_only(true)
        .secure(config.secure_cookies);

    Ok((
        session,
        themes::cookie(themes::current(&headers), config.secure_cookies),
        HxTrigger::toast("Login successful!", ToastKind::Success),
        Redirect::to("/"),
    )
        .into_response())
}

/// GET /logout
pub async fn logout() -> Response {
    (
        SetCookie::removal(ACCESS_TOKEN_COOKIE).http_only(true),
        HxTrigger::toast("Logged out successfully", ToastKind::Success),
        Redirect::to("/login"),
    )
        .into_response()
}

fn render_login(headers: &HeaderMap, identity: &Identity, error: Option<&str>, secure: bool) -> Response {
    let theme = themes::current(headers);
    let ctx = PageContext::new(theme, identity.current());
    (
        themes::cookie(theme, secure),
        error_toast(error),
        Html(views::pages::login(&ctx, error)),
    )
        .into_response()
}

fn render_register(headers: &HeaderMap, identity: &Identity, error: Option<&str>, secure: bool) -> Response {
    let theme = themes::current(headers);
    let ctx = PageContext::new(theme, identity.current());
    (
        themes::cookie(theme, secure),
        error_toast(error),
        Html(views::pages::register(&ctx, error)),
    )
        .into_response()
}

fn error_toast(error: Option<&str>) -> Option<HxTrigger> {
    error.map(|msg| HxTrigger::toast(msg, ToastKind::Error))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
