use std::sync::Arc;

use axum::{
    Extension,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::app::dto::ThemeForm;
use crate::app::errors::ApiError;
use crate::app::extract::ApiForm;
use crate::app::htmx::HxRefresh;
use crate::app::services::AppServices;
use crate::app::themes;
use crate::app::views::{self, PageContext};
use crate::context::{CurrentUser, Identity};

/// GET / - landing page; lists the caller's todos when signed in
pub async fn home(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, ApiError> {
    let theme = themes::current(&headers);

    let todos = match identity.current() {
        Some(current) if current.principal().is_active => services.todos().list_for(current.id()).await?,
        _ => Vec::new(),
    };

    let ctx = PageContext::new(theme, identity.current());
    Ok((
        themes::cookie(theme, services.config().secure_cookies),
        Html(views::pages::home(&ctx, &todos)),
    )
        .into_response())
}

/// GET /profile
pub async fn profile(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    let theme = themes::current(&headers);
    let ctx = PageContext::new(theme, Some(&current));
    (
        themes::cookie(theme, services.config().secure_cookies),
        Html(views::pages::profile(&ctx, current.user())),
    )
        .into_response()
}

/// POST /theme - remember the chosen palette and ask htmx to reload
pub async fn set_theme(
    Extension(services): Extension<Arc<AppServices>>,
    ApiForm(form): ApiForm<ThemeForm>,
) -> Result<Response, ApiError> {
    let theme = themes::get(form.theme.trim())
        .ok_or_else(|| ApiError::bad_request(format!("Unknown theme: {}", form.theme.trim())))?;

    Ok((
        themes::cookie(theme, services.config().secure_cookies),
        HxRefresh,
        StatusCode::OK,
    )
        .into_response())
}
