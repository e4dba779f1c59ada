use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use keystone_auth::JwtCodec;
use keystone_infra::UserRepository;

use crate::app::cookies::{self, ACCESS_TOKEN_COOKIE};
use crate::app::errors::ApiError;
use crate::context::{CurrentUser, Identity};

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtCodec>,
    pub users: UserRepository,
}

/// Resolve the caller (if any) and attach an [`Identity`] to the request.
///
/// Anonymous and badly-authenticated callers pass through as anonymous; the
/// routes that need a user reject them via [`require_auth_middleware`].
pub async fn identify_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = match extract_token(req.headers()) {
        Some(token) => resolve(&state, &token).await?,
        None => Identity::anonymous(),
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Reject anonymous requests with 401 and expose the caller as a
/// [`CurrentUser`] extension.
pub async fn require_auth_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let current = req
        .extensions()
        .get::<Identity>()
        .and_then(Identity::current)
        .cloned()
        .ok_or(ApiError::Unauthenticated)?;

    req.extensions_mut().insert(current);
    Ok(next.run(req).await)
}

async fn resolve(state: &AuthState, token: &str) -> Result<Identity, ApiError> {
    let subject = match state.jwt.validate(token, Utc::now()) {
        Ok(subject) => subject,
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            return Ok(Identity::anonymous());
        }
    };

    match state.users.find_principal(&subject).await? {
        Some((user, principal)) => Ok(Identity::authenticated(CurrentUser::new(user, principal))),
        None => {
            tracing::debug!(subject = %subject, "token subject has no account");
            Ok(Identity::anonymous())
        }
    }
}

/// Token from `Authorization: Bearer`, falling back to the login cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer(headers) {
        return Some(token.to_string());
    }

    let cookie = cookies::read(headers, ACCESS_TOKEN_COOKIE)?;
    let token = strip_bearer_scheme(&cookie).unwrap_or(&cookie).trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = strip_bearer_scheme(header)?.trim();
    (!token.is_empty()).then_some(token)
}

/// Auth scheme names are case-insensitive (RFC 9110 section 11.1).
fn strip_bearer_scheme(value: &str) -> Option<&str> {
    let (scheme, rest) = value.trim_start().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(rest)
}
