//! Consistent error responses.
//!
//! Every failure a handler can return is an [`ApiError`]; it renders as a JSON
//! body `{"error": <code>, "message": <text>}` with the matching status.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use keystone_auth::{AuthzError, PasswordError, PermissionFormatError};
use keystone_core::DomainError;
use keystone_infra::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No usable credentials were presented.
    #[error("Could not validate credentials")]
    Unauthenticated,

    /// The token endpoint was given a bad email/password pair.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    Inactive,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl core::fmt::Display) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Inactive | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Inactive => "inactive_user",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }

        let mut response = json_error(self.status(), self.code(), self.to_string());
        if self.status() == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Inactive => ApiError::Inactive,
            other => ApiError::Forbidden(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Not found"),
            StoreError::Conflict(msg) => ApiError::BadRequest(msg),
            other => ApiError::internal(other),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { .. } => ApiError::BadRequest(err.to_string()),
            PasswordError::Hash(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<PermissionFormatError> for ApiError {
    fn from(err: PermissionFormatError) -> Self {
        tracing::debug!(error = %err, "rejected role permissions");
        ApiError::bad_request("Invalid permissions format")
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Inactive.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AuthzError::Forbidden("view_users".into())).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(AuthzError::Inactive), ApiError::Inactive);
        assert_eq!(ApiError::from(StoreError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(StoreError::Conflict("dup".into())).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_responses_carry_a_challenge() {
        let res = ApiError::Unauthenticated.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let res = ApiError::Forbidden("nope".into()).into_response();
        assert!(res.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn forbidden_message_names_the_permission() {
        let err = ApiError::from(AuthzError::Forbidden("manage_roles".into()));
        assert_eq!(err.to_string(), "Permission denied: manage_roles required");
    }
}
