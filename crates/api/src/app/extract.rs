//! Form and path extractors that reject with [`ApiError`].
//!
//! axum's own rejections answer with plain text; these keep every failure on
//! the `{"error", "message"}` JSON shape.

use axum::{
    Form,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::app::errors::ApiError;

/// `application/x-www-form-urlencoded` body.
pub struct ApiForm<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "rejected form body");
            ApiError::bad_request(e.body_text())
        })?;
        Ok(ApiForm(value))
    }
}

/// Typed path parameters.
pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await.map_err(|e| {
            tracing::debug!(error = %e, "rejected path parameters");
            ApiError::bad_request(e.body_text())
        })?;
        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, StatusCode, header};
    use axum::response::IntoResponse;

    #[derive(Debug, serde::Deserialize)]
    struct NameForm {
        name: String,
    }

    fn form_request(body: &'static str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let ApiForm(form) = ApiForm::<NameForm>::from_request(form_request("name=editor"), &())
            .await
            .unwrap();
        assert_eq!(form.name, "editor");
    }

    #[tokio::test]
    async fn missing_field_is_a_json_bad_request() {
        let err = match ApiForm::<NameForm>::from_request(form_request("description=x"), &()).await {
            Ok(_) => panic!("form without `name` was accepted"),
            Err(err) => err,
        };
        assert!(matches!(&err, ApiError::BadRequest(msg) if msg.contains("name")));

        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    }
}
