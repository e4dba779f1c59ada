//! htmx response headers.
//!
//! Each header is a response part, so handlers can return tuples such as
//! `(HxTrigger::toast(..), Html(..))`.

use std::convert::Infallible;

use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use serde_json::{Value, json};

pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");
pub const HX_REFRESH: HeaderName = HeaderName::from_static("hx-refresh");
pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

/// `HX-Trigger` carrying `{name: detail}`.
#[derive(Debug, Clone, PartialEq)]
pub struct HxTrigger(String);

impl HxTrigger {
    pub fn with_detail(name: &str, detail: Value) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(name.to_string(), detail);
        Self(Value::Object(map).to_string())
    }

    /// The `showToast` event the layout listens for.
    pub fn toast(message: &str, kind: ToastKind) -> Self {
        Self::with_detail("showToast", json!({ "message": message, "type": kind.as_str() }))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `HX-Redirect`: client-side navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HxRedirect(pub String);

/// `HX-Refresh: true`: full page reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRefresh;

fn insert(mut res: ResponseParts, name: HeaderName, value: &str) -> ResponseParts {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            res.headers_mut().insert(name, v);
        }
        Err(e) => tracing::warn!(header = %name, error = %e, "dropping unencodable htmx header"),
    }
    res
}

impl IntoResponseParts for HxTrigger {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        Ok(insert(res, HX_TRIGGER, &self.0))
    }
}

impl IntoResponseParts for HxRedirect {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        Ok(insert(res, HX_REDIRECT, &self.0))
    }
}

impl IntoResponseParts for HxRefresh {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        Ok(insert(res, HX_REFRESH, "true"))
    }
}

/// Whether the request was issued by htmx.
pub fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get(HX_REQUEST).and_then(|v| v.to_str().ok()) == Some("true")
}

/// Navigate after a successful form submission.
///
/// htmx swaps redirected responses in place, so htmx requests get
/// `HX-Redirect` with a 200 instead of a 303.
pub fn redirect(headers: &axum::http::HeaderMap, to: &str) -> axum::response::Response {
    use axum::response::{IntoResponse, Redirect};

    if is_htmx_request(headers) {
        (HxRedirect(to.to_string()), axum::http::StatusCode::OK).into_response()
    } else {
        Redirect::to(to).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn toast_payload_shape() {
        let trigger = HxTrigger::toast("Login successful!", ToastKind::Success);
        let value: Value = serde_json::from_str(trigger.as_str()).unwrap();
        assert_eq!(value["showToast"]["message"], "Login successful!");
        assert_eq!(value["showToast"]["type"], "success");
    }

    #[test]
    fn error_toast_payload() {
        let trigger = HxTrigger::toast("Invalid email or password", ToastKind::Error);
        let value: Value = serde_json::from_str(trigger.as_str()).unwrap();
        assert_eq!(value["showToast"]["type"], "error");
    }

    #[test]
    fn redirect_depends_on_the_caller() {
        let mut headers = axum::http::HeaderMap::new();
        let res = redirect(&headers, "/admin/users");
        assert_eq!(res.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[axum::http::header::LOCATION], "/admin/users");

        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        let res = redirect(&headers, "/admin/users");
        assert_eq!(res.status(), axum::http::StatusCode::OK);
        assert_eq!(res.headers()[HX_REDIRECT], "/admin/users");
    }

    #[test]
    fn headers_are_written() {
        let res = (HxRedirect("/dashboard".into()), HxRefresh, "ok").into_response();
        assert_eq!(res.headers()[HX_REDIRECT], "/dashboard");
        assert_eq!(res.headers()[HX_REFRESH], "true");
    }
}
