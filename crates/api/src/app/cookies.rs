//! Cookie reading and `Set-Cookie` construction.

use std::convert::Infallible;

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponseParts, ResponseParts};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const THEME_COOKIE: &str = "theme";

/// One year, in seconds.
pub const THEME_COOKIE_MAX_AGE: i64 = 365 * 24 * 60 * 60;

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
}

/// A `Set-Cookie` header, always `Path=/` and `SameSite=Lax`. Usable
/// directly as a response part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: &'static str,
    value: String,
    max_age: i64,
    http_only: bool,
    secure: bool,
}

impl SetCookie {
    pub fn new(name: &'static str, value: impl Into<String>, max_age: i64) -> Self {
        Self {
            name,
            value: value.into(),
            max_age,
            http_only: false,
            secure: false,
        }
    }

    /// Expire `name` immediately.
    pub fn removal(name: &'static str) -> Self {
        Self::new(name, "", 0)
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = on;
        self
    }

    pub fn secure(mut self, on: bool) -> Self {
        self.secure = on;
        self
    }

    pub fn header_value(&self) -> String {
        let mut out = format!("{}={}; Path=/; Max-Age={}", self.name, self.value, self.max_age);
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out.push_str("; SameSite=Lax");
        out
    }
}

impl IntoResponseParts for SetCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        match HeaderValue::from_str(&self.header_value()) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(cookie = self.name, error = %e, "dropping unencodable cookie"),
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; theme=nord"));
        headers.append(header::COOKIE, HeaderValue::from_static("access_token=tok"));
        assert_eq!(read(&headers, "theme").as_deref(), Some("nord"));
        assert_eq!(read(&headers, "access_token").as_deref(), Some("tok"));
        assert_eq!(read(&headers, "missing"), None);
    }

    #[test]
    fn quoted_values_are_unquoted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token=\"Bearer abc\""));
        assert_eq!(read(&headers, "access_token").as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn renders_attributes() {
        let cookie = SetCookie::new(ACCESS_TOKEN_COOKIE, "abc", 1800).http_only(true);
        assert_eq!(cookie.header_value(), "access_token=abc; Path=/; Max-Age=1800; HttpOnly; SameSite=Lax");

        let cookie = SetCookie::removal(ACCESS_TOKEN_COOKIE).secure(true);
        assert_eq!(cookie.header_value(), "access_token=; Path=/; Max-Age=0; Secure; SameSite=Lax");
    }
}
