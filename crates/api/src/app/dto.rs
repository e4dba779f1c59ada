//! Form and JSON payloads, plus small parsing helpers for form values.

use serde::{Deserialize, Serialize};

use super::errors::ApiError;

/// OAuth2 password-grant style form used by `POST /token`.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn remember_me(&self) -> bool {
        self.remember_me.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    pub theme: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoForm {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub name: String,
    pub description: Option<String>,
    pub permissions: Option<String>,
}

impl RoleForm {
    pub fn permissions(&self) -> &str {
        self.permissions.as_deref().unwrap_or("{}")
    }
}

/// Parse an optional boolean form field; absent means `default`.
pub fn parse_flag(raw: Option<&str>, default: bool) -> Result<bool, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        other => Err(ApiError::bad_request(format!("invalid boolean value {other:?}"))),
    }
}

/// Trimmed optional text; blank becomes `None`.
pub fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert_eq!(parse_flag(None, true), Ok(true));
        assert_eq!(parse_flag(Some(""), false), Ok(false));
        assert_eq!(parse_flag(Some("on"), false), Ok(true));
        assert_eq!(parse_flag(Some("False"), true), Ok(false));
        assert!(parse_flag(Some("maybe"), true).is_err());
    }

    #[test]
    fn remember_me_checkbox() {
        let form = |v: Option<&str>| LoginForm {
            email: String::new(),
            password: String::new(),
            remember_me: v.map(str::to_string),
        };
        assert!(form(Some("on")).remember_me());
        assert!(!form(Some("")).remember_me());
        assert!(!form(None).remember_me());
    }

    #[test]
    fn blank_text_is_none() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" Ann ".into())).as_deref(), Some("Ann"));
    }
}
