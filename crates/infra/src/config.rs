//! Configuration loading and representation.
//!
//! Everything comes from environment variables with development defaults.
//! Insecure defaults are accepted but logged at `warn`.

use std::net::SocketAddr;

use chrono::{Duration, Utc};
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/app.db";
pub const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    access_token_ttl: Duration,
    remember_me_ttl: Duration,
    pub admin_email: String,
    pub admin_password: String,
    pub bcrypt_cost: u32,
    pub secure_cookies: bool,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("remember_me_ttl", &self.remember_me_ttl)
            .field("admin_email", &self.admin_email)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("secure_cookies", &self.secure_cookies)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns the raw value of a
    /// variable when it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr: SocketAddr = parse_var("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?;
        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = get("JWT_SECRET_KEY").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET_KEY not set; using insecure dev default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let access_token_ttl = parse_ttl(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            parse_var("ACCESS_TOKEN_EXPIRE_MINUTES", get("ACCESS_TOKEN_EXPIRE_MINUTES"), Some(30))?,
            Duration::try_minutes,
        )?;
        let remember_me_ttl = parse_ttl(
            "REMEMBER_ME_DAYS",
            parse_var("REMEMBER_ME_DAYS", get("REMEMBER_ME_DAYS"), Some(30))?,
            Duration::try_days,
        )?;

        let admin_email = get("ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());
        let admin_password = get("ADMIN_PASSWORD").unwrap_or_else(|| {
            tracing::warn!(admin_email = %admin_email, "ADMIN_PASSWORD not set; default admin uses the well-known dev password");
            DEFAULT_ADMIN_PASSWORD.to_string()
        });

        let bcrypt_cost: u32 = parse_var("BCRYPT_COST", get("BCRYPT_COST"), Some(DEFAULT_BCRYPT_COST))?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(invalid("BCRYPT_COST", bcrypt_cost, "must be between 4 and 31"));
        }

        let secure_cookies = match get("SECURE_COOKIES") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("SECURE_COOKIES", &raw, "expected true or false"))?,
        };

        Ok(Self {
            bind_addr,
            database_url,
            jwt_secret,
            access_token_ttl,
            remember_me_ttl,
            admin_email,
            admin_password,
            bcrypt_cost,
            secure_cookies,
        })
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    pub fn remember_me_ttl(&self) -> Duration {
        self.remember_me_ttl
    }
}

/// Longest accepted token lifetime, in days.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// A positive lifetime that `Duration` can represent and that keeps
/// `now + ttl` a valid timestamp.
fn parse_ttl(var: &'static str, amount: i64, unit: fn(i64) -> Option<Duration>) -> Result<Duration, ConfigError> {
    if amount <= 0 {
        return Err(invalid(var, amount, "must be positive"));
    }
    let ttl = unit(amount).ok_or_else(|| invalid(var, amount, "out of range"))?;
    if ttl > Duration::days(MAX_TOKEN_TTL_DAYS) || Utc::now().checked_add_signed(ttl).is_none() {
        return Err(invalid(var, amount, "must be at most ten years"));
    }
    Ok(ttl)
}

fn parse_var<T>(var: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match raw {
        Some(raw) => raw.parse::<T>().map_err(|e| invalid(var, &raw, e)),
        None => default.ok_or_else(|| invalid(var, "", "no value and no default")),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(var: &'static str, value: impl core::fmt::Display, reason: impl core::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(cfg.access_token_ttl(), Duration::minutes(30));
        assert_eq!(cfg.remember_me_ttl(), Duration::days(30));
        assert_eq!(cfg.admin_email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(cfg.admin_password, DEFAULT_ADMIN_PASSWORD);
        assert_eq!(cfg.bcrypt_cost, 12);
        assert!(!cfg.secure_cookies);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = load(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("BCRYPT_COST", "4"),
            ("SECURE_COOKIES", "TRUE"),
            ("JWT_SECRET_KEY", "s3cret"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert_eq!(cfg.access_token_ttl(), Duration::minutes(5));
        assert_eq!(cfg.bcrypt_cost, 4);
        assert!(cfg.secure_cookies);
        assert_eq!(cfg.jwt_secret, "s3cret");
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(load(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(load(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "soon")]).is_err());
        assert!(load(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "0")]).is_err());
        assert!(load(&[("REMEMBER_ME_DAYS", "-3")]).is_err());
        assert!(load(&[("BCRYPT_COST", "2")]).is_err());
        assert!(load(&[("SECURE_COOKIES", "maybe")]).is_err());
    }

    #[test]
    fn oversized_lifetimes_are_errors() {
        for (var, value) in [
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "9223372036854775807"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "10000000"),
            ("REMEMBER_ME_DAYS", "200000000"),
            ("REMEMBER_ME_DAYS", "3651"),
        ] {
            let err = load(&[(var, value)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: v, .. } if v == var), "{var}={value}");
        }

        let cfg = load(&[("REMEMBER_ME_DAYS", "3650")]).unwrap();
        assert!(Utc::now().checked_add_signed(cfg.remember_me_ttl()).is_some());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = load(&[("JWT_SECRET_KEY", "s3cret"), ("ADMIN_PASSWORD", "hunter22")]).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("s3cret"));
        assert!(!dbg.contains("hunter22"));
    }
}
