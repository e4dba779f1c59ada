use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bearer token claims.
///
/// `sub` carries the subject's email. It is optional on the wire so a token
/// without a subject decodes and is then rejected explicitly rather than as a
/// generic parse failure. `iat` is optional too: tokens carrying only `sub`
/// and `exp` are valid until they expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued-at, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(subject: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Result<Self, TokenValidationError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenValidationError::LifetimeOutOfRange)?;
        Ok(Self {
            sub: Some(subject.into()),
            iat: Some(issued_at.timestamp()),
            exp: expires_at.timestamp(),
        })
    }

    /// The subject, if present and non-blank.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token lifetime out of range")]
    LifetimeOutOfRange,
}

/// Deterministically validate token claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::jwt`].
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if let Some(iat) = claims.iat {
        if claims.exp <= iat {
            return Err(TokenValidationError::InvalidTimeWindow);
        }
        if now < iat {
            return Err(TokenValidationError::NotYetValid);
        }
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn valid_inside_window() {
        let claims = TokenClaims::new("a@example.com", at(1_000), Duration::minutes(30)).unwrap();
        assert_eq!(validate_claims(&claims, at(1_000)), Ok(()));
        assert_eq!(validate_claims(&claims, at(2_799)), Ok(()));
    }

    #[test]
    fn expired_at_boundary() {
        let claims = TokenClaims::new("a@example.com", at(1_000), Duration::minutes(30)).unwrap();
        assert_eq!(validate_claims(&claims, at(2_800)), Err(TokenValidationError::Expired));
    }

    #[test]
    fn future_issue_time_is_rejected() {
        let claims = TokenClaims::new("a@example.com", at(5_000), Duration::minutes(1)).unwrap();
        assert_eq!(validate_claims(&claims, at(4_999)), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn negative_ttl_is_an_invalid_window() {
        let claims = TokenClaims::new("a@example.com", at(5_000), Duration::hours(-1)).unwrap();
        assert_eq!(
            validate_claims(&claims, at(5_000)),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn blank_subject_is_treated_as_missing() {
        let mut claims = TokenClaims::new("  ", at(0), Duration::minutes(1)).unwrap();
        assert_eq!(claims.subject(), None);
        claims.sub = None;
        assert_eq!(claims.subject(), None);
        assert!(!serde_json::to_string(&claims).unwrap().contains("sub"));
    }

    #[test]
    fn missing_issue_time_only_checks_expiry() {
        let claims = TokenClaims { sub: Some("a@example.com".into()), iat: None, exp: 2_000 };
        assert_eq!(validate_claims(&claims, at(0)), Ok(()));
        assert_eq!(validate_claims(&claims, at(2_000)), Err(TokenValidationError::Expired));

        let decoded: TokenClaims = serde_json::from_str(r#"{"sub":"a@example.com","exp":2000}"#).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn unrepresentable_lifetime_is_an_error() {
        assert_eq!(
            TokenClaims::new("a@example.com", DateTime::<Utc>::MAX_UTC, Duration::minutes(1)),
            Err(TokenValidationError::LifetimeOutOfRange)
        );
    }
}
