//! HS256 bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, TokenClaims, TokenValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or unverifiable token: {0}")]
    Malformed(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token has no subject")]
    MissingSubject,

    #[error("failed to sign token: {0}")]
    Encode(String),
}

/// Issues and validates signed, time-limited bearer tokens.
pub trait JwtCodec: Send + Sync {
    /// Mint a token for `subject` valid from `now` for `ttl`.
    fn issue(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, TokenError>;

    /// Verify the signature and time window and return the subject.
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError>;
}

/// Symmetric HS256 implementation backed by `jsonwebtoken`.
pub struct Hs256JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256JwtCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        // Time checks are done by `validate_claims` against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256JwtCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtCodec").finish_non_exhaustive()
    }
}

impl JwtCodec for Hs256JwtCodec {
    fn issue(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims::new(subject, now, ttl)?;
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;

        data.claims
            .subject()
            .map(str::to_string)
            .ok_or(TokenError::MissingSubject)
    }
}
