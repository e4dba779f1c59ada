//! Value objects: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// construct a new one.
///
/// - **Value Object**: `Email("alice@example.com")` - two with the same text are equal
/// - **Entity**: `User { id: UserId(..), .. }` - identified by its id
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Maximum length accepted for an email address (column width).
pub const EMAIL_MAX_LEN: usize = 255;

/// A syntactically valid, normalized email address.
///
/// Normalization trims surrounding whitespace and lowercases the address, so
/// lookups by email are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl ValueObject for Email {}

impl Email {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if normalized.len() > EMAIL_MAX_LEN {
            return Err(DomainError::validation("email is too long"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("invalid email format"));
        }

        let (local, domain) = normalized
            .split_once('@')
            .ok_or_else(|| DomainError::validation("invalid email format"))?;

        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains("..");
        if local.is_empty() || !domain_ok {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}
