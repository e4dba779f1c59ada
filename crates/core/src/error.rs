//! Domain error model.

use thiserror::Error;

/// Rejection of a value before it reaches storage.
///
/// Messages are written for the person who typed the value; the HTTP layer
/// shows them as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or out-of-range input (email, role name, todo content).
    #[error("{0}")]
    Validation(String),

    /// An identifier that does not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_shown_verbatim() {
        assert_eq!(DomainError::validation("email is required").to_string(), "email is required");
        assert_eq!(DomainError::invalid_id("abc").to_string(), "invalid identifier: abc");
    }
}
