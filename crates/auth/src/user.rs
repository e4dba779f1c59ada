//! User accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use keystone_core::{Entity, UserId};

use crate::roles::RoleName;

/// A stored user account.
///
/// # Invariants
/// - `email` is normalized (trimmed, lowercase) and unique.
/// - `role` names an existing role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip)]
    pub hashed_password: String,
    pub is_active: bool,
    pub role: RoleName,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Name shown in the UI: the full name when set, the email otherwise.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}

impl Entity for User {
    type Id = UserId;
    const KIND: &'static str = "user";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            email: "alice@example.com".to_string(),
            name: name.map(str::to_string),
            hashed_password: "x".to_string(),
            is_active: true,
            role: RoleName::default_role(),
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(user(Some("Alice Smith")).display_name(), "Alice Smith");
        assert_eq!(user(Some("  ")).display_name(), "alice@example.com");
        assert_eq!(user(None).display_name(), "alice@example.com");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_value(user(None)).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn dom_id_uses_kind_prefix() {
        assert_eq!(user(None).dom_id(), "user-1");
    }
}
