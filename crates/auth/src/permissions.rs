use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Permission identifier.
///
/// Permissions are opaque names (e.g. "view_users"). Roles declare them in a
/// flat JSON object mapping each name to a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const VIEW_USERS: Permission = Permission(Cow::Borrowed("view_users"));
pub const MANAGE_USERS: Permission = Permission(Cow::Borrowed("manage_users"));
pub const VIEW_ROLES: Permission = Permission(Cow::Borrowed("view_roles"));
pub const MANAGE_ROLES: Permission = Permission(Cow::Borrowed("manage_roles"));
pub const VIEW_SYSTEM: Permission = Permission(Cow::Borrowed("view_system"));
pub const MANAGE_SYSTEM: Permission = Permission(Cow::Borrowed("manage_system"));

/// Every permission the application checks, in display order.
pub const ALL: [Permission; 6] = [
    VIEW_USERS,
    MANAGE_USERS,
    VIEW_ROLES,
    MANAGE_ROLES,
    VIEW_SYSTEM,
    MANAGE_SYSTEM,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionFormatError {
    #[error("permissions must be valid JSON: {0}")]
    InvalidJson(String),

    #[error("permissions must be a JSON object")]
    NotAnObject,

    #[error("permission '{0}' must be true or false")]
    NotABoolean(String),
}

/// Declared permissions of a role.
///
/// Built from the JSON text stored on the role row. Lookups never fail: a
/// permission that is absent, non-boolean, or declared by a document that
/// could not be parsed at all is simply not granted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<String, bool>);

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lenient parse used on the read path.
    pub fn parse(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "unparsable role permissions; granting nothing");
                return Self::empty();
            }
        };

        let serde_json::Value::Object(map) = value else {
            return Self::empty();
        };

        Self(
            map.into_iter()
                .filter_map(|(name, v)| v.as_bool().map(|granted| (name, granted)))
                .collect(),
        )
    }

    /// Strict parse used when a role is written: the document must be a JSON
    /// object whose values are all booleans.
    pub fn parse_strict(raw: &str) -> Result<Self, PermissionFormatError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| PermissionFormatError::InvalidJson(e.to_string()))?;

        let serde_json::Value::Object(map) = value else {
            return Err(PermissionFormatError::NotAnObject);
        };

        let mut out = BTreeMap::new();
        for (name, v) in map {
            let granted = v
                .as_bool()
                .ok_or_else(|| PermissionFormatError::NotABoolean(name.clone()))?;
            out.insert(name, granted);
        }
        Ok(Self(out))
    }

    pub fn from_grants<'a>(grants: impl IntoIterator<Item = (&'a Permission, bool)>) -> Self {
        Self(
            grants
                .into_iter()
                .map(|(p, granted)| (p.as_str().to_string(), granted))
                .collect(),
        )
    }

    pub fn allows(&self, permission: &Permission) -> bool {
        self.0.get(permission.as_str()).copied().unwrap_or(false)
    }

    /// Names of the granted permissions, sorted.
    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(name, _)| name.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, granted)| (name.as_str(), *granted))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lookup_reads_declared_flags() {
        let set = PermissionSet::parse(r#"{"view_users": true, "manage_users": false}"#);
        assert!(set.allows(&VIEW_USERS));
        assert!(!set.allows(&MANAGE_USERS));
        assert!(!set.allows(&VIEW_ROLES));
    }

    #[test]
    fn malformed_documents_grant_nothing() {
        for raw in ["invalid json", "", "[]", "\"view_users\"", "null", "42"] {
            let set = PermissionSet::parse(raw);
            assert!(!set.allows(&VIEW_USERS), "document {raw:?} granted a permission");
        }
    }

    #[test]
    fn non_boolean_values_are_not_grants() {
        let set = PermissionSet::parse(r#"{"view_users": "yes", "view_roles": 1, "view_system": true}"#);
        assert!(!set.allows(&VIEW_USERS));
        assert!(!set.allows(&VIEW_ROLES));
        assert!(set.allows(&VIEW_SYSTEM));
    }

    #[test]
    fn strict_parse_rejects_what_lenient_parse_tolerates() {
        assert!(matches!(
            PermissionSet::parse_strict("nope"),
            Err(PermissionFormatError::InvalidJson(_))
        ));
        assert_eq!(PermissionSet::parse_strict("[]"), Err(PermissionFormatError::NotAnObject));
        assert_eq!(
            PermissionSet::parse_strict(r#"{"view_users": 1}"#),
            Err(PermissionFormatError::NotABoolean("view_users".to_string()))
        );
        assert!(PermissionSet::parse_strict("{}").unwrap().granted().next().is_none());
    }

    #[test]
    fn granted_lists_only_true_flags() {
        let set = PermissionSet::from_grants([(&VIEW_USERS, true), (&MANAGE_USERS, false), (&VIEW_SYSTEM, true)]);
        assert_eq!(set.granted().collect::<Vec<_>>(), vec!["view_system", "view_users"]);
    }

    proptest! {
        #[test]
        fn parse_never_panics(raw in ".*") {
            let set = PermissionSet::parse(&raw);
            let _ = set.allows(&MANAGE_SYSTEM);
        }

        #[test]
        fn json_text_is_stable(flags in prop::collection::vec(any::<bool>(), 6)) {
            let set = PermissionSet::from_grants(ALL.iter().zip(flags.iter().copied()));
            let reparsed = PermissionSet::parse_strict(&set.to_json()).unwrap();
            prop_assert_eq!(&reparsed, &set);
            for (perm, flag) in ALL.iter().zip(flags) {
                prop_assert_eq!(reparsed.allows(perm), flag);
            }
        }
    }
}
