use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keystone_core::{DomainError, Entity, RoleId};

use crate::permissions::{self, Permission, PermissionSet};

/// Name of the role that bypasses permission checks.
pub const ADMIN_ROLE: &str = "admin";

/// Role assigned to self-registered accounts.
pub const DEFAULT_ROLE: &str = "user";

pub const ROLE_NAME_MAX_LEN: usize = 50;

/// Role identifier used for RBAC.
///
/// Users reference their role by name, so the name is the stable key the
/// authorization layer works with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation("role name is required"));
        }
        if name.chars().count() > ROLE_NAME_MAX_LEN {
            return Err(DomainError::validation(format!(
                "role name must be at most {ROLE_NAME_MAX_LEN} characters"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn admin() -> Self {
        Self(ADMIN_ROLE.to_string())
    }

    pub fn default_role() -> Self {
        Self(DEFAULT_ROLE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_ROLE
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored role with its declared permissions.
///
/// `permissions` keeps the raw JSON text exactly as stored; use
/// [`Role::permission_set`] to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
    pub description: Option<String>,
    pub permissions: String,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::parse(&self.permissions)
    }
}

impl Entity for Role {
    type Id = RoleId;
    const KIND: &'static str = "role";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A role the application seeds when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: PermissionSet,
}

/// Built-in roles: `admin` (everything), `user` (nothing), `moderator`
/// (user management without role or system management).
pub fn default_roles() -> Vec<RoleTemplate> {
    vec![
        RoleTemplate {
            name: ADMIN_ROLE,
            description: "Full system access",
            permissions: grant_only(&permissions::ALL[..]),
        },
        RoleTemplate {
            name: DEFAULT_ROLE,
            description: "Standard user access",
            permissions: grant_only(&[]),
        },
        RoleTemplate {
            name: "moderator",
            description: "User management access",
            permissions: grant_only(&[
                permissions::VIEW_USERS,
                permissions::MANAGE_USERS,
                permissions::VIEW_ROLES,
                permissions::VIEW_SYSTEM,
            ]),
        },
    ]
}

fn grant_only(granted: &[Permission]) -> PermissionSet {
    PermissionSet::from_grants(permissions::ALL.iter().map(|p| (p, granted.contains(p))))
}
