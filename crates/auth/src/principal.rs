use serde::Serialize;

use keystone_core::UserId;

use crate::permissions::PermissionSet;
use crate::roles::RoleName;
use crate::user::User;

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the API resolves the
/// token subject to a user row and joins in the role's permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub role: RoleName,
    pub is_active: bool,
    pub permissions: PermissionSet,
}

impl Principal {
    /// Build a principal from a user and the raw permissions JSON of its role.
    ///
    /// `role_permissions` is `None` when the role row could not be found; the
    /// principal then holds no declared permissions.
    pub fn from_user(user: &User, role_permissions: Option<&str>) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
            permissions: role_permissions
                .map(PermissionSet::parse)
                .unwrap_or_default(),
        }
    }
}
