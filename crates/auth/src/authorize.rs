use thiserror::Error;

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Inactive user")]
    Inactive,

    #[error("Permission denied: {0} required")]
    Forbidden(String),

    #[error("Not authorized. Admin role required.")]
    AdminRequired,
}

/// Whether the principal's role declares `permission` as granted.
///
/// Pure lookup: no role bypass, and an unknown permission is simply `false`.
pub fn has_permission(principal: &Principal, permission: &Permission) -> bool {
    principal.permissions.allows(permission)
}

/// Gate a handler on a named permission.
///
/// - inactive principals are rejected outright
/// - the admin role is granted everything, whatever its declared permissions
/// - otherwise the permission must be declared `true` on the principal's role
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if !principal.is_active {
        return Err(AuthzError::Inactive);
    }

    if principal.role.is_admin() || has_permission(principal, required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Gate on the admin role itself (used for operator-only surfaces).
pub fn require_admin(principal: &Principal) -> Result<(), AuthzError> {
    if !principal.is_active {
        return Err(AuthzError::Inactive);
    }

    if principal.role.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{self, PermissionSet};
    use crate::roles::{default_roles, RoleName};
    use keystone_core::UserId;

    fn principal(role: &str, active: bool) -> Principal {
        let permissions = default_roles()
            .into_iter()
            .find(|r| r.name == role)
            .map(|r| r.permissions)
            .unwrap_or_default();

        Principal {
            user_id: UserId::new(1),
            email: format!("{role}@example.com"),
            role: RoleName::parse(role).unwrap(),
            is_active: active,
            permissions,
        }
    }

    #[test]
    fn admin_passes_every_gate() {
        let admin = principal("admin", true);
        for p in permissions::ALL.iter() {
            assert_eq!(authorize(&admin, p), Ok(()));
        }
        assert_eq!(authorize(&admin, &Permission::new("not_declared_anywhere")), Ok(()));
        assert_eq!(require_admin(&admin), Ok(()));
    }

    #[test]
    fn admin_bypass_ignores_declared_permissions() {
        let mut admin = principal("admin", true);
        admin.permissions = PermissionSet::parse("garbage");
        assert_eq!(authorize(&admin, &permissions::MANAGE_SYSTEM), Ok(()));
        // The pure lookup still reports what is declared.
        assert!(!has_permission(&admin, &permissions::MANAGE_SYSTEM));
    }

    #[test]
    fn has_permission_is_false_for_unknown_names() {
        let admin = principal("admin", true);
        assert!(!has_permission(&admin, &Permission::new("nonexistent_permission")));
    }

    #[test]
    fn regular_user_is_forbidden() {
        let user = principal("user", true);
        assert_eq!(
            authorize(&user, &permissions::VIEW_USERS),
            Err(AuthzError::Forbidden("view_users".to_string()))
        );
        assert_eq!(require_admin(&user), Err(AuthzError::AdminRequired));
    }

    #[test]
    fn moderator_gets_declared_permissions_only() {
        let m = principal("moderator", true);
        assert!(authorize(&m, &permissions::VIEW_SYSTEM).is_ok());
        assert!(authorize(&m, &permissions::MANAGE_USERS).is_ok());
        assert!(authorize(&m, &permissions::MANAGE_ROLES).is_err());
        assert!(authorize(&m, &permissions::MANAGE_SYSTEM).is_err());
    }

    #[test]
    fn unknown_role_has_no_permissions() {
        let ghost = principal("ghost", true);
        assert!(permissions::ALL.iter().all(|p| authorize(&ghost, p).is_err()));
    }

    #[test]
    fn inactive_principals_are_rejected_before_role_checks() {
        let admin = principal("admin", false);
        assert_eq!(authorize(&admin, &permissions::VIEW_USERS), Err(AuthzError::Inactive));
        assert_eq!(require_admin(&admin), Err(AuthzError::Inactive));
    }
}
