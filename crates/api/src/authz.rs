//! Handler-side authorization guards.
//!
//! Thin wrappers over `keystone_auth` that log denials and convert the
//! outcome into an [`ApiError`].

use keystone_auth::{AuthzError, Permission, authorize, require_admin};

use crate::app::errors::ApiError;
use crate::context::{CurrentUser, Identity};

/// The caller must be active. Inactive accounts get 400 "Inactive user".
pub fn require_active(user: &CurrentUser) -> Result<(), ApiError> {
    if user.principal().is_active {
        Ok(())
    } else {
        Err(ApiError::Inactive)
    }
}

/// The caller must be active and hold `permission` (admins always do).
pub fn require_permission(user: &CurrentUser, permission: &Permission) -> Result<(), ApiError> {
    authorize(user.principal(), permission).map_err(|e| {
        if matches!(e, AuthzError::Forbidden(_)) {
            tracing::warn!(
                user_id = %user.id(),
                role = %user.principal().role,
                permission = %permission,
                "permission denied"
            );
        }
        ApiError::from(e)
    })
}

/// The caller must be an active admin. Anonymous callers get the same 403 as
/// non-admins.
pub fn require_admin_identity(identity: &Identity) -> Result<&CurrentUser, ApiError> {
    let user = identity
        .current()
        .ok_or_else(|| ApiError::from(AuthzError::AdminRequired))?;
    require_admin(user.principal())?;
    Ok(user)
}
