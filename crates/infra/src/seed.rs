//! Startup seeding: default roles, then a first administrator.

use thiserror::Error;

use keystone_auth::{PasswordError, RoleName, User, default_roles, hash_password};
use keystone_core::{DomainError, Email};

use crate::repo::{NewRole, NewUser, RoleRepository, StoreError, UserRepository};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("invalid seed value: {0}")]
    Invalid(#[from] DomainError),
}

/// Insert every built-in role that does not exist yet. Existing roles are
/// left untouched, whatever their current permissions.
pub async fn ensure_default_roles_exist(roles: &RoleRepository) -> Result<usize, SeedError> {
    let mut created = 0;
    for template in default_roles() {
        if roles.find_by_name(template.name).await?.is_some() {
            continue;
        }
        roles
            .create(NewRole {
                name: RoleName::parse(template.name)?,
                description: Some(template.description.to_string()),
                permissions: template.permissions,
            })
            .await?;
        tracing::info!(role = template.name, "created default role");
        created += 1;
    }
    Ok(created)
}

/// Make sure at least one user holds the admin role.
///
/// When none does, an admin account is created for `email` unless that email
/// is already registered, in which case nothing is changed. Returns the
/// account created, if any.
pub async fn ensure_admin_exists(
    users: &UserRepository,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<Option<User>, SeedError> {
    if users.count_with_role(&RoleName::admin()).await? > 0 {
        return Ok(None);
    }

    let email = Email::parse(email)?;
    if users.find_by_email(&email).await?.is_some() {
        tracing::warn!(email = %email, "no admin exists and the admin email belongs to a non-admin account");
        return Ok(None);
    }

    let admin = users
        .create(NewUser {
            email,
            name: None,
            hashed_password: hash_password(password, bcrypt_cost)?,
            role: RoleName::admin(),
            is_active: true,
        })
        .await?;

    tracing::warn!(email = %admin.email, "created default admin user; change its password");
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory;
    use keystone_auth::verify_password;

    #[tokio::test]
    async fn default_roles_are_seeded_once() {
        let db = memory().await;
        assert_eq!(ensure_default_roles_exist(&db.roles()).await.unwrap(), 3);
        assert_eq!(ensure_default_roles_exist(&db.roles()).await.unwrap(), 0);

        let names: Vec<_> = db.roles().list().await.unwrap().into_iter().map(|r| r.name.to_string()).collect();
        assert_eq!(names, vec!["admin", "user", "moderator"]);
    }

    #[tokio::test]
    async fn existing_roles_keep_their_permissions() {
        let db = memory().await;
        db.roles()
            .create(NewRole {
                name: RoleName::parse("moderator").unwrap(),
                description: None,
                permissions: keystone_auth::PermissionSet::empty(),
            })
            .await
            .unwrap();
        ensure_default_roles_exist(&db.roles()).await.unwrap();

        let moderator = db.roles().find_by_name("moderator").await.unwrap().unwrap();
        assert_eq!(moderator.permissions, "{}");
    }

    #[tokio::test]
    async fn admin_is_created_only_when_missing() {
        let db = memory().await;
        ensure_default_roles_exist(&db.roles()).await.unwrap();

        let created = ensure_admin_exists(&db.users(), "Admin@Example.com", "admin123", 4)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.email, "admin@example.com");
        assert!(created.role.is_admin());
        assert!(verify_password("admin123", &created.hashed_password));

        assert!(ensure_admin_exists(&db.users(), "other@example.com", "pw", 4).await.unwrap().is_none());
        assert_eq!(db.users().count().await.unwrap(), 1);
    }
}
