//! `keystone-auth`: authentication and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! hash and verify passwords, mint and check bearer tokens, and decide whether a
//! resolved principal may exercise a permission.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{authorize, has_permission, require_admin, AuthzError};
pub use claims::{validate_claims, TokenClaims, TokenValidationError};
pub use jwt::{Hs256JwtCodec, JwtCodec, TokenError};
pub use password::{PasswordError, check_password_policy, generate_password, hash_password, verify_password};
pub use permissions::{Permission, PermissionFormatError, PermissionSet};
pub use principal::Principal;
pub use roles::{Role, RoleName, RoleTemplate, default_roles};
pub use user::User;
