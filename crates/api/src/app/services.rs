//! Service wiring: database, repositories, token codec, and configuration.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};

use keystone_auth::{Hs256JwtCodec, JwtCodec, PasswordError, TokenError, User};
use keystone_core::Email;
use keystone_infra::{AppConfig, Database, RoleRepository, StoreError, TodoRepository, UserRepository, seed};

use crate::middleware::AuthState;

#[derive(Clone)]
pub struct AppServices {
    db: Database,
    jwt: Arc<dyn JwtCodec>,
    config: Arc<AppConfig>,
}

impl AppServices {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let jwt: Arc<dyn JwtCodec> = Arc::new(Hs256JwtCodec::new(config.jwt_secret.as_bytes()));
        Self {
            db,
            jwt,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn users(&self) -> UserRepository {
        self.db.users()
    }

    pub fn roles(&self) -> RoleRepository {
        self.db.roles()
    }

    pub fn todos(&self) -> TodoRepository {
        self.db.todos()
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt: self.jwt.clone(),
            users: self.users(),
        }
    }

    pub fn issue_token(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        self.jwt.issue(subject, ttl, Utc::now())
    }

    /// Check an email/password pair.
    ///
    /// Unknown email, wrong password, and inactive account all yield `None`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, StoreError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        let Some(user) = self.users().find_by_email(&email).await? else {
            tracing::info!(email = %email, "login failed: unknown email");
            return Ok(None);
        };

        let plain = password.to_string();
        let hashed = user.hashed_password.clone();
        let verified = tokio::task::spawn_blocking(move || keystone_auth::verify_password(&plain, &hashed))
            .await
            .unwrap_or(false);

        if !verified {
            tracing::info!(user_id = %user.id, "login failed: wrong password");
            return Ok(None);
        }
        if !user.is_active {
            tracing::info!(user_id = %user.id, "login failed: inactive account");
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// bcrypt with the configured cost, off the async runtime.
    pub async fn hash_password(&self, plain: &str) -> Result<String, PasswordError> {
        let plain = plain.to_string();
        let cost = self.config.bcrypt_cost;
        tokio::task::spawn_blocking(move || keystone_auth::hash_password(&plain, cost))
            .await
            .map_err(|e| PasswordError::Hash(e.to_string()))?
    }
}

/// Open the database, create the schema, and seed roles plus the first admin.
pub async fn build_services(config: AppConfig) -> anyhow::Result<AppServices> {
    let db = keystone_infra::connect(&config.database_url).await?;

    seed::ensure_default_roles_exist(&db.roles())
        .await
        .context("failed to seed default roles")?;
    seed::ensure_admin_exists(&db.users(), &config.admin_email, &config.admin_password, config.bcrypt_cost)
        .await
        .context("failed to ensure an admin account exists")?;

    Ok(AppServices::new(db, config))
}
