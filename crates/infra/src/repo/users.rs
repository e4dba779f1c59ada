use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::instrument;

use keystone_auth::{Principal, RoleName, User};
use keystone_core::{Email, UserId};

use super::{StoreError, decode_error, map_sqlx_error};

/// Fields of a user to be created.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: Option<String>,
    pub hashed_password: String,
    pub role: RoleName,
    pub is_active: bool,
}

/// Administrative edit of a user. The password is changed separately.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub email: Email,
    pub name: Option<String>,
    pub role: RoleName,
    pub is_active: bool,
}

struct UserRow(User);

impl<'r> FromRow<'r, SqliteRow> for UserRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        Ok(UserRow(User {
            id: UserId::new(row.try_get("id")?),
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            hashed_password: row.try_get("hashed_password")?,
            is_active: row.try_get("is_active")?,
            role: RoleName::parse(&role).map_err(decode_error)?,
            created_at: row.try_get("created_at")?,
            last_login: row.try_get("last_login")?,
        }))
    }
}

/// User table access.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_users", e))
    }

    #[instrument(skip(self), err)]
    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Most recently created users, newest first.
    #[instrument(skip(self), err)]
    pub async fn recent(&self, limit: i64) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT ?1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("recent_users", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?1")
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        Ok(row.map(|r| r.0))
    }

    /// Resolve a token subject to a principal, joining in the permissions
    /// of the user's role.
    #[instrument(skip(self), err)]
    pub async fn find_principal(&self, email: &str) -> Result<Option<(User, Principal)>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT users.*, roles.permissions AS role_permissions
            FROM users
            LEFT JOIN roles ON roles.name = users.role
            WHERE users.email = ?1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_principal", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = UserRow::from_row(&row)
            .map_err(|e| map_sqlx_error("find_principal", e))?
            .0;
        let permissions: Option<String> = row
            .try_get("role_permissions")
            .map_err(|e| map_sqlx_error("find_principal", e))?;

        let principal = Principal::from_user(&user, permissions.as_deref());
        Ok(Some((user, principal)))
    }

    #[instrument(skip(self), err)]
    pub async fn email_taken(&self, email: &Email, except: Option<UserId>) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1 AND id != ?2")
            .bind(email.as_str())
            .bind(except.map(UserId::get).unwrap_or(-1))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("email_taken", e))?;
        Ok(count > 0)
    }

    #[instrument(skip(self), err)]
    pub async fn count_with_role(&self, role: &RoleName) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_users_with_role", e))
    }

    #[instrument(skip(self, new), fields(email = %new.email, role = %new.role), err)]
    pub async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (email, name, hashed_password, is_active, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(new.email.as_str())
        .bind(normalize_name(new.name))
        .bind(new.hashed_password)
        .bind(new.is_active)
        .bind(new.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;
        Ok(row.0)
    }

    #[instrument(skip(self, update), fields(user_id = %id), err)]
    pub async fn update(&self, id: UserId, update: UserUpdate) -> Result<User, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users
            SET email = ?2, name = ?3, role = ?4, is_active = ?5
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id.get())
        .bind(update.email.as_str())
        .bind(normalize_name(update.name))
        .bind(update.role.as_str())
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        row.map(|r| r.0).ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self, hashed_password), fields(user_id = %id), err)]
    pub async fn set_password(&self, id: UserId, hashed_password: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET hashed_password = ?2 WHERE id = ?1")
            .bind(id.get())
            .bind(hashed_password)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_password", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    pub async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_login = ?2 WHERE id = ?1")
            .bind(id.get())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("touch_last_login", e))?;
        Ok(())
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
