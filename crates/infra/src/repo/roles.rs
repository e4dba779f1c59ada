use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::instrument;

use keystone_auth::{PermissionSet, Role, RoleName};
use keystone_core::RoleId;

use super::{StoreError, decode_error, map_sqlx_error};

/// Fields of a role to be created or written over an existing one.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: RoleName,
    pub description: Option<String>,
    pub permissions: PermissionSet,
}

struct RoleRow(Role);

impl<'r> FromRow<'r, SqliteRow> for RoleRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let name: String = row.try_get("name")?;
        Ok(RoleRow(Role {
            id: RoleId::new(row.try_get("id")?),
            name: RoleName::parse(&name).map_err(decode_error)?,
            description: row.try_get("description")?,
            permissions: row.try_get("permissions")?,
            created_at: row.try_get("created_at")?,
        }))
    }
}

/// Role table access.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn list(&self) -> Result<Vec<Role>, StoreError> {
        let rows: Vec<RoleRow> = sqlx::query_as("SELECT * FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_roles", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    #[instrument(skip(self), fields(role_id = %id), err)]
    pub async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        let row: Option<RoleRow> = sqlx::query_as("SELECT * FROM roles WHERE id = ?1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role_by_id", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let row: Option<RoleRow> = sqlx::query_as("SELECT * FROM roles WHERE name = ?1")
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role_by_name", e))?;
        Ok(row.map(|r| r.0))
    }

    /// Whether another role than `except` already uses `name`.
    #[instrument(skip(self), err)]
    pub async fn name_taken(&self, name: &RoleName, except: Option<RoleId>) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE name = ?1 AND id != ?2")
            .bind(name.as_str())
            .bind(except.map(RoleId::get).unwrap_or(-1))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_name_taken", e))?;
        Ok(count > 0)
    }

    #[instrument(skip(self, new), fields(name = %new.name), err)]
    pub async fn create(&self, new: NewRole) -> Result<Role, StoreError> {
        let row: RoleRow = sqlx::query_as(
            r#"
            INSERT INTO roles (name, description, permissions, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(new.name.as_str())
        .bind(new.description)
        .bind(new.permissions.to_json())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_role", e))?;
        Ok(row.0)
    }

    /// Overwrite a role. Renaming cascades to the users holding it.
    #[instrument(skip(self, role), fields(role_id = %id, name = %role.name), err)]
    pub async fn update(&self, id: RoleId, role: NewRole) -> Result<Role, StoreError> {
        let row: Option<RoleRow> = sqlx::query_as(
            r#"
            UPDATE roles
            SET name = ?2, description = ?3, permissions = ?4
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id.get())
        .bind(role.name.as_str())
        .bind(role.description)
        .bind(role.permissions.to_json())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_role", e))?;
        row.map(|r| r.0).ok_or(StoreError::NotFound)
    }

    /// Delete a role. Fails with `Conflict` while any user still holds it.
    #[instrument(skip(self), fields(role_id = %id), err)]
    pub async fn delete(&self, id: RoleId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = ?1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_role", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
