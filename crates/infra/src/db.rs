//! SQLite pool and schema.

use std::str::FromStr;

use anyhow::Context;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::repo::{RoleRepository, StoreError, TodoRepository, UserRepository, map_sqlx_error};

/// Schema statements, applied in order on every start.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT    NOT NULL UNIQUE,
        description TEXT    NULL,
        permissions TEXT    NOT NULL DEFAULT '{}',
        created_at  TEXT    NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        email           TEXT    NOT NULL UNIQUE,
        name            TEXT    NULL,
        hashed_password TEXT    NOT NULL,
        is_active       INTEGER NOT NULL DEFAULT 1,
        role            TEXT    NOT NULL DEFAULT 'user'
                        REFERENCES roles(name) ON UPDATE CASCADE,
        created_at      TEXT    NOT NULL,
        last_login      TEXT    NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_users_role ON users (role)",
    r#"
    CREATE TABLE IF NOT EXISTS todos (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        content    TEXT    NOT NULL,
        completed  INTEGER NOT NULL DEFAULT 0,
        created_at TEXT    NOT NULL,
        user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_todos_user_id ON todos (user_id)",
];

/// Handle to the application database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn roles(&self) -> RoleRepository {
        RoleRepository::new(self.pool.clone())
    }

    pub fn todos(&self) -> TodoRepository {
        TodoRepository::new(self.pool.clone())
    }

    /// Create missing tables and indexes.
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("create_schema", e))?;
        }
        Ok(())
    }
}

/// Whether `url` names an in-memory database.
pub fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open the database at `url` and make sure the schema exists.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled. File databases get their parent
/// directory created when missing.
pub async fn connect(url: &str) -> anyhow::Result<Database> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid DATABASE_URL {url:?}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_memory_url(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory SQLite database")?
    } else {
        let path = options.get_filename().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create database directory at {parent:?}"))?;
        }

        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open SQLite database at {path:?}"))?
    };

    let db = Database::new(pool);
    db.create_schema().await.context("failed to create schema")?;

    tracing::info!(memory = is_memory_url(url), "database ready");
    Ok(db)
}

#[cfg(test)]
pub(crate) async fn memory() -> Database {
    connect("sqlite::memory:").await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_memory_urls() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite://file:test?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite://data/app.db"));
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let db = memory().await;
        db.create_schema().await.unwrap();

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('roles', 'users', 'todos') ORDER BY name")
                .fetch_all(db.pool())
                .await
                .unwrap();
        let names: Vec<_> = tables.into_iter().map(|(n,)| n).collect();
        assert_eq!(names, vec!["roles", "todos", "users"]);
    }
}
