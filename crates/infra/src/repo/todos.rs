use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::instrument;

use keystone_core::{TodoId, UserId};
use keystone_todos::{Todo, TodoContent};

use super::{StoreError, map_sqlx_error};

struct TodoRow(Todo);

impl<'r> FromRow<'r, SqliteRow> for TodoRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(TodoRow(Todo {
            id: TodoId::new(row.try_get("id")?),
            content: row.try_get("content")?,
            completed: row.try_get("completed")?,
            created_at: row.try_get("created_at")?,
            user_id: UserId::new(row.try_get("user_id")?),
        }))
    }
}

/// Todo table access. Every operation is scoped to the owning user, so a
/// todo belonging to someone else behaves exactly like a missing one.
#[derive(Debug, Clone)]
pub struct TodoRepository {
    pool: SqlitePool,
}

impl TodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), fields(user_id = %owner), err)]
    pub async fn list_for(&self, owner: UserId) -> Result<Vec<Todo>, StoreError> {
        let rows: Vec<TodoRow> = sqlx::query_as("SELECT * FROM todos WHERE user_id = ?1 ORDER BY id")
            .bind(owner.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_todos", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    #[instrument(skip(self, content), fields(user_id = %owner), err)]
    pub async fn create(&self, owner: UserId, content: TodoContent) -> Result<Todo, StoreError> {
        let row: TodoRow = sqlx::query_as(
            r#"
            INSERT INTO todos (content, completed, created_at, user_id)
            VALUES (?1, 0, ?2, ?3)
            RETURNING *
            "#,
        )
        .bind(content.as_str())
        .bind(Utc::now())
        .bind(owner.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_todo", e))?;
        Ok(row.0)
    }

    /// Flip `completed` and return the updated todo.
    #[instrument(skip(self), fields(todo_id = %id, user_id = %owner), err)]
    pub async fn toggle(&self, owner: UserId, id: TodoId) -> Result<Todo, StoreError> {
        let row: Option<TodoRow> = sqlx::query_as(
            r#"
            UPDATE todos
            SET completed = NOT completed
            WHERE id = ?1 AND user_id = ?2
            RETURNING *
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("toggle_todo", e))?;
        row.map(|r| r.0).ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self), fields(todo_id = %id, user_id = %owner), err)]
    pub async fn delete(&self, owner: UserId, id: TodoId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1 AND user_id = ?2")
            .bind(id.get())
            .bind(owner.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_todo", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, memory};
    use crate::repo::users::NewUser;
    use crate::seed::ensure_default_roles_exist;
    use keystone_auth::RoleName;
    use keystone_core::Email;

    async fn user(db: &Database, email: &str) -> UserId {
        db.users()
            .create(NewUser {
                email: Email::parse(email).unwrap(),
                name: None,
                hashed_password: "hash".to_string(),
                role: RoleName::default_role(),
                is_active: true,
            })
            .await
            .unwrap()
            .id
    }

    async fn setup() -> (Database, UserId, UserId) {
        let db = memory().await;
        ensure_default_roles_exist(&db.roles()).await.unwrap();
        let alice = user(&db, "alice@example.com").await;
        let bob = user(&db, "bob@example.com").await;
        (db, alice, bob)
    }

    #[tokio::test]
    async fn create_list_toggle_delete() {
        let (db, alice, _) = setup().await;
        let todos = db.todos();

        let todo = todos.create(alice, TodoContent::parse("Test todo").unwrap()).await.unwrap();
        assert!(!todo.completed);
        assert_eq!(todo.user_id, alice);

        let toggled = todos.toggle(alice, todo.id).await.unwrap();
        assert!(toggled.completed);
        assert!(!todos.toggle(alice, todo.id).await.unwrap().completed);

        assert_eq!(todos.list_for(alice).await.unwrap().len(), 1);
        todos.delete(alice, todo.id).await.unwrap();
        assert!(todos.list_for(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_users_todos_are_invisible() {
        let (db, alice, bob) = setup().await;
        let todos = db.todos();
        let todo = todos.create(alice, TodoContent::parse("private").unwrap()).await.unwrap();

        assert!(todos.list_for(bob).await.unwrap().is_empty());
        assert_eq!(todos.toggle(bob, todo.id).await.map(|_| ()), Err(StoreError::NotFound));
        assert_eq!(todos.delete(bob, todo.id).await, Err(StoreError::NotFound));
        assert!(!todos.list_for(alice).await.unwrap()[0].completed);
    }

    #[tokio::test]
    async fn missing_todo_is_not_found() {
        let (db, alice, _) = setup().await;
        assert_eq!(db.todos().delete(alice, TodoId::new(999)).await, Err(StoreError::NotFound));
    }
}
