//! Per-user todo endpoints. Every operation is scoped to the caller.

use std::sync::Arc;

use axum::{
    Extension, Json,
    response::Html,
};

use keystone_core::TodoId;
use keystone_infra::StoreError;
use keystone_todos::{Todo, TodoContent};

use crate::app::dto::TodoForm;
use crate::app::errors::ApiError;
use crate::app::extract::{ApiForm, ApiPath};
use crate::app::services::AppServices;
use crate::app::views;
use crate::authz::require_active;
use crate::context::CurrentUser;

#[derive(Debug, serde::Serialize)]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

fn not_found(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::NotFound("Todo not found"),
        other => other.into(),
    }
}

/// GET /todos
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<TodoList>, ApiError> {
    require_active(&current)?;
    let todos = services.todos().list_for(current.id()).await?;
    Ok(Json(TodoList { todos }))
}

/// POST /todos - returns the new item's fragment
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiForm(form): ApiForm<TodoForm>,
) -> Result<Html<String>, ApiError> {
    require_active(&current)?;
    let content = TodoContent::parse(&form.content)?;
    let todo = services.todos().create(current.id(), content).await?;
    tracing::debug!(todo_id = %todo.id, user_id = %current.id(), "todo created");
    Ok(Html(views::todos::item(&todo)))
}

/// POST /todos/:id/toggle
pub async fn toggle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<TodoId>,
) -> Result<Html<String>, ApiError> {
    require_active(&current)?;
    let todo = services.todos().toggle(current.id(), id).await.map_err(not_found)?;
    Ok(Html(views::todos::item(&todo)))
}

/// DELETE /todos/:id - empty body so htmx removes the row
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<TodoId>,
) -> Result<Html<&'static str>, ApiError> {
    require_active(&current)?;
    services.todos().delete(current.id(), id).await.map_err(not_found)?;
    Ok(Html(""))
}
