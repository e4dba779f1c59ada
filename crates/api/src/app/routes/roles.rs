//! Role administration.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    http::HeaderMap,
    response::{Html, Response},
    routing::{get, put},
};
use serde_json::json;

use keystone_auth::{
    PermissionSet, RoleName, authorize,
    permissions::{MANAGE_ROLES, VIEW_ROLES},
};
use keystone_core::RoleId;
use keystone_infra::repo::NewRole;

use crate::app::dto::{RoleForm, optional_text};
use crate::app::errors::ApiError;
use crate::app::extract::{ApiForm, ApiPath};
use crate::app::services::AppServices;
use crate::app::htmx;
use crate::app::themes;
use crate::app::views::{self, PageContext};
use crate::authz::require_permission;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/:id", put(update_role).delete(delete_role))
}

/// GET /admin/roles
pub async fn list_roles(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, ApiError> {
    require_permission(&current, &VIEW_ROLES)?;

    let roles = services.roles().list().await?;
    let can_manage = authorize(current.principal(), &MANAGE_ROLES).is_ok();

    let ctx = PageContext::new(themes::current(&headers), Some(&current));
    Ok(Html(views::admin::roles(&ctx, &roles, can_manage)))
}

/// POST /admin/roles
pub async fn create_role(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiForm(form): ApiForm<RoleForm>,
) -> Result<Response, ApiError> {
    require_permission(&current, &MANAGE_ROLES)?;

    let name = RoleName::parse(&form.name)?;
    if services.roles().name_taken(&name, None).await? {
        return Err(ApiError::bad_request("Role name already exists"));
    }
    let permissions = PermissionSet::parse_strict(form.permissions())?;

    let role = services
        .roles()
        .create(NewRole {
            name,
            description: optional_text(form.description),
            permissions,
        })
        .await?;

    tracing::info!(admin_id = %current.id(), role = %role.name, "role created");
    Ok(htmx::redirect(&headers, "/admin/roles"))
}

/// PUT /admin/roles/:id
pub async fn update_role(
    headers: HeaderMap,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<RoleId>,
    ApiForm(form): ApiForm<RoleForm>,
) -> Result<Response, ApiError> {
    require_permission(&current, &MANAGE_ROLES)?;

    let roles = services.roles();
    let existing = roles.find_by_id(id).await?.ok_or(ApiError::NotFound("Role not found"))?;

    let name = RoleName::parse(&form.name)?;
    if roles.name_taken(&name, Some(id)).await? {
        return Err(ApiError::bad_request("Role name already taken"));
    }
    if existing.name.is_admin() && !name.is_admin() {
        return Err(ApiError::bad_request("The admin role cannot be renamed"));
    }
    let permissions = PermissionSet::parse_strict(form.permissions())?;

    let role = roles
        .update(
            id,
            NewRole {
                name,
                description: optional_text(form.description),
                permissions,
            },
        )
        .await?;

    tracing::info!(admin_id = %current.id(), role_id = %role.id, role = %role.name, "role updated");
    Ok(htmx::redirect(&headers, "/admin/roles"))
}

/// DELETE /admin/roles/:id
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<RoleId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_permission(&current, &MANAGE_ROLES)?;

    let roles = services.roles();
    let role = roles.find_by_id(id).await?.ok_or(ApiError::NotFound("Role not found"))?;

    if services.users().count_with_role(&role.name).await? > 0 {
        return Err(ApiError::bad_request("Cannot delete role that is assigned to users"));
    }

    roles.delete(id).await?;
    tracing::info!(admin_id = %current.id(), role = %role.name, "role deleted");
    Ok(Json(json!({ "success": true })))
}
