//! Health check and admin-only API documentation.

use axum::{
    Extension, Json,
    http::{HeaderMap, StatusCode},
    response::Html,
};
use serde_json::{Map, Value, json};

use crate::app::errors::ApiError;
use crate::app::themes;
use crate::app::views::{self, PageContext, escape};
use crate::authz::require_admin_identity;
use crate::context::Identity;

/// One documented endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RouteDoc {
    pub method: &'static str,
    /// Path in OpenAPI form (`{id}` placeholders).
    pub path: &'static str,
    pub summary: &'static str,
    pub auth: bool,
}

const fn doc(method: &'static str, path: &'static str, summary: &'static str, auth: bool) -> RouteDoc {
    RouteDoc { method, path, summary, auth }
}

pub const ROUTES: &[RouteDoc] = &[
    doc("get", "/health", "Liveness probe", false),
    doc("post", "/token", "Exchange credentials for a bearer token", false),
    doc("get", "/", "Home page with the caller's todos", false),
    doc("get", "/register", "Registration page", false),
    doc("post", "/register", "Create an account", false),
    doc("get", "/login", "Login page", false),
    doc("post", "/login", "Sign in and set the session cookie", false),
    doc("get", "/logout", "Clear the session cookie", false),
    doc("post", "/theme", "Select a colour theme", false),
    doc("get", "/profile", "Profile of the signed-in user", true),
    doc("get", "/todos", "List the caller's todos", true),
    doc("post", "/todos", "Create a todo", true),
    doc("post", "/todos/{id}/toggle", "Toggle a todo's completion", true),
    doc("delete", "/todos/{id}", "Delete a todo", true),
    doc("get", "/admin/dashboard", "Admin dashboard", true),
    doc("get", "/admin/users", "List users", true),
    doc("post", "/admin/users", "Create a user", true),
    doc("get", "/admin/users/new", "New user form", true),
    doc("get", "/admin/users/{id}/edit", "Edit user form", true),
    doc("put", "/admin/users/{id}", "Update a user", true),
    doc("post", "/admin/users/{id}/reset-password", "Reset a user's password", true),
    doc("get", "/admin/roles", "List roles", true),
    doc("post", "/admin/roles", "Create a role", true),
    doc("put", "/admin/roles/{id}", "Update a role", true),
    doc("delete", "/admin/roles/{id}", "Delete an unused role", true),
];

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /docs
pub async fn docs(
    headers: HeaderMap,
    Extension(identity): Extension<Identity>,
) -> Result<Html<String>, ApiError> {
    let current = require_admin_identity(&identity)?;

    let rows: String = ROUTES
        .iter()
        .map(|r| {
            format!(
                "<tr><td><code>{}</code></td><td><code>{}</code></td><td>{}</td><td>{}</td></tr>",
                r.method.to_uppercase(),
                escape(r.path),
                escape(r.summary),
                if r.auth { "yes" } else { "no" },
            )
        })
        .collect();
    let body = format!(
        r#"<h1>API</h1>
<p>Machine-readable description: <a href="/openapi.json">/openapi.json</a></p>
<table><thead><tr><th>Method</th><th>Path</th><th>Summary</th><th>Auth</th></tr></thead>
<tbody>{rows}</tbody></table>"#
    );

    let ctx = PageContext::new(themes::current(&headers), Some(current));
    Ok(Html(views::layout(&ctx, "API docs", &body)))
}

/// GET /openapi.json
pub async fn openapi(Extension(identity): Extension<Identity>) -> Result<Json<Value>, ApiError> {
    require_admin_identity(&identity)?;
    Ok(Json(openapi_document()))
}

pub fn openapi_document() -> Value {
    let mut paths = Map::new();
    for route in ROUTES {
        let entry = paths
            .entry(route.path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let mut operation = json!({
            "summary": route.summary,
            "responses": { "200": { "description": "Successful response" } },
        });
        if route.auth {
            operation["security"] = json!([{ "bearer": [] }]);
        }
        if route.path.contains("{id}") {
            operation["parameters"] = json!([{
                "name": "id",
                "in": "path",
                "required": true,
                "schema": { "type": "integer" },
            }]);
        }
        if let Value::Object(methods) = entry {
            methods.insert(route.method.to_string(), operation);
        }
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Keystone",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "components": {
            "securitySchemes": {
                "bearer": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" },
            },
        },
        "paths": paths,
    })
}
