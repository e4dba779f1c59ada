use keystone_auth::{Role, User, permissions};
use keystone_core::Entity;

use super::{PageContext, escape, layout};

fn status(user: &User) -> &'static str {
    if user.is_active { "Active" } else { "Inactive" }
}

fn user_rows(users: &[User], can_manage: bool, current_id: Option<keystone_core::UserId>) -> String {
    users
        .iter()
        .map(|u| {
            let actions = if can_manage && Some(u.id) != current_id {
                format!(
                    r##"<a href="/admin/users/{id}/edit">Edit</a>
<button hx-post="/admin/users/{id}/reset-password" hx-confirm="Reset this user's password?" hx-target="#{dom_id}-password">Reset password</button>
<span id="{dom_id}-password"></span>"##,
                    id = u.id,
                    dom_id = u.dom_id(),
                )
            } else {
                String::new()
            };
            format!(
                r#"<tr id="{dom_id}"><td>{email}</td><td>{name}</td><td>{role}</td><td>{status}</td><td>{actions}</td></tr>"#,
                dom_id = u.dom_id(),
                email = escape(&u.email),
                name = escape(u.name.as_deref().unwrap_or("")),
                role = escape(u.role.as_str()),
                status = status(u),
            )
        })
        .collect()
}

pub fn dashboard(ctx: &PageContext<'_>, user_count: i64, recent: &[User]) -> String {
    let rows: String = recent
        .iter()
        .map(|u| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&u.email),
                escape(u.role.as_str()),
                u.created_at.format("%Y-%m-%d %H:%M"),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Admin dashboard</h1>
<p>Total users: <strong id="user-count">{user_count}</strong></p>
<p><a href="/admin/users">Users</a> · <a href="/admin/roles">Roles</a></p>
<h2>Recent users</h2>
<table><thead><tr><th>Email</th><th>Role</th><th>Created</th></tr></thead><tbody>{rows}</tbody></table>"#
    );
    layout(ctx, "Admin dashboard", &body)
}

pub fn users(ctx: &PageContext<'_>, users: &[User], can_manage: bool) -> String {
    let new_link = if can_manage {
        r#"<p><a href="/admin/users/new">New user</a></p>"#
    } else {
        ""
    };
    let body = format!(
        r#"<h1>Users</h1>
{new_link}
<table><thead><tr><th>Email</th><th>Name</th><th>Role</th><th>Status</th><th></th></tr></thead>
<tbody>{rows}</tbody></table>"#,
        rows = user_rows(users, can_manage, ctx.user.map(|u| u.id())),
    );
    layout(ctx, "Users", &body)
}

/// Create form when `user` is `None`, edit form otherwise.
pub fn user_form(ctx: &PageContext<'_>, user: Option<&User>, roles: &[Role]) -> String {
    let selected_role = user.map(|u| u.role.as_str()).unwrap_or(keystone_auth::roles::DEFAULT_ROLE);
    let options: String = roles
        .iter()
        .map(|r| {
            let selected = if r.name.as_str() == selected_role { " selected" } else { "" };
            format!(r#"<option value="{0}"{selected}>{0}</option>"#, escape(r.name.as_str()))
        })
        .collect();

    let active = user.is_none_or(|u| u.is_active);
    let (title, form_attrs, password_field) = match user {
        None => (
            "New user".to_string(),
            r#"method="post" action="/admin/users""#.to_string(),
            r#"<label>Password <input type="password" name="password" required minlength="8"></label>"#,
        ),
        Some(u) => (
            format!("Edit {}", escape(&u.email)),
            format!(r#"hx-put="/admin/users/{}""#, u.id),
            "",
        ),
    };

    let body = format!(
        r#"<h1>{title}</h1>
<form {form_attrs}>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Name <input name="name" value="{name}"></label>
{password_field}
<label>Role <select name="role">{options}</select></label>
<label>Status <select name="is_active"><option value="true"{active_sel}>Active</option><option value="false"{inactive_sel}>Inactive</option></select></label>
<button type="submit">Save</button>
</form>"#,
        email = escape(user.map(|u| u.email.as_str()).unwrap_or("")),
        name = escape(user.and_then(|u| u.name.as_deref()).unwrap_or("")),
        active_sel = if active { " selected" } else { "" },
        inactive_sel = if active { "" } else { " selected" },
    );
    layout(ctx, "User", &body)
}

pub fn roles(ctx: &PageContext<'_>, roles: &[Role], can_manage: bool) -> String {
    let rows: String = roles
        .iter()
        .map(|r| {
            let set = r.permission_set();
            let cells: String = permissions::ALL
                .iter()
                .map(|p| if set.allows(p) { "<td>✓</td>" } else { "<td></td>" })
                .collect();
            let actions = if can_manage {
                format!(
                    r##"<button hx-delete="/admin/roles/{id}" hx-confirm="Delete this role?" hx-target="#{dom_id}" hx-swap="outerHTML">Delete</button>"##,
                    id = r.id,
                    dom_id = r.dom_id(),
                )
            } else {
                String::new()
            };
            format!(
                r#"<tr id="{dom_id}"><td>{name}</td><td>{description}</td>{cells}<td>{actions}</td></tr>"#,
                dom_id = r.dom_id(),
                name = escape(r.name.as_str()),
                description = escape(r.description.as_deref().unwrap_or("")),
            )
        })
        .collect();

    let headers: String = permissions::ALL
        .iter()
        .map(|p| format!("<th>{}</th>", p.as_str()))
        .collect();

    let create_form = if can_manage {
        r#"<h2>New role</h2>
<form method="post" action="/admin/roles">
<label>Name <input name="name" required maxlength="50"></label>
<label>Description <input name="description"></label>
<label>Permissions (JSON) <textarea name="permissions">{}</textarea></label>
<button type="submit">Create</button>
</form>"#
    } else {
        ""
    };

    let body = format!(
        r#"<h1>Roles</h1>
<table><thead><tr><th>Name</th><th>Description</th>{headers}<th></th></tr></thead>
<tbody>{rows}</tbody></table>
{create_form}"#
    );
    layout(ctx, "Roles", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::themes;
    use chrono::Utc;
    use keystone_auth::RoleName;
    use keystone_core::{RoleId, UserId};

    fn user(id: i64, email: &str) -> User {
        User {
            id: UserId::new(id),
            email: email.to_string(),
            name: None,
            hashed_password: String::new(),
            is_active: true,
            role: RoleName::default_role(),
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn dashboard_shows_count_and_escaped_emails() {
        let ctx = PageContext::new(themes::default_theme(), None);
        let html = dashboard(&ctx, 7, &[user(1, "<x>@example.com")]);
        assert!(html.contains(r#"<strong id="user-count">7</strong>"#));
        assert!(html.contains("&lt;x&gt;@example.com"));
    }

    #[test]
    fn edit_form_uses_put() {
        let ctx = PageContext::new(themes::default_theme(), None);
        let html = user_form(&ctx, Some(&user(5, "e@example.com")), &[]);
        assert!(html.contains(r#"hx-put="/admin/users/5""#));
        assert!(!html.contains(r#"name="password""#));

        let mut inactive = user(6, "i@example.com");
        inactive.is_active = false;
        let html = user_form(&ctx, Some(&inactive), &[]);
        assert!(html.contains(r#"<option value="false" selected>Inactive</option>"#));
        assert_eq!(html.matches(r#"name="is_active""#).count(), 1);

        let html = user_form(&ctx, None, &[]);
        assert!(html.contains(r#"action="/admin/users""#));
        assert!(html.contains(r#"name="password""#));
    }

    #[test]
    fn roles_table_marks_granted_permissions() {
        let ctx = PageContext::new(themes::default_theme(), None);
        let role = Role {
            id: RoleId::new(9),
            name: RoleName::parse("viewer").unwrap(),
            description: None,
            permissions: r#"{"view_users": true}"#.to_string(),
            created_at: Utc::now(),
        };
        let html = roles(&ctx, &[role], false);
        assert!(html.contains(r#"<tr id="role-9"><td>viewer</td><td></td><td>✓</td><td></td>"#));
        assert!(!html.contains("New role"));
    }
}
