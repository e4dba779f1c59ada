//! Server-rendered HTML.
//!
//! Views are plain functions returning `String`. Every piece of user data goes
//! through [`escape`] before it reaches markup.

use keystone_auth::permissions::VIEW_SYSTEM;

use crate::app::themes::{self, Theme};
use crate::context::CurrentUser;

pub mod admin;
pub mod pages;
pub mod todos;

/// Escape text for use in HTML content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Per-request inputs shared by every full page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub theme: &'static Theme,
    pub user: Option<&'a CurrentUser>,
}

impl<'a> PageContext<'a> {
    pub fn new(theme: &'static Theme, user: Option<&'a CurrentUser>) -> Self {
        Self { theme, user }
    }

    fn shows_admin_link(&self) -> bool {
        self.user
            .is_some_and(|u| keystone_auth::authorize(u.principal(), &VIEW_SYSTEM).is_ok())
    }
}

pub fn layout(ctx: &PageContext<'_>, title: &str, body: &str) -> String {
    let nav = match ctx.user {
        Some(current) => {
            let admin = if ctx.shows_admin_link() {
                r#"<a href="/admin/dashboard">Admin</a>"#
            } else {
                ""
            };
            format!(
                r#"<a href="/">Home</a>{admin}<a href="/profile">{name}</a><a href="/logout">Logout</a>"#,
                name = escape(current.user().display_name()),
            )
        }
        None => r#"<a href="/login">Login</a><a href="/register">Register</a>"#.to_string(),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
<style>{vars}
body{{background:var(--bg);color:var(--fg);font-family:system-ui,sans-serif;margin:0}}
nav{{display:flex;gap:1rem;padding:1rem;background:var(--bg1)}}
nav a,a{{color:var(--accent)}}
a:hover{{color:var(--accent-hover)}}
main{{max-width:60rem;margin:2rem auto;padding:0 1rem}}
.error{{color:var(--error)}}
.success{{color:var(--success)}}
.done{{text-decoration:line-through;color:var(--fg1)}}
table{{width:100%;border-collapse:collapse}}
td,th{{padding:.5rem;border-bottom:1px solid var(--bg2);text-align:left}}
#toast{{position:fixed;bottom:1rem;right:1rem}}
</style>
</head>
<body>
<nav>{nav}{picker}</nav>
<main>{body}</main>
<div id="toast"></div>
<script>
document.body.addEventListener("showToast", function (e) {{
  var t = document.getElementById("toast");
  t.textContent = e.detail.message;
  t.className = e.detail.type;
  setTimeout(function () {{ t.textContent = ""; }}, 3000);
}});
</script>
</body>
</html>"##,
        title = escape(title),
        vars = ctx.theme.css_variables(),
        picker = theme_picker(ctx.theme),
    )
}

fn theme_picker(current: &Theme) -> String {
    let options: String = themes::THEMES
        .iter()
        .map(|t| {
            let selected = if t.name == current.name { " selected" } else { "" };
            format!(r#"<option value="{0}"{selected}>{0}</option>"#, t.name)
        })
        .collect();
    format!(r#"<select name="theme" hx-post="/theme" hx-trigger="change">{options}</select>"#)
}

/// Error banner, or nothing.
pub fn error_banner(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape(e)))
        .unwrap_or_default()
}
