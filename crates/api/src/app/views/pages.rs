use keystone_auth::User;
use keystone_todos::{TODO_CONTENT_MAX_LEN, Todo};

use super::{PageContext, error_banner, escape, layout, todos};

pub fn home(ctx: &PageContext<'_>, items: &[Todo]) -> String {
    let body = match ctx.user {
        Some(current) => format!(
            r##"<h1>Welcome, {name}</h1>
<form hx-post="/todos" hx-target="#todo-list" hx-swap="beforeend" hx-on::after-request="this.reset()">
<input name="content" required maxlength="{TODO_CONTENT_MAX_LEN}" placeholder="What needs doing?">
<button type="submit">Add</button>
</form>
{list}"##,
            name = escape(current.user().display_name()),
            list = todos::list(items),
        ),
        None => r#"<h1>Welcome</h1>
<p><a href="/login">Log in</a> or <a href="/register">create an account</a> to keep a todo list.</p>"#
            .to_string(),
    };
    layout(ctx, "Home", &body)
}

pub fn login(ctx: &PageContext<'_>, error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
{banner}
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<label><input type="checkbox" name="remember_me" value="on"> Remember me</label>
<button type="submit">Log in</button>
</form>
<p>No account? <a href="/register">Register</a></p>"#,
        banner = error_banner(error),
    );
    layout(ctx, "Log in", &body)
}

pub fn register(ctx: &PageContext<'_>, error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Create an account</h1>
{banner}
<form method="post" action="/register">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required minlength="8"></label>
<label>Confirm password <input type="password" name="confirm_password" required minlength="8"></label>
<button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
        banner = error_banner(error),
    );
    layout(ctx, "Register", &body)
}

pub fn profile(ctx: &PageContext<'_>, user: &User) -> String {
    let last_login = user
        .last_login
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    let body = format!(
        r#"<h1>Profile</h1>
<dl>
<dt>Email</dt><dd>{email}</dd>
<dt>Name</dt><dd>{name}</dd>
<dt>Role</dt><dd>{role}</dd>
<dt>Member since</dt><dd>{created}</dd>
<dt>Last login</dt><dd>{last_login}</dd>
</dl>"#,
        email = escape(&user.email),
        name = escape(user.name.as_deref().unwrap_or("")),
        role = escape(user.role.as_str()),
        created = user.created_at.format("%Y-%m-%d"),
    );
    layout(ctx, "Profile", &body)
}
