use keystone_core::Entity;
use keystone_todos::Todo;

use super::escape;

/// A single todo row, swappable in place by its toggle and delete controls.
pub fn item(todo: &Todo) -> String {
    let dom_id = todo.dom_id();
    let id = todo.id;
    let (checked, class) = if todo.completed {
        (" checked", "done")
    } else {
        ("", "")
    };

    format!(
        r##"<div id="{dom_id}" class="todo">
<input type="checkbox"{checked} hx-post="/todos/{id}/toggle" hx-target="#{dom_id}" hx-swap="outerHTML">
<span class="{class}">{content}</span>
<button hx-delete="/todos/{id}" hx-target="#{dom_id}" hx-swap="outerHTML" aria-label="Delete">&times;</button>
</div>"##,
        content = escape(&todo.content),
    )
}

pub fn list(todos: &[Todo]) -> String {
    let items: String = todos.iter().map(item).collect();
    format!(r#"<div id="todo-list">{items}</div>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use keystone_core::{TodoId, UserId};

    fn todo(completed: bool, content: &str) -> Todo {
        Todo {
            id: TodoId::new(3),
            content: content.to_string(),
            completed,
            created_at: Utc::now(),
            user_id: UserId::new(1),
        }
    }

    #[test]
    fn item_targets_itself() {
        let html = item(&todo(false, "Buy milk"));
        assert!(html.contains(r#"id="todo-3""#));
        assert!(html.contains(r#"hx-post="/todos/3/toggle""#));
        assert!(html.contains(r##"hx-target="#todo-3""##));
        assert!(!html.contains(" checked"));
    }

    #[test]
    fn completed_item_is_checked_and_struck() {
        let html = item(&todo(true, "Done"));
        assert!(html.contains(" checked"));
        assert!(html.contains(r#"class="done""#));
    }

    #[test]
    fn content_is_escaped() {
        let html = item(&todo(false, "<b>bold</b>"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
