use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keystone_core::{DomainError, Entity, TodoId, UserId, ValueObject};

pub const TODO_CONTENT_MAX_LEN: usize = 500;

/// Validated todo text: trimmed, non-empty, at most
/// [`TODO_CONTENT_MAX_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoContent(String);

impl ValueObject for TodoContent {}

impl TodoContent {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let content = raw.trim();
        if content.is_empty() {
            return Err(DomainError::validation("todo content is required"));
        }
        if content.chars().count() > TODO_CONTENT_MAX_LEN {
            return Err(DomainError::validation(format!(
                "todo content must be at most {TODO_CONTENT_MAX_LEN} characters"
            )));
        }
        Ok(Self(content.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TodoContent {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TodoContent> for String {
    fn from(value: TodoContent) -> Self {
        value.0
    }
}

/// A todo item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: TodoId,
    pub content: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
}

impl Todo {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

impl Entity for Todo {
    type Id = TodoId;
    const KIND: &'static str = "todo";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
