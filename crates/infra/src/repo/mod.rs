//! SQLite repositories.
//!
//! One repository per table. Each owns a clone of the pool and maps every
//! `sqlx` failure to [`StoreError`].
//!
//! ## Error Mapping
//!
//! | SQLx Error                        | StoreError  |
//! |-----------------------------------|-------------|
//! | Database (unique violation)       | `Conflict`  |
//! | Database (foreign key violation)  | `Conflict`  |
//! | RowNotFound                       | `NotFound`  |
//! | anything else                     | `Database`  |

use thiserror::Error;

pub mod roles;
pub mod todos;
pub mod users;

pub use roles::{NewRole, RoleRepository};
pub use todos::TodoRepository;
pub use users::{NewUser, UserRepository, UserUpdate};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    /// A uniqueness or referential constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
}

pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                StoreError::Conflict(message)
            } else {
                StoreError::Database { operation, message }
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::Corrupt(format!("column {index}: {source}"))
        }
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}

/// Wrap a domain parse failure on a stored value as a decode error.
pub(crate) fn decode_error(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
