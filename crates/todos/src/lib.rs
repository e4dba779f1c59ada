//! Todo domain module.
//!
//! Per-user todo items. Pure domain logic: validation and the entity shape,
//! no IO, no HTTP, no storage.

pub mod todo;

pub use todo::{Todo, TodoContent, TODO_CONTENT_MAX_LEN};
