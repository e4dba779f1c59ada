//! Infrastructure layer: configuration, SQLite pool, repositories, seeding.

pub mod config;
pub mod db;
pub mod repo;
pub mod seed;

pub use config::{AppConfig, ConfigError};
pub use db::{connect, Database};
pub use repo::{RoleRepository, StoreError, TodoRepository, UserRepository};
