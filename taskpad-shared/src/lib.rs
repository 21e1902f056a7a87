//! # Taskpad Shared Library
//!
//! This crate contains the task domain and everything the API server needs
//! to drive it.
//!
//! ## Module Organization
//!
//! - `models`: Users and tasks, with their PostgreSQL queries
//! - `store`: Transactional storage abstraction (PostgreSQL and in-memory)
//! - `tasks`: Validation, identifier resolution, task operations and assistant tools
//! - `auth`: Password hashing, JWT tokens and request auth context
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod clock;
pub mod db;
pub mod models;
pub mod store;
pub mod tasks;

/// Current version of the Taskpad shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
