//! # Taskpad API Server Library
//!
//! HTTP surface for the personal task manager: account registration and
//! login, profile management, task CRUD with free-text task resolution and
//! a named-tool endpoint for assistant integrations.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Environment configuration
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response hardening layers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
