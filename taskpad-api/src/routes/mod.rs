/// API route handlers, by resource
///
/// - `health`: Store connectivity check
/// - `auth`: Register, login, token refresh
/// - `users`: The caller's profile
/// - `tasks`: Task REST endpoints
/// - `assistant`: Named-tool dispatch

pub mod assistant;
pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
