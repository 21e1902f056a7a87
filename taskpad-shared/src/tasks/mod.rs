/// Task management core
///
/// - `validation`: Field normalization
/// - `resolver`: UUID-or-text identifier resolution
/// - `operations`: Add, list, update, delete, toggle and bulk completion
/// - `tools`: Named-tool dispatch for assistants
///
/// Nothing here knows about HTTP or authentication. Callers pass the
/// authenticated user's id and a [`crate::store::Store`].

pub mod error;
pub mod operations;
pub mod resolver;
pub mod tools;
pub mod validation;

pub use error::{Candidate, TaskError, TaskResult};
