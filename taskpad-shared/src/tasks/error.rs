/// Errors returned by task operations

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Most candidates reported for an ambiguous match
pub const MAX_CANDIDATES: usize = 5;

/// One task that matched an ambiguous search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: Uuid,
    pub title: String,
}

impl Candidate {
    /// Human-readable label, e.g. `'Buy milk' (ID: 6f1c...)`
    pub fn label(&self) -> String {
        format!("'{}' (ID: {})", self.title, self.id)
    }
}

/// Task operation failures
#[derive(Debug, Error)]
pub enum TaskError {
    /// A field failed validation
    #[error("{0}")]
    Validation(String),

    /// An identifier was malformed or a placeholder
    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    NotFound(String),

    /// Free text matched more than one task
    #[error("{message}")]
    Ambiguous {
        message: String,
        candidates: Vec<Candidate>,
    },

    /// The task belongs to another user
    #[error("{0}")]
    Forbidden(String),

    /// Storage failure; the detail is for logs only
    #[error("{0}")]
    Internal(String),
}

impl TaskError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Validation(_) => "validation_error",
            TaskError::InvalidIdentifier(_) => "invalid_identifier",
            TaskError::NotFound(_) => "not_found",
            TaskError::Ambiguous { .. } => "ambiguous_match",
            TaskError::Forbidden(_) => "forbidden",
            TaskError::Internal(_) => "internal_error",
        }
    }

    /// Wraps a storage failure raised while trying to `action`
    pub(crate) fn store(action: &str, err: StoreError) -> Self {
        TaskError::Internal(format!("Failed to {}: {}", action, err))
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
