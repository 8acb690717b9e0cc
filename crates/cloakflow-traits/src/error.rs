//! Error types for the orchestration engine.

use std::time::Duration;
use thiserror::Error;

/// Engine error taxonomy.
///
/// Propagation policy: `NotFound` aborts the current task handler and the
/// owning entity is marked failed with the error text; `Action` fail-fasts a
/// workflow traversal; `QueueUnavailable` surfaces as a warning on the
/// entity-creation response rather than an error; `Timeout` is raised by the
/// dispatcher when a task exceeds its execution budget.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Action(String),

    #[error("task queue unavailable: {0}")]
    QueueUnavailable(String),

    #[error("task timed out after {0:?}")]
    Timeout(Duration),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
