//! Workflow errors
//!
//! Splits failures into input problems the user can fix and storage failures
//! they cannot.

use thiserror::Error;

use crate::db::DbError;
use crate::nutrition::ValidationError;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} not found with id: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Calculator item not found: {0}")]
    SelectionItemNotFound(String),

    #[error("{0} requires confirm=true")]
    ConfirmationRequired(&'static str),

    #[error("Failed to {action}: {source}")]
    Storage {
        action: &'static str,
        #[source]
        source: DbError,
    },
}

impl ToolError {
    /// True for errors caused by the request rather than by storage
    pub fn is_user_error(&self) -> bool {
        !matches!(self, ToolError::Storage { .. })
    }
}

/// `map_err` adapter that logs a storage failure and wraps it
pub(crate) fn storage(action: &'static str) -> impl FnOnce(DbError) -> ToolError {
    move |source| {
        tracing::error!(error = %source, "failed to {}", action);
        ToolError::Storage { action, source }
    }
}

/// Shorthand for workflow results
pub type ToolResult<T> = Result<T, ToolError>;
