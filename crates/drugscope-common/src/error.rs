//! Query-level error taxonomy.
//!
//! These are the only failure values that cross the aggregator boundary. Backend
//! error text never ends up in here; it is logged where the translation happens.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Pool exhausted, liveness probe failed, connection lost or the call timed out.
    #[error("backend unavailable during {operation}")]
    BackendUnavailable { operation: &'static str },

    /// The identity does not exist in the store. A normal outcome, not a fault.
    #[error("drug not found: {identity}")]
    NotFound { identity: String },

    /// An expected relation or column is absent from the store.
    #[error("schema mismatch: {object} is missing or has an unexpected shape")]
    SchemaMismatch { object: String },

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Discriminant of [`QueryError`] for exhaustive matching by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BackendUnavailable,
    NotFound,
    SchemaMismatch,
    MalformedInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::NotFound           => "not_found",
            ErrorKind::SchemaMismatch     => "schema_mismatch",
            ErrorKind::MalformedInput     => "malformed_input",
        }
    }
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            QueryError::NotFound { .. }           => ErrorKind::NotFound,
            QueryError::SchemaMismatch { .. }     => ErrorKind::SchemaMismatch,
            QueryError::MalformedInput(_)         => ErrorKind::MalformedInput,
        }
    }

    pub fn unavailable(operation: &'static str) -> Self {
        QueryError::BackendUnavailable { operation }
    }

    pub fn not_found(identity: impl Into<String>) -> Self {
        QueryError::NotFound { identity: identity.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound { .. })
    }
}
