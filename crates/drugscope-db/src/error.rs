//! Database error types.
//!
//! `DbError` stays inside the data layer. `ConnectionManager::run` translates it
//! into a `QueryError` before anything reaches an aggregator's caller.

use thiserror::Error;
use tokio_postgres::error::SqlState;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// Connection could not be established or was lost.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Every pooled connection was checked out for longer than the wait bound.
    #[error("connection pool exhausted")]
    PoolExhausted,

    #[error("backend call timed out")]
    Timeout,

    /// A relation or column the queries rely on does not exist, or decodes to an unexpected type.
    #[error("schema mismatch on {object}: {detail}")]
    SchemaMismatch { object: String, detail: String },

    /// Any other server-side failure (permissions, bad plan, ...).
    #[error("query failed ({code}): {message}")]
    Query { code: String, message: String },

    #[error("pool configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Errors after which the link should be re-probed before the next call.
    pub fn is_connection_loss(&self) -> bool {
        matches!(self, DbError::Unavailable(_) | DbError::Timeout)
    }

    pub fn schema(object: impl Into<String>, detail: impl Into<String>) -> Self {
        DbError::SchemaMismatch { object: object.into(), detail: detail.into() }
    }
}

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        let Some(db_err) = err.as_db_error() else {
            // Client-side: closed socket, I/O, TLS, protocol.
            return DbError::Unavailable(err.to_string());
        };

        let code = db_err.code();
        if *code == SqlState::UNDEFINED_TABLE || *code == SqlState::UNDEFINED_COLUMN {
            return DbError::SchemaMismatch {
                object: db_err.table().unwrap_or("relation").to_string(),
                detail: db_err.message().to_string(),
            };
        }
        if *code == SqlState::QUERY_CANCELED {
            return DbError::Timeout;
        }

        // Class 08 connection exception, class 57 operator intervention (shutdown, restart).
        let class = &code.code()[..2];
        if class == "08" || class == "57" {
            return DbError::Unavailable(db_err.message().to_string());
        }

        DbError::Query {
            code: code.code().to_string(),
            message: db_err.message().to_string(),
        }
    }
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        use deadpool_postgres::{PoolError, TimeoutType};

        match err {
            PoolError::Timeout(TimeoutType::Wait)   => DbError::PoolExhausted,
            PoolError::Timeout(_)                   => DbError::Unavailable("connection setup timed out".to_string()),
            PoolError::Backend(e)                   => DbError::from(e),
            other                                   => DbError::Unavailable(other.to_string()),
        }
    }
}

impl From<deadpool_postgres::CreatePoolError> for DbError {
    fn from(err: deadpool_postgres::CreatePoolError) -> Self {
        DbError::Config(err.to_string())
    }
}
