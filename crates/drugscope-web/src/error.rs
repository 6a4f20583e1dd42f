//! HTTP mapping for query errors.
//!
//! Bodies carry only the machine-readable kind; rendering a message is up to
//! the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use drugscope_common::{ErrorKind, QueryError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound           => StatusCode::NOT_FOUND,
        ErrorKind::MalformedInput     => StatusCode::BAD_REQUEST,
        ErrorKind::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::SchemaMismatch     => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Query(err) = self;
        let kind = err.kind();
        (status_for(kind), Json(ErrorBody { kind })).into_response()
    }
}
