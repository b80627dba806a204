//! Error types for the credit gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use ledger_core::ErrorKind;
use thiserror::Error;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error
    #[error("{0}")]
    Ledger(#[from] ledger_core::Error),

    /// Marketplace error
    #[error("{0}")]
    Marketplace(#[from] marketplace::Error),

    /// Command actor unavailable
    #[error("Concurrency error: {0}")]
    Concurrency(String),
}

impl Error {
    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Ledger(err) => err.kind(),
            Error::Marketplace(err) => err.kind(),
            Error::Concurrency(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status for the error category
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidAmount | ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidStateTransition | ErrorKind::DuplicateId => StatusCode::CONFLICT,
            ErrorKind::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, kind = %kind, "Request rejected");
        }

        (
            status,
            Json(serde_json::json!({
                "error": kind.as_str(),
                "message": self.to_string(),
                "timestamp": Utc::now(),
            })),
        )
            .into_response()
    }
}
