//! Error types for the credit ledger

use crate::types::OrganizationId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every business error is raised before anything is committed, so a failed
/// call never leaves a project, balance or transaction half-updated.
#[derive(Error, Debug)]
pub enum Error {
    /// Verification flow misuse (e.g. approving a project that is not pending)
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Non-positive or malformed quantity
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Debit exceeds the available credits of an organization
    #[error("Insufficient balance for {organization}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Organization being debited
        organization: OrganizationId,
        /// Credits available at the time of the check
        available: u64,
        /// Credits requested
        requested: u64,
    },

    /// Malformed input that is not a quantity (empty name, duplicate category)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identifier collision (transaction or project id already present)
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Unknown project or organization where existence is required
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invariant violation (credit conservation, arithmetic overflow, etc.)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration or encoding error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify the error for callers that only care about the category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidStateTransition(_) => ErrorKind::InvalidStateTransition,
            Error::InvalidAmount(_) => ErrorKind::InvalidAmount,
            Error::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Error::Validation(_) => ErrorKind::Validation,
            Error::DuplicateId(_) => ErrorKind::DuplicateId,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvariantViolation(_)
            | Error::Config(_)
            | Error::Metrics(_)
            | Error::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Error category shared by every crate in the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`Error::InvalidStateTransition`]
    InvalidStateTransition,
    /// See [`Error::InvalidAmount`]
    InvalidAmount,
    /// See [`Error::InsufficientBalance`]
    InsufficientBalance,
    /// See [`Error::Validation`]
    Validation,
    /// See [`Error::DuplicateId`]
    DuplicateId,
    /// See [`Error::NotFound`]
    NotFound,
    /// Bugs and infrastructure failures
    Internal,
}

impl ErrorKind {
    /// Stable snake_case label (used for metrics and API bodies)
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidStateTransition => "invalid_state_transition",
            ErrorKind::InvalidAmount => "invalid_amount",
            ErrorKind::InsufficientBalance => "insufficient_balance",
            ErrorKind::Validation => "validation",
            ErrorKind::DuplicateId => "duplicate_id",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
