//! Error types for the marketplace

use ledger_core::ErrorKind;
use thiserror::Error;

/// Result type for marketplace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Marketplace errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger_core::Error),

    /// Negative or malformed sale value
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Revenue split policy that cannot be applied
    #[error("Invalid revenue policy: {0}")]
    InvalidPolicy(String),
}

impl Error {
    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Ledger(err) => err.kind(),
            Error::InvalidAmount(_) => ErrorKind::InvalidAmount,
            Error::InvalidPolicy(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::OrganizationId;

    #[test]
    fn test_kind_passes_through_ledger_errors() {
        let err: Error = ledger_core::Error::InsufficientBalance {
            organization: OrganizationId::new("ngo-a"),
            available: 500,
            requested: 600,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(
            Error::InvalidAmount("negative".into()).kind(),
            ErrorKind::InvalidAmount
        );
        assert_eq!(Error::InvalidPolicy("sum".into()).kind(), ErrorKind::Internal);
    }
}
