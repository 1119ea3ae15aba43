//! Ledger error types for validation, state, and concurrency errors.

use thiserror::Error;
use uuid::Uuid;

use super::types::TransactionStatus;
use super::validation::Violation;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Structural or business-rule validation failed.
    ///
    /// Carries every violation found, not just the first, so an operator
    /// can fix the input in one pass.
    #[error("Transaction failed validation with {} violation(s)", violations.len())]
    ValidationFailed {
        /// All violations found.
        violations: Vec<Violation>,
    },

    /// Posting was attempted against a transaction that is not pending.
    #[error("Cannot post transaction in {0:?} status; only pending transactions can be posted")]
    CannotPost(TransactionStatus),

    /// Voiding was attempted against a transaction that is not posted.
    #[error("Cannot void transaction in {0:?} status; only posted transactions can be voided")]
    CannotVoid(TransactionStatus),

    /// Cannot modify a posted or voided transaction.
    #[error("Cannot modify transaction in {0:?} status")]
    Immutable(TransactionStatus),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Transaction type not found.
    #[error("Transaction type not found: {0}")]
    TransactionTypeNotFound(Uuid),

    /// Lock acquisition or optimistic check failed; safe to retry.
    #[error("Concurrent modification detected, please retry")]
    ConcurrencyConflict,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::CannotPost(_) => "CANNOT_POST",
            Self::CannotVoid(_) => "CANNOT_VOID",
            Self::Immutable(_) => "TRANSACTION_IMMUTABLE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionTypeNotFound(_) => "TRANSACTION_TYPE_NOT_FOUND",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::ValidationFailed { .. } => 400,

            // 422 Unprocessable - state machine violations
            Self::CannotPost(_) | Self::CannotVoid(_) | Self::Immutable(_) => 422,

            // 404 Not Found
            Self::TransactionNotFound(_)
            | Self::AccountNotFound(_)
            | Self::TransactionTypeNotFound(_) => 404,

            // 409 Conflict - concurrency errors
            Self::ConcurrencyConflict => 409,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if retrying the whole operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::ValidationFailed { violations: vec![] }.error_code(),
            "VALIDATION_FAILED"
        );
        assert_eq!(
            LedgerError::CannotPost(TransactionStatus::Posted).error_code(),
            "CANNOT_POST"
        );
        assert_eq!(
            LedgerError::CannotVoid(TransactionStatus::Pending).error_code(),
            "CANNOT_VOID"
        );
        assert_eq!(
            LedgerError::ConcurrencyConflict.error_code(),
            "CONCURRENCY_CONFLICT"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            LedgerError::ValidationFailed { violations: vec![] }.http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::CannotPost(TransactionStatus::Void).http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::TransactionNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(LedgerError::ConcurrencyConflict.http_status_code(), 409);
        assert_eq!(
            LedgerError::Database("boom".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable() {
        assert!(LedgerError::ConcurrencyConflict.is_retryable());
        assert!(!LedgerError::ValidationFailed { violations: vec![] }.is_retryable());
        assert!(!LedgerError::CannotPost(TransactionStatus::Posted).is_retryable());
    }
}
