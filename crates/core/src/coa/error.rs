//! Chart of accounts error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during chart of accounts operations.
#[derive(Debug, Error)]
pub enum CoaError {
    /// Account number already exists.
    #[error("Account number '{0}' already exists")]
    DuplicateAccountNumber(String),

    /// Category code already exists within the account type.
    #[error("Category code '{0}' already exists for this account type")]
    DuplicateCategoryCode(String),

    /// Category belongs to a different account type than the account.
    #[error("Category account type does not match account type")]
    CategoryTypeMismatch,

    /// Account balance type does not match the type's normal balance.
    #[error("Balance type must match the account type's normal balance")]
    BalanceTypeMismatch,

    /// Parent category belongs to a different account type.
    #[error("Parent category account type does not match")]
    ParentTypeMismatch,

    /// Reparenting would create a category cycle.
    #[error("Category cannot be its own ancestor")]
    CategoryCycle,

    /// Account has posted journal items and cannot be deactivated.
    #[error("Cannot deactivate account: {0} posted journal item(s) reference it")]
    HasPostedActivity(u64),

    /// Account type not found.
    #[error("Account type not found: {0}")]
    AccountTypeNotFound(Uuid),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CoaError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateAccountNumber(_) => "DUPLICATE_ACCOUNT_NUMBER",
            Self::DuplicateCategoryCode(_) => "DUPLICATE_CATEGORY_CODE",
            Self::CategoryTypeMismatch => "CATEGORY_TYPE_MISMATCH",
            Self::BalanceTypeMismatch => "BALANCE_TYPE_MISMATCH",
            Self::ParentTypeMismatch => "PARENT_TYPE_MISMATCH",
            Self::CategoryCycle => "CATEGORY_CYCLE",
            Self::HasPostedActivity(_) => "HAS_POSTED_ACTIVITY",
            Self::AccountTypeNotFound(_) => "ACCOUNT_TYPE_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::DuplicateAccountNumber(_) | Self::DuplicateCategoryCode(_) => 409,
            Self::CategoryTypeMismatch
            | Self::BalanceTypeMismatch
            | Self::ParentTypeMismatch
            | Self::CategoryCycle
            | Self::HasPostedActivity(_) => 400,
            Self::AccountTypeNotFound(_) | Self::CategoryNotFound(_) | Self::AccountNotFound(_) => {
                404
            }
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CoaError::DuplicateAccountNumber("1000".into()).http_status_code(),
            409
        );
        assert_eq!(CoaError::CategoryTypeMismatch.http_status_code(), 400);
        assert_eq!(CoaError::HasPostedActivity(3).http_status_code(), 400);
        assert_eq!(
            CoaError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CoaError::HasPostedActivity(2).to_string(),
            "Cannot deactivate account: 2 posted journal item(s) reference it"
        );
    }
}
