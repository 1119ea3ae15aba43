//! Report error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::lifecycle::ReportStatus;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The ledger-wide double-entry check failed.
    ///
    /// This indicates data corruption upstream of the read and is surfaced
    /// loudly rather than silently corrected.
    #[error("Ledger out of balance: total debits {total_debit} != total credits {total_credit}")]
    Consistency {
        /// Grand debit total.
        total_debit: Decimal,
        /// Grand credit total.
        total_credit: Decimal,
    },

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// A lifecycle action was attempted in a state that forbids it.
    #[error("Cannot {action} report in {status:?} status")]
    InvalidStatusTransition {
        /// The attempted action.
        action: &'static str,
        /// The report's current status.
        status: ReportStatus,
    },

    /// Unknown report type code.
    #[error("Unsupported report type: {0}")]
    UnsupportedType(String),

    /// Report parameters are missing or malformed.
    #[error("Invalid report parameters: {0}")]
    InvalidParameters(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Report not found.
    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Consistency { .. } => "CONSISTENCY_ERROR",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::UnsupportedType(_) => "UNSUPPORTED_REPORT_TYPE",
            Self::InvalidParameters(_) => "INVALID_PARAMETERS",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ReportNotFound(_) => "REPORT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // Corruption is a server-side problem flagged for operators.
            Self::Consistency { .. } | Self::Database(_) => 500,
            Self::InvalidDateRange { .. }
            | Self::UnsupportedType(_)
            | Self::InvalidParameters(_) => 400,
            Self::InvalidStatusTransition { .. } => 422,
            Self::AccountNotFound(_) | Self::ReportNotFound(_) => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_consistency_is_server_error() {
        let err = ReportError::Consistency {
            total_debit: dec!(100),
            total_credit: dec!(90),
        };
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "CONSISTENCY_ERROR");
        assert_eq!(
            err.to_string(),
            "Ledger out of balance: total debits 100 != total credits 90"
        );
    }

    #[test]
    fn test_date_range_is_client_error() {
        let err = ReportError::InvalidDateRange {
            start: chrono::NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_lifecycle_violation_is_unprocessable() {
        let err = ReportError::InvalidStatusTransition {
            action: "cancel",
            status: ReportStatus::Completed,
        };
        assert_eq!(err.http_status_code(), 422);
    }
}
