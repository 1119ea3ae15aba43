//! Report lifecycle state machine.
//!
//! States: `Pending -> Generating -> Completed | Failed`. A pending or
//! generating report may be cancelled; a completed report may not. Failed
//! reports may be retried (generate is allowed from Pending or Failed).

use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// Supported report types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Trial balance as of a date.
    TrialBalance,
    /// Balance sheet as of a date.
    BalanceSheet,
    /// Income statement over a date range.
    IncomeStatement,
    /// General ledger for one account over a date range.
    GeneralLedger,
}

impl ReportType {
    /// Parses a report type from its storage representation.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "trial_balance" => Some(Self::TrialBalance),
            "balance_sheet" => Some(Self::BalanceSheet),
            "income_statement" => Some(Self::IncomeStatement),
            "general_ledger" => Some(Self::GeneralLedger),
            _ => None,
        }
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrialBalance => "trial_balance",
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
            Self::GeneralLedger => "general_ledger",
        }
    }
}

/// Report generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Queued, not yet started.
    Pending,
    /// Generation in progress.
    Generating,
    /// Generation finished; result stored.
    Completed,
    /// Generation failed; error message stored. May be retried.
    Failed,
    /// Explicitly cancelled before completion.
    Cancelled,
}

impl ReportStatus {
    /// Returns true if generation may start from this status.
    #[must_use]
    pub fn can_generate(self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }

    /// Returns true if the report may be cancelled from this status.
    #[must_use]
    pub fn can_cancel(self) -> bool {
        matches!(self, Self::Pending | Self::Generating)
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its storage representation.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "generating" => Some(Self::Generating),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Transition into `Generating`.
///
/// # Errors
///
/// Returns `ReportError::InvalidStatusTransition` unless the current status
/// is `Pending` or `Failed` (retry).
pub fn start_generation(status: ReportStatus) -> Result<ReportStatus, ReportError> {
    if status.can_generate() {
        Ok(ReportStatus::Generating)
    } else {
        Err(ReportError::InvalidStatusTransition {
            action: "generate",
            status,
        })
    }
}

/// Transition from `Generating` into `Completed`.
///
/// # Errors
///
/// Returns `ReportError::InvalidStatusTransition` unless generating.
pub fn complete_generation(status: ReportStatus) -> Result<ReportStatus, ReportError> {
    if status == ReportStatus::Generating {
        Ok(ReportStatus::Completed)
    } else {
        Err(ReportError::InvalidStatusTransition {
            action: "complete",
            status,
        })
    }
}

/// Transition from `Generating` into `Failed`.
///
/// # Errors
///
/// Returns `ReportError::InvalidStatusTransition` unless generating.
pub fn fail_generation(status: ReportStatus) -> Result<ReportStatus, ReportError> {
    if status == ReportStatus::Generating {
        Ok(ReportStatus::Failed)
    } else {
        Err(ReportError::InvalidStatusTransition {
            action: "fail",
            status,
        })
    }
}

/// Transition into `Cancelled`.
///
/// # Errors
///
/// Returns `ReportError::InvalidStatusTransition` unless pending or
/// generating. In particular, a completed report cannot be cancelled.
pub fn cancel_generation(status: ReportStatus) -> Result<ReportStatus, ReportError> {
    if status.can_cancel() {
        Ok(ReportStatus::Cancelled)
    } else {
        Err(ReportError::InvalidStatusTransition {
            action: "cancel",
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_from_pending_and_failed_only() {
        assert_eq!(
            start_generation(ReportStatus::Pending).unwrap(),
            ReportStatus::Generating
        );
        assert_eq!(
            start_generation(ReportStatus::Failed).unwrap(),
            ReportStatus::Generating
        );
        for status in [
            ReportStatus::Generating,
            ReportStatus::Completed,
            ReportStatus::Cancelled,
        ] {
            assert!(start_generation(status).is_err());
        }
    }

    #[test]
    fn test_complete_only_from_generating() {
        assert_eq!(
            complete_generation(ReportStatus::Generating).unwrap(),
            ReportStatus::Completed
        );
        assert!(complete_generation(ReportStatus::Pending).is_err());
        assert!(complete_generation(ReportStatus::Completed).is_err());
    }

    #[test]
    fn test_fail_only_from_generating() {
        assert_eq!(
            fail_generation(ReportStatus::Generating).unwrap(),
            ReportStatus::Failed
        );
        assert!(fail_generation(ReportStatus::Failed).is_err());
    }

    #[test]
    fn test_cancel_rules() {
        assert_eq!(
            cancel_generation(ReportStatus::Pending).unwrap(),
            ReportStatus::Cancelled
        );
        assert_eq!(
            cancel_generation(ReportStatus::Generating).unwrap(),
            ReportStatus::Cancelled
        );
        // Completed is terminal; cancel must be rejected.
        assert!(cancel_generation(ReportStatus::Completed).is_err());
        assert!(cancel_generation(ReportStatus::Cancelled).is_err());
        assert!(cancel_generation(ReportStatus::Failed).is_err());
    }

    #[test]
    fn test_retry_after_failure() {
        // Pending -> Generating -> Failed -> Generating -> Completed
        let status = start_generation(ReportStatus::Pending).unwrap();
        let status = fail_generation(status).unwrap();
        assert!(status.can_generate());
        let status = start_generation(status).unwrap();
        let status = complete_generation(status).unwrap();
        assert!(status.is_terminal());
    }

    #[test]
    fn test_type_round_trip() {
        for ty in [
            ReportType::TrialBalance,
            ReportType::BalanceSheet,
            ReportType::IncomeStatement,
            ReportType::GeneralLedger,
        ] {
            assert_eq!(ReportType::from_code(ty.as_str()), Some(ty));
        }
        assert_eq!(ReportType::from_code("cash_flow"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReportStatus::Pending,
            ReportStatus::Generating,
            ReportStatus::Completed,
            ReportStatus::Failed,
            ReportStatus::Cancelled,
        ] {
            assert_eq!(ReportStatus::from_code(status.as_str()), Some(status));
        }
    }
}
