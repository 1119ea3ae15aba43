//! Database enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Normal balance side for account types and accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "balance_type")]
#[serde(rename_all = "lowercase")]
pub enum BalanceType {
    /// Debit-normal balance.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit-normal balance.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Transaction posting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Editable; no ledger effect.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Posted to the ledger; immutable.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Voided; net ledger effect is zero.
    #[sea_orm(string_value = "void")]
    Void,
}

/// Report generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "report_status")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Queued.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Generation in progress.
    #[sea_orm(string_value = "generating")]
    Generating,
    /// Finished; result stored.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Failed; error stored.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Cancelled before completion.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Report type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "report_type")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Trial balance as of a date.
    #[sea_orm(string_value = "trial_balance")]
    TrialBalance,
    /// Balance sheet as of a date.
    #[sea_orm(string_value = "balance_sheet")]
    BalanceSheet,
    /// Income statement over a date range.
    #[sea_orm(string_value = "income_statement")]
    IncomeStatement,
    /// General ledger for one account.
    #[sea_orm(string_value = "general_ledger")]
    GeneralLedger,
}

// Conversions to the pure domain enums in ledgerly-core.

impl From<BalanceType> for ledgerly_core::ledger::BalanceType {
    fn from(value: BalanceType) -> Self {
        match value {
            BalanceType::Debit => Self::Debit,
            BalanceType::Credit => Self::Credit,
        }
    }
}

impl From<ledgerly_core::ledger::BalanceType> for BalanceType {
    fn from(value: ledgerly_core::ledger::BalanceType) -> Self {
        match value {
            ledgerly_core::ledger::BalanceType::Debit => Self::Debit,
            ledgerly_core::ledger::BalanceType::Credit => Self::Credit,
        }
    }
}

impl From<TransactionStatus> for ledgerly_core::ledger::TransactionStatus {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Posted => Self::Posted,
            TransactionStatus::Void => Self::Void,
        }
    }
}

impl From<ledgerly_core::ledger::TransactionStatus> for TransactionStatus {
    fn from(value: ledgerly_core::ledger::TransactionStatus) -> Self {
        match value {
            ledgerly_core::ledger::TransactionStatus::Pending => Self::Pending,
            ledgerly_core::ledger::TransactionStatus::Posted => Self::Posted,
            ledgerly_core::ledger::TransactionStatus::Void => Self::Void,
        }
    }
}

impl From<ReportStatus> for ledgerly_core::reports::ReportStatus {
    fn from(value: ReportStatus) -> Self {
        match value {
            ReportStatus::Pending => Self::Pending,
            ReportStatus::Generating => Self::Generating,
            ReportStatus::Completed => Self::Completed,
            ReportStatus::Failed => Self::Failed,
            ReportStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<ledgerly_core::reports::ReportStatus> for ReportStatus {
    fn from(value: ledgerly_core::reports::ReportStatus) -> Self {
        match value {
            ledgerly_core::reports::ReportStatus::Pending => Self::Pending,
            ledgerly_core::reports::ReportStatus::Generating => Self::Generating,
            ledgerly_core::reports::ReportStatus::Completed => Self::Completed,
            ledgerly_core::reports::ReportStatus::Failed => Self::Failed,
            ledgerly_core::reports::ReportStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<ReportType> for ledgerly_core::reports::ReportType {
    fn from(value: ReportType) -> Self {
        match value {
            ReportType::TrialBalance => Self::TrialBalance,
            ReportType::BalanceSheet => Self::BalanceSheet,
            ReportType::IncomeStatement => Self::IncomeStatement,
            ReportType::GeneralLedger => Self::GeneralLedger,
        }
    }
}

impl From<ledgerly_core::reports::ReportType> for ReportType {
    fn from(value: ledgerly_core::reports::ReportType) -> Self {
        match value {
            ledgerly_core::reports::ReportType::TrialBalance => Self::TrialBalance,
            ledgerly_core::reports::ReportType::BalanceSheet => Self::BalanceSheet,
            ledgerly_core::reports::ReportType::IncomeStatement => Self::IncomeStatement,
            ledgerly_core::reports::ReportType::GeneralLedger => Self::GeneralLedger,
        }
    }
}
