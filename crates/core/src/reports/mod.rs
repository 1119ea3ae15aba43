//! Financial report aggregation and report lifecycle.
//!
//! The report service is a pure read-side component: it computes trial
//! balances, balance sheets, income statements, and general ledgers from
//! posted-ledger sums the storage layer supplies. The lifecycle submodule
//! is the pending/generating/completed/failed state machine wrapped around
//! report generation requests.

pub mod error;
pub mod lifecycle;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use lifecycle::{ReportStatus, ReportType};
pub use service::ReportService;
pub use types::{
    AccountActivity, BalanceSheetReport, BalanceSheetRow, BalanceSheetSection,
    GeneralLedgerReport, IncomeStatementReport, IncomeStatementRow, IncomeStatementSection,
    LedgerLine, PostedItem, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};
