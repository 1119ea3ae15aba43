//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Transaction aggregates (journal entries and journal items)
//! - Structural validation that reports every violation at once
//! - Balance delta calculations per account balance type
//! - The posting/voiding state machine and posting plans
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod posting;
pub mod types;
pub mod validation;

#[cfg(test)]
mod posting_props;

pub use balance::{AccountDelta, RunningBalance, balance_delta};
pub use error::LedgerError;
pub use posting::{PostingPlan, ensure_can_post, ensure_can_void};
pub use types::{
    AccountRef, BalanceType, JournalEntry, JournalItem, Transaction, TransactionStatus,
    TransactionTotals,
};
pub use validation::{Violation, validate_transaction};
