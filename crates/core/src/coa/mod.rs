//! Chart of accounts rules.
//!
//! This module holds the invariants of the account hierarchy:
//! - Account numbers are unique
//! - A category's account type matches its parent's
//! - An account's balance type matches its account type's normal balance
//! - Accounts with posted activity cannot be deactivated

pub mod error;
pub mod types;
pub mod validation;

pub use error::CoaError;
pub use types::{Account, AccountCategory, AccountClass, AccountType};
pub use validation::{
    ensure_balance_type_matches, ensure_can_deactivate, ensure_category_matches_type,
    ensure_parent_type_matches, is_account_number_unique, would_create_cycle,
};
