//! Chart of accounts domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ledgerly_shared::types::{AccountCategoryId, AccountId, AccountTypeId};

use crate::ledger::BalanceType;

/// The five fundamental account classes.
///
/// Account types are data-driven rows, but report partitioning needs to
/// know which class a type's code denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountClass {
    /// Assets (debit-normal).
    Asset,
    /// Liabilities (credit-normal).
    Liability,
    /// Equity (credit-normal).
    Equity,
    /// Revenue (credit-normal).
    Revenue,
    /// Expenses (debit-normal).
    Expense,
}

impl AccountClass {
    /// Parses a class from an account type code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns the normal balance side for this class.
    #[must_use]
    pub const fn normal_balance(self) -> BalanceType {
        match self {
            Self::Asset | Self::Expense => BalanceType::Debit,
            Self::Liability | Self::Equity | Self::Revenue => BalanceType::Credit,
        }
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

/// An account type: the immutable classification accounts hang off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountType {
    /// Unique identifier.
    pub id: AccountTypeId,
    /// Type code (unique, e.g. "ASSET").
    pub code: String,
    /// Display name.
    pub name: String,
    /// The side whose increase is the natural direction for this type.
    pub normal_balance: BalanceType,
    /// Whether the type is active.
    pub is_active: bool,
}

/// A category grouping related accounts within one account type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCategory {
    /// Unique identifier.
    pub id: AccountCategoryId,
    /// Category code (unique per account type).
    pub code: String,
    /// Display name.
    pub name: String,
    /// The account type this category belongs to.
    pub account_type_id: AccountTypeId,
    /// Optional parent category forming a tree.
    pub parent_category_id: Option<AccountCategoryId>,
    /// Ordering among siblings.
    pub sort_order: i32,
    /// Whether the category is active.
    pub is_active: bool,
}

/// An individual account in the chart of accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Account number (unique).
    pub account_number: String,
    /// Display name.
    pub name: String,
    /// The account type.
    pub account_type_id: AccountTypeId,
    /// The category.
    pub category_id: AccountCategoryId,
    /// Normal balance side; fixed to the account type's normal balance.
    pub balance_type: BalanceType,
    /// Balance the account opened with.
    pub opening_balance: Decimal,
    /// Derived balance; mutated only by the posting/voiding protocol.
    pub current_balance: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether this is a bank account.
    pub is_bank_account: bool,
    /// Whether this is a cash account.
    pub is_cash_account: bool,
    /// Whether this account is reconcilable.
    pub is_reconcilable: bool,
    /// Whether direct posting is allowed.
    pub allow_posting: bool,
}

impl Account {
    /// Returns true if transactions can be posted to this account.
    #[must_use]
    pub fn can_post_transactions(&self) -> bool {
        self.is_active && self.allow_posting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_from_code() {
        assert_eq!(AccountClass::from_code("ASSET"), Some(AccountClass::Asset));
        assert_eq!(AccountClass::from_code("revenue"), Some(AccountClass::Revenue));
        assert_eq!(AccountClass::from_code("Liability"), Some(AccountClass::Liability));
        assert_eq!(AccountClass::from_code("unknown"), None);
    }

    #[test]
    fn test_class_normal_balance() {
        assert_eq!(AccountClass::Asset.normal_balance(), BalanceType::Debit);
        assert_eq!(AccountClass::Expense.normal_balance(), BalanceType::Debit);
        assert_eq!(AccountClass::Liability.normal_balance(), BalanceType::Credit);
        assert_eq!(AccountClass::Equity.normal_balance(), BalanceType::Credit);
        assert_eq!(AccountClass::Revenue.normal_balance(), BalanceType::Credit);
    }

    #[test]
    fn test_class_round_trip() {
        for class in [
            AccountClass::Asset,
            AccountClass::Liability,
            AccountClass::Equity,
            AccountClass::Revenue,
            AccountClass::Expense,
        ] {
            assert_eq!(AccountClass::from_code(class.as_str()), Some(class));
        }
    }
}
