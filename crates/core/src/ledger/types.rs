//! Ledger domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ledgerly_shared::types::{AccountId, JournalEntryId, JournalItemId, TransactionId};

/// Balance type: the side whose increase is the natural direction.
///
/// In double-entry bookkeeping:
/// - Debit-normal accounts (assets, expenses) grow with debits
/// - Credit-normal accounts (liabilities, equity, revenue) grow with credits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceType {
    /// Debit-normal balance.
    Debit,
    /// Credit-normal balance.
    Credit,
}

impl BalanceType {
    /// Parses a balance type from its storage representation.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// Transaction status in the posting lifecycle.
///
/// The only legal transitions are `Pending -> Posted -> Void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Transaction is editable and has no ledger effect yet.
    Pending,
    /// Transaction has been posted to the ledger (immutable).
    Posted,
    /// Transaction has been voided; its net ledger effect is zero (immutable).
    Void,
}

impl TransactionStatus {
    /// Returns true if the transaction's ledger effect is live.
    #[must_use]
    pub fn is_posted(self) -> bool {
        self == Self::Posted
    }

    /// Returns true if the transaction can be modified or deleted.
    #[must_use]
    pub fn is_editable(self) -> bool {
        self == Self::Pending
    }

    /// Returns true if the transaction is immutable.
    #[must_use]
    pub fn is_immutable(self) -> bool {
        matches!(self, Self::Posted | Self::Void)
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Posted => "posted",
            Self::Void => "void",
        }
    }

    /// Parses a status from its storage representation.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "posted" => Some(Self::Posted),
            "void" => Some(Self::Void),
            _ => None,
        }
    }
}

/// A single debit or credit posting against one account.
///
/// Exactly one of `debit_amount` and `credit_amount` must be nonzero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalItem {
    /// Unique identifier.
    pub id: JournalItemId,
    /// The account this item posts against.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit item).
    pub debit_amount: Decimal,
    /// Credit amount (zero if this is a debit item).
    pub credit_amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl JournalItem {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit_amount - self.credit_amount
    }

    /// Returns true if exactly one side carries a positive amount.
    #[must_use]
    pub fn has_single_side(&self) -> bool {
        (self.debit_amount > Decimal::ZERO) != (self.credit_amount > Decimal::ZERO)
    }
}

/// A named grouping of balanced debit/credit items within a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Entry description.
    pub description: String,
    /// Entry amount (one side of its balanced items).
    pub amount: Decimal,
    /// Ordering within the transaction.
    pub sort_order: i32,
    /// The journal items owned by this entry.
    pub items: Vec<JournalItem>,
}

impl JournalEntry {
    /// Returns the total debits across this entry's items.
    #[must_use]
    pub fn total_debits(&self) -> Decimal {
        self.items.iter().map(|i| i.debit_amount).sum()
    }

    /// Returns the total credits across this entry's items.
    #[must_use]
    pub fn total_credits(&self) -> Decimal {
        self.items.iter().map(|i| i.credit_amount).sum()
    }

    /// Returns true if this entry's debits equal its credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debits() == self.total_credits()
    }
}

/// A financial transaction: the aggregate root over journal entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Human-facing transaction number (unique).
    pub transaction_number: String,
    /// Optional external reference number.
    pub reference_number: Option<String>,
    /// Transaction description.
    pub description: String,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Header amount; must equal the sum of entry amounts.
    pub amount: Decimal,
    /// Current status.
    pub status: TransactionStatus,
    /// When the transaction was posted, if it has been.
    pub posted_at: Option<DateTime<Utc>>,
    /// When the transaction was voided, if it has been.
    pub voided_at: Option<DateTime<Utc>>,
    /// The journal entries owned by this transaction.
    pub entries: Vec<JournalEntry>,
}

impl Transaction {
    /// Returns the total debits across all journal items.
    #[must_use]
    pub fn total_debits(&self) -> Decimal {
        self.entries.iter().map(JournalEntry::total_debits).sum()
    }

    /// Returns the total credits across all journal items.
    #[must_use]
    pub fn total_credits(&self) -> Decimal {
        self.entries.iter().map(JournalEntry::total_credits).sum()
    }

    /// Returns true if total debits equal total credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debits() == self.total_credits()
    }

    /// Returns true if the transaction can be posted.
    #[must_use]
    pub fn can_post(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Returns true if the transaction can be voided.
    #[must_use]
    pub fn can_void(&self) -> bool {
        self.status == TransactionStatus::Posted
    }

    /// Iterates over every journal item in entry order.
    pub fn items(&self) -> impl Iterator<Item = &JournalItem> {
        self.entries.iter().flat_map(|e| e.items.iter())
    }
}

/// Transaction totals for validation and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Whether the transaction is balanced (debits == credits).
    pub is_balanced: bool,
}

impl TransactionTotals {
    /// Creates new transaction totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

/// The slice of account state the ledger engine needs for validation
/// and balance application.
#[derive(Debug, Clone)]
pub struct AccountRef {
    /// The account ID.
    pub id: AccountId,
    /// The account number, for error messages.
    pub account_number: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account accepts direct postings.
    pub allow_posting: bool,
    /// The account's normal balance side.
    pub balance_type: BalanceType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(debit: Decimal, credit: Decimal) -> JournalItem {
        JournalItem {
            id: JournalItemId::new(),
            account_id: AccountId::new(),
            debit_amount: debit,
            credit_amount: credit,
            description: None,
        }
    }

    #[test]
    fn test_status_transitions() {
        assert!(TransactionStatus::Pending.is_editable());
        assert!(!TransactionStatus::Posted.is_editable());
        assert!(!TransactionStatus::Void.is_editable());
        assert!(TransactionStatus::Posted.is_immutable());
        assert!(TransactionStatus::Void.is_immutable());
        assert!(TransactionStatus::Posted.is_posted());
        assert!(!TransactionStatus::Void.is_posted());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Posted,
            TransactionStatus::Void,
        ] {
            assert_eq!(TransactionStatus::from_code(status.as_str()), Some(status));
        }
        assert_eq!(TransactionStatus::from_code("draft"), None);
    }

    #[test]
    fn test_item_single_side() {
        assert!(item(dec!(100), dec!(0)).has_single_side());
        assert!(item(dec!(0), dec!(100)).has_single_side());
        assert!(!item(dec!(100), dec!(100)).has_single_side());
        assert!(!item(dec!(0), dec!(0)).has_single_side());
    }

    #[test]
    fn test_item_signed_amount() {
        assert_eq!(item(dec!(100), dec!(0)).signed_amount(), dec!(100));
        assert_eq!(item(dec!(0), dec!(40)).signed_amount(), dec!(-40));
    }

    #[test]
    fn test_entry_balance() {
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            description: "Office rent".to_string(),
            amount: dec!(500),
            sort_order: 0,
            items: vec![item(dec!(500), dec!(0)), item(dec!(0), dec!(500))],
        };
        assert!(entry.is_balanced());
        assert_eq!(entry.total_debits(), dec!(500));
        assert_eq!(entry.total_credits(), dec!(500));
    }

    #[test]
    fn test_totals_unbalanced() {
        let totals = TransactionTotals::new(dec!(100), dec!(90));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(10));
    }

    #[test]
    fn test_balance_type_round_trip() {
        assert_eq!(BalanceType::from_code("DEBIT"), Some(BalanceType::Debit));
        assert_eq!(BalanceType::from_code("credit"), Some(BalanceType::Credit));
        assert_eq!(BalanceType::from_code("other"), None);
        assert_eq!(BalanceType::Debit.as_str(), "debit");
    }
}
