//! Structural validation for transactions about to be posted.
//!
//! Unlike fail-fast validators, this module collects EVERY violation in a
//! single pass. A financial operator fixing a rejected batch needs the
//! complete error set, not just the first problem found.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use ledgerly_shared::types::AccountId;

use super::types::{AccountRef, Transaction};

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Transaction has no journal entries.
    #[error("Transaction must have at least one journal entry")]
    NoEntries,

    /// A journal entry has no items.
    #[error("Journal entry '{entry}' must have at least one item")]
    EntryEmpty {
        /// Entry description.
        entry: String,
    },

    /// A journal entry's debits do not equal its credits.
    #[error("Journal entry '{entry}' is not balanced. Debits: {debits}, Credits: {credits}")]
    EntryUnbalanced {
        /// Entry description.
        entry: String,
        /// Entry debit total.
        debits: Decimal,
        /// Entry credit total.
        credits: Decimal,
    },

    /// Transaction-level debits do not equal credits.
    #[error("Transaction is not balanced. Debits: {debits}, Credits: {credits}")]
    TransactionUnbalanced {
        /// Transaction debit total.
        debits: Decimal,
        /// Transaction credit total.
        credits: Decimal,
    },

    /// Header amount does not match the sum of entry amounts.
    #[error("Transaction amount {header} does not match entry total {entries}")]
    AmountMismatch {
        /// Header amount.
        header: Decimal,
        /// Sum of entry amounts.
        entries: Decimal,
    },

    /// A journal item has neither a debit nor a credit amount.
    #[error("Journal item for account {account} must have either a debit or credit amount")]
    ItemNoAmount {
        /// Account number.
        account: String,
    },

    /// A journal item has both a debit and a credit amount.
    #[error("Journal item for account {account} cannot have both debit and credit amounts")]
    ItemBothSides {
        /// Account number.
        account: String,
    },

    /// A journal item carries a negative amount.
    #[error("Journal item for account {account} has a negative amount")]
    ItemNegativeAmount {
        /// Account number.
        account: String,
    },

    /// A referenced account does not exist.
    #[error("Account {account_id} does not exist")]
    AccountMissing {
        /// The missing account ID.
        account_id: AccountId,
    },

    /// A referenced account is inactive.
    #[error("Account {account} is not active")]
    AccountInactive {
        /// Account number.
        account: String,
    },

    /// A referenced account does not allow posting.
    #[error("Account {account} does not allow posting")]
    AccountPostingDisabled {
        /// Account number.
        account: String,
    },
}

/// Validates a transaction's structure against the accounts it references.
///
/// Returns every violation found. An empty vector means the transaction is
/// structurally valid and balanced at both the entry and transaction level.
#[must_use]
pub fn validate_transaction(
    transaction: &Transaction,
    accounts: &HashMap<AccountId, AccountRef>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if transaction.entries.is_empty() {
        violations.push(Violation::NoEntries);
    }

    let mut entry_total = Decimal::ZERO;

    for entry in &transaction.entries {
        entry_total += entry.amount;

        if entry.items.is_empty() {
            violations.push(Violation::EntryEmpty {
                entry: entry.description.clone(),
            });
            continue;
        }

        if !entry.is_balanced() {
            violations.push(Violation::EntryUnbalanced {
                entry: entry.description.clone(),
                debits: entry.total_debits(),
                credits: entry.total_credits(),
            });
        }

        for item in &entry.items {
            let account_label = accounts
                .get(&item.account_id)
                .map_or_else(|| item.account_id.to_string(), |a| a.account_number.clone());

            if item.debit_amount < Decimal::ZERO || item.credit_amount < Decimal::ZERO {
                violations.push(Violation::ItemNegativeAmount {
                    account: account_label.clone(),
                });
            }

            if item.debit_amount == Decimal::ZERO && item.credit_amount == Decimal::ZERO {
                violations.push(Violation::ItemNoAmount {
                    account: account_label.clone(),
                });
            } else if item.debit_amount > Decimal::ZERO && item.credit_amount > Decimal::ZERO {
                violations.push(Violation::ItemBothSides {
                    account: account_label.clone(),
                });
            }

            match accounts.get(&item.account_id) {
                None => violations.push(Violation::AccountMissing {
                    account_id: item.account_id,
                }),
                Some(account) => {
                    if !account.is_active {
                        violations.push(Violation::AccountInactive {
                            account: account.account_number.clone(),
                        });
                    }
                    if !account.allow_posting {
                        violations.push(Violation::AccountPostingDisabled {
                            account: account.account_number.clone(),
                        });
                    }
                }
            }
        }
    }

    if !transaction.is_balanced() {
        violations.push(Violation::TransactionUnbalanced {
            debits: transaction.total_debits(),
            credits: transaction.total_credits(),
        });
    }

    if !transaction.entries.is_empty() && transaction.amount != entry_total {
        violations.push(Violation::AmountMismatch {
            header: transaction.amount,
            entries: entry_total,
        });
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use ledgerly_shared::types::{JournalEntryId, JournalItemId, TransactionId};

    use crate::ledger::types::{BalanceType, JournalEntry, JournalItem, TransactionStatus};

    fn account_ref(id: AccountId, number: &str) -> AccountRef {
        AccountRef {
            id,
            account_number: number.to_string(),
            is_active: true,
            allow_posting: true,
            balance_type: BalanceType::Debit,
        }
    }

    fn item(account_id: AccountId, debit: Decimal, credit: Decimal) -> JournalItem {
        JournalItem {
            id: JournalItemId::new(),
            account_id,
            debit_amount: debit,
            credit_amount: credit,
            description: None,
        }
    }

    fn transaction(entries: Vec<JournalEntry>, amount: Decimal) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            transaction_number: "TXN202608010001".to_string(),
            reference_number: None,
            description: "Test transaction".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            amount,
            status: TransactionStatus::Pending,
            posted_at: None,
            voided_at: None,
            entries,
        }
    }

    fn balanced_fixture() -> (Transaction, HashMap<AccountId, AccountRef>) {
        let cash = AccountId::new();
        let equity = AccountId::new();

        let accounts = HashMap::from([
            (cash, account_ref(cash, "1000")),
            (equity, account_ref(equity, "3000")),
        ]);

        let entry = JournalEntry {
            id: JournalEntryId::new(),
            description: "Owner contribution".to_string(),
            amount: dec!(1000),
            sort_order: 0,
            items: vec![
                item(cash, dec!(1000), dec!(0)),
                item(equity, dec!(0), dec!(1000)),
            ],
        };

        (transaction(vec![entry], dec!(1000)), accounts)
    }

    #[test]
    fn test_valid_transaction_has_no_violations() {
        let (tx, accounts) = balanced_fixture();
        assert!(validate_transaction(&tx, &accounts).is_empty());
    }

    #[test]
    fn test_unbalanced_entry_reported_at_both_levels() {
        let (mut tx, accounts) = balanced_fixture();
        tx.entries[0].items[1].credit_amount = dec!(90);

        let violations = validate_transaction(&tx, &accounts);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::EntryUnbalanced { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::TransactionUnbalanced { debits, credits }
                if *debits == dec!(1000) && *credits == dec!(90))));
    }

    #[test]
    fn test_all_violations_collected_not_just_first() {
        let (mut tx, mut accounts) = balanced_fixture();
        // Break several rules at once.
        let cash = tx.entries[0].items[0].account_id;
        accounts.get_mut(&cash).unwrap().is_active = false;
        tx.entries[0].items[1].credit_amount = dec!(0); // no amount
        tx.amount = dec!(999); // header mismatch

        let violations = validate_transaction(&tx, &accounts);
        assert!(violations.len() >= 3, "expected several violations, got {violations:?}");
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::AccountInactive { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::ItemNoAmount { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::AmountMismatch { .. })));
    }

    #[test]
    fn test_item_both_sides_rejected() {
        let (mut tx, accounts) = balanced_fixture();
        tx.entries[0].items[0].credit_amount = dec!(10);

        let violations = validate_transaction(&tx, &accounts);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::ItemBothSides { .. })));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let (mut tx, accounts) = balanced_fixture();
        tx.entries[0].items[0].debit_amount = dec!(-50);

        let violations = validate_transaction(&tx, &accounts);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::ItemNegativeAmount { .. })));
    }

    #[test]
    fn test_missing_account_reported() {
        let (tx, mut accounts) = balanced_fixture();
        let cash = tx.entries[0].items[0].account_id;
        accounts.remove(&cash);

        let violations = validate_transaction(&tx, &accounts);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::AccountMissing { account_id } if *account_id == cash)));
    }

    #[test]
    fn test_posting_disabled_account_reported() {
        let (tx, mut accounts) = balanced_fixture();
        let equity = tx.entries[0].items[1].account_id;
        accounts.get_mut(&equity).unwrap().allow_posting = false;

        let violations = validate_transaction(&tx, &accounts);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::AccountPostingDisabled { account } if account == "3000")));
    }

    #[test]
    fn test_no_entries_rejected() {
        let tx = transaction(vec![], dec!(0));
        let violations = validate_transaction(&tx, &HashMap::new());
        assert!(violations.contains(&Violation::NoEntries));
    }

    #[test]
    fn test_empty_entry_rejected() {
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            description: "Empty".to_string(),
            amount: dec!(0),
            sort_order: 0,
            items: vec![],
        };
        let tx = transaction(vec![entry], dec!(0));
        let violations = validate_transaction(&tx, &HashMap::new());
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::EntryEmpty { entry } if entry == "Empty")));
    }
}
