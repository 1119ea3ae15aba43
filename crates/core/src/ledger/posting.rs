//! The posting/voiding state machine and posting plans.
//!
//! A `PostingPlan` is the pure output of the ledger engine: one signed
//! balance delta per distinct account, in ascending account-id order. The
//! storage layer applies the plan atomically under exclusive row locks;
//! the fixed ordering prevents deadlocks when concurrent postings touch
//! overlapping account sets.

use std::collections::{BTreeMap, HashMap};

use ledgerly_shared::types::{AccountId, TransactionId};

use super::balance::{AccountDelta, balance_delta};
use super::error::LedgerError;
use super::types::{AccountRef, Transaction, TransactionStatus};
use super::validation::validate_transaction;

/// Ensures a transaction may be posted.
///
/// # Errors
///
/// Returns `LedgerError::CannotPost` unless the status is `Pending`.
pub fn ensure_can_post(status: TransactionStatus) -> Result<(), LedgerError> {
    if status == TransactionStatus::Pending {
        Ok(())
    } else {
        Err(LedgerError::CannotPost(status))
    }
}

/// Ensures a transaction may be voided.
///
/// # Errors
///
/// Returns `LedgerError::CannotVoid` unless the status is `Posted`.
pub fn ensure_can_void(status: TransactionStatus) -> Result<(), LedgerError> {
    if status == TransactionStatus::Posted {
        Ok(())
    } else {
        Err(LedgerError::CannotVoid(status))
    }
}

/// The balance changes a post or void operation applies.
#[derive(Debug, Clone)]
pub struct PostingPlan {
    /// The transaction being posted or voided.
    pub transaction_id: TransactionId,
    /// One aggregate delta per distinct account, ascending by account id.
    pub deltas: Vec<AccountDelta>,
}

impl PostingPlan {
    /// Builds the plan for posting a pending transaction.
    ///
    /// Runs the full structural validation first and aggregates one delta
    /// per distinct account so each account row is touched exactly once.
    ///
    /// # Errors
    ///
    /// - `LedgerError::CannotPost` if the transaction is not pending
    /// - `LedgerError::ValidationFailed` with every violation found
    pub fn for_post(
        transaction: &Transaction,
        accounts: &HashMap<AccountId, AccountRef>,
    ) -> Result<Self, LedgerError> {
        ensure_can_post(transaction.status)?;

        let violations = validate_transaction(transaction, accounts);
        if !violations.is_empty() {
            return Err(LedgerError::ValidationFailed { violations });
        }

        Ok(Self {
            transaction_id: transaction.id,
            deltas: aggregate_deltas(transaction, accounts, false),
        })
    }

    /// Builds the plan for voiding a posted transaction.
    ///
    /// Applies the exact inverse of every balance adjustment made at post
    /// time. Structural validation is not repeated: a posted transaction
    /// was balanced when it entered the ledger, and voiding must succeed
    /// even if a referenced account has since been deactivated.
    ///
    /// # Errors
    ///
    /// - `LedgerError::CannotVoid` if the transaction is not posted
    /// - `LedgerError::AccountNotFound` if a referenced account is missing
    pub fn for_void(
        transaction: &Transaction,
        accounts: &HashMap<AccountId, AccountRef>,
    ) -> Result<Self, LedgerError> {
        ensure_can_void(transaction.status)?;

        for item in transaction.items() {
            if !accounts.contains_key(&item.account_id) {
                return Err(LedgerError::AccountNotFound(item.account_id.into_inner()));
            }
        }

        Ok(Self {
            transaction_id: transaction.id,
            deltas: aggregate_deltas(transaction, accounts, true),
        })
    }

    /// Returns the distinct account ids touched, in lock order.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        self.deltas.iter().map(|d| d.account_id).collect()
    }
}

/// Sums item deltas per account; `invert` swaps the debit/credit effect.
fn aggregate_deltas(
    transaction: &Transaction,
    accounts: &HashMap<AccountId, AccountRef>,
    invert: bool,
) -> Vec<AccountDelta> {
    // BTreeMap keyed by the raw UUID gives the deterministic ascending
    // order the lock protocol requires.
    let mut by_account: BTreeMap<uuid::Uuid, AccountDelta> = BTreeMap::new();

    for item in transaction.items() {
        let Some(account) = accounts.get(&item.account_id) else {
            continue;
        };

        let delta = if invert {
            balance_delta(account.balance_type, item.credit_amount, item.debit_amount)
        } else {
            balance_delta(account.balance_type, item.debit_amount, item.credit_amount)
        };

        by_account
            .entry(item.account_id.into_inner())
            .and_modify(|d| d.delta += delta)
            .or_insert(AccountDelta {
                account_id: item.account_id,
                delta,
            });
    }

    by_account.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use ledgerly_shared::types::{JournalEntryId, JournalItemId};

    use crate::ledger::types::{BalanceType, JournalEntry, JournalItem};

    fn account(id: AccountId, number: &str, balance_type: BalanceType) -> AccountRef {
        AccountRef {
            id,
            account_number: number.to_string(),
            is_active: true,
            allow_posting: true,
            balance_type,
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

    fn fixture(status: TransactionStatus) -> (Transaction, HashMap<AccountId, AccountRef>) {
        let cash = AccountId::new();
        let equity = AccountId::new();

        let accounts = HashMap::from([
            (cash, account(cash, "1000", BalanceType::Debit)),
            (equity, account(equity, "3000", BalanceType::Credit)),
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

        let tx = Transaction {
            id: TransactionId::new(),
            transaction_number: "TXN202608010001".to_string(),
            reference_number: None,
            description: "Seed capital".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            amount: dec!(1000),
            status,
            posted_at: None,
            voided_at: None,
            entries: vec![entry],
        };

        (tx, accounts)
    }

    #[test]
    fn test_ensure_can_post() {
        assert!(ensure_can_post(TransactionStatus::Pending).is_ok());
        assert!(matches!(
            ensure_can_post(TransactionStatus::Posted),
            Err(LedgerError::CannotPost(TransactionStatus::Posted))
        ));
        assert!(matches!(
            ensure_can_post(TransactionStatus::Void),
            Err(LedgerError::CannotPost(TransactionStatus::Void))
        ));
    }

    #[test]
    fn test_ensure_can_void() {
        assert!(ensure_can_void(TransactionStatus::Posted).is_ok());
        assert!(matches!(
            ensure_can_void(TransactionStatus::Pending),
            Err(LedgerError::CannotVoid(TransactionStatus::Pending))
        ));
        assert!(matches!(
            ensure_can_void(TransactionStatus::Void),
            Err(LedgerError::CannotVoid(TransactionStatus::Void))
        ));
    }

    #[test]
    fn test_post_plan_increases_both_normal_sides() {
        let (tx, accounts) = fixture(TransactionStatus::Pending);
        let plan = PostingPlan::for_post(&tx, &accounts).expect("plan");

        assert_eq!(plan.deltas.len(), 2);
        // Cash debited (debit-normal) and equity credited (credit-normal)
        // both increase.
        for delta in &plan.deltas {
            assert_eq!(delta.delta, dec!(1000));
        }
    }

    #[test]
    fn test_void_plan_is_exact_inverse() {
        let (mut tx, accounts) = fixture(TransactionStatus::Pending);
        let post = PostingPlan::for_post(&tx, &accounts).expect("post plan");

        tx.status = TransactionStatus::Posted;
        let void = PostingPlan::for_void(&tx, &accounts).expect("void plan");

        assert_eq!(post.deltas.len(), void.deltas.len());
        for (p, v) in post.deltas.iter().zip(void.deltas.iter()) {
            assert_eq!(p.account_id, v.account_id);
            assert_eq!(p.delta, -v.delta);
        }
    }

    #[test]
    fn test_deltas_sorted_ascending_by_account_id() {
        let (tx, accounts) = fixture(TransactionStatus::Pending);
        let plan = PostingPlan::for_post(&tx, &accounts).expect("plan");

        let ids: Vec<uuid::Uuid> = plan.deltas.iter().map(|d| d.account_id.into_inner()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_repeated_account_aggregated_once() {
        let cash = AccountId::new();
        let expense = AccountId::new();
        let accounts = HashMap::from([
            (cash, account(cash, "1000", BalanceType::Debit)),
            (expense, account(expense, "5000", BalanceType::Debit)),
        ]);

        // Two entries both touching cash.
        let entries = vec![
            JournalEntry {
                id: JournalEntryId::new(),
                description: "Supplies".to_string(),
                amount: dec!(100),
                sort_order: 0,
                items: vec![
                    item(expense, dec!(100), dec!(0)),
                    item(cash, dec!(0), dec!(100)),
                ],
            },
            JournalEntry {
                id: JournalEntryId::new(),
                description: "Postage".to_string(),
                amount: dec!(50),
                sort_order: 1,
                items: vec![
                    item(expense, dec!(50), dec!(0)),
                    item(cash, dec!(0), dec!(50)),
                ],
            },
        ];

        let tx = Transaction {
            id: TransactionId::new(),
            transaction_number: "TXN202608010002".to_string(),
            reference_number: None,
            description: "Expenses".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            amount: dec!(150),
            status: TransactionStatus::Pending,
            posted_at: None,
            voided_at: None,
            entries,
        };

        let plan = PostingPlan::for_post(&tx, &accounts).expect("plan");
        assert_eq!(plan.deltas.len(), 2);

        let cash_delta = plan
            .deltas
            .iter()
            .find(|d| d.account_id == cash)
            .expect("cash delta");
        assert_eq!(cash_delta.delta, dec!(-150));

        let expense_delta = plan
            .deltas
            .iter()
            .find(|d| d.account_id == expense)
            .expect("expense delta");
        assert_eq!(expense_delta.delta, dec!(150));
    }

    #[test]
    fn test_post_plan_rejects_unbalanced() {
        let (mut tx, accounts) = fixture(TransactionStatus::Pending);
        tx.entries[0].items[1].credit_amount = dec!(90);

        let result = PostingPlan::for_post(&tx, &accounts);
        assert!(matches!(result, Err(LedgerError::ValidationFailed { .. })));
    }

    #[test]
    fn test_post_plan_rejects_posted() {
        let (tx, accounts) = fixture(TransactionStatus::Posted);
        assert!(matches!(
            PostingPlan::for_post(&tx, &accounts),
            Err(LedgerError::CannotPost(TransactionStatus::Posted))
        ));
    }

    #[test]
    fn test_void_plan_missing_account_fails() {
        let (mut tx, mut accounts) = fixture(TransactionStatus::Pending);
        tx.status = TransactionStatus::Posted;
        let cash = tx.entries[0].items[0].account_id;
        accounts.remove(&cash);

        assert!(matches!(
            PostingPlan::for_void(&tx, &accounts),
            Err(LedgerError::AccountNotFound(_))
        ));
    }
}
