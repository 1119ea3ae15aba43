//! Property tests for the posting engine.
//!
//! These exercise the whole-transaction invariants: double-entry balance,
//! void-restores-balance, and serialized application of concurrent plans.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use ledgerly_shared::types::{AccountId, JournalEntryId, JournalItemId, TransactionId};

use super::balance::AccountDelta;
use super::posting::PostingPlan;
use super::types::{
    AccountRef, BalanceType, JournalEntry, JournalItem, Transaction, TransactionStatus,
};

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

/// Builds a balanced transaction moving `amount` from a credit-side account
/// to a debit-side account.
fn balanced_transaction(
    debit_account: AccountId,
    credit_account: AccountId,
    amount: Decimal,
) -> Transaction {
    let entry = JournalEntry {
        id: JournalEntryId::new(),
        description: "generated".to_string(),
        amount,
        sort_order: 0,
        items: vec![
            item(debit_account, amount, Decimal::ZERO),
            item(credit_account, Decimal::ZERO, amount),
        ],
    };

    Transaction {
        id: TransactionId::new(),
        transaction_number: format!("TXN-{}", TransactionId::new()),
        reference_number: None,
        description: "generated".to_string(),
        transaction_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        amount,
        status: TransactionStatus::Pending,
        posted_at: None,
        voided_at: None,
        entries: vec![entry],
    }
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting then voiding any balanced transaction leaves every account
    /// balance exactly where it started.
    #[test]
    fn prop_void_restores_balances(amounts in prop::collection::vec(amount_strategy(), 1..10)) {
        let cash = AccountId::new();
        let equity = AccountId::new();
        let accounts = HashMap::from([
            (cash, account(cash, "1000", BalanceType::Debit)),
            (equity, account(equity, "3000", BalanceType::Credit)),
        ]);

        let mut balances: HashMap<AccountId, Decimal> =
            HashMap::from([(cash, Decimal::ZERO), (equity, Decimal::ZERO)]);

        let mut transactions = Vec::new();
        for amount in amounts {
            let mut tx = balanced_transaction(cash, equity, amount);
            let plan = PostingPlan::for_post(&tx, &accounts).expect("post plan");
            for delta in &plan.deltas {
                *balances.get_mut(&delta.account_id).unwrap() += delta.delta;
            }
            tx.status = TransactionStatus::Posted;
            transactions.push(tx);
        }

        // Void them all; balances must return to zero.
        for tx in &transactions {
            let plan = PostingPlan::for_void(tx, &accounts).expect("void plan");
            for delta in &plan.deltas {
                *balances.get_mut(&delta.account_id).unwrap() += delta.delta;
            }
        }

        prop_assert_eq!(balances[&cash], Decimal::ZERO);
        prop_assert_eq!(balances[&equity], Decimal::ZERO);
    }

    /// For any balanced transaction the plan's deltas, mapped back to
    /// debit-signed arithmetic, net to zero: the double-entry law survives
    /// aggregation.
    #[test]
    fn prop_plan_conserves_double_entry(amount in amount_strategy()) {
        let cash = AccountId::new();
        let equity = AccountId::new();
        let accounts = HashMap::from([
            (cash, account(cash, "1000", BalanceType::Debit)),
            (equity, account(equity, "3000", BalanceType::Credit)),
        ]);

        let tx = balanced_transaction(cash, equity, amount);
        let plan = PostingPlan::for_post(&tx, &accounts).expect("plan");

        let debit_signed: Decimal = plan
            .deltas
            .iter()
            .map(|d| match accounts[&d.account_id].balance_type {
                BalanceType::Debit => d.delta,
                BalanceType::Credit => -d.delta,
            })
            .sum();

        prop_assert_eq!(debit_signed, Decimal::ZERO);
    }
}

/// Concurrent posting stress: N threads apply plans against one shared
/// account. The final balance must equal opening + the sum of all signed
/// deltas regardless of interleaving, because each application holds the
/// account lock for its whole read-modify-write.
#[test]
fn test_concurrent_posts_serialize_on_shared_account() {
    const THREADS: usize = 16;
    const POSTS_PER_THREAD: usize = 25;

    let cash = AccountId::new();
    let equity = AccountId::new();
    let accounts = Arc::new(HashMap::from([
        (cash, account(cash, "1000", BalanceType::Debit)),
        (equity, account(equity, "3000", BalanceType::Credit)),
    ]));

    let balances: Arc<Mutex<HashMap<AccountId, Decimal>>> = Arc::new(Mutex::new(HashMap::from([
        (cash, Decimal::ZERO),
        (equity, Decimal::ZERO),
    ])));

    // One lock for the whole plan mirrors the all-or-nothing critical
    // section of the storage layer.
    fn apply(balances: &Mutex<HashMap<AccountId, Decimal>>, deltas: &[AccountDelta]) {
        let mut guard = balances.lock().unwrap();
        for delta in deltas {
            *guard.get_mut(&delta.account_id).unwrap() += delta.delta;
        }
    }

    let handles: Vec<_> = (0..THREADS)
        .map(|thread| {
            let accounts = Arc::clone(&accounts);
            let balances = Arc::clone(&balances);
            std::thread::spawn(move || {
                for post in 0..POSTS_PER_THREAD {
                    let amount = Decimal::new((thread * POSTS_PER_THREAD + post + 1) as i64, 2);
                    let tx = balanced_transaction(cash, equity, amount);
                    let plan = PostingPlan::for_post(&tx, &accounts).expect("plan");
                    apply(&balances, &plan.deltas);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread");
    }

    // Sum of 1..=N cents where N = THREADS * POSTS_PER_THREAD.
    let n = (THREADS * POSTS_PER_THREAD) as i64;
    let expected = Decimal::new(n * (n + 1) / 2, 2);

    let final_balances = balances.lock().unwrap();
    assert_eq!(final_balances[&cash], expected);
    assert_eq!(final_balances[&equity], expected);
}

/// Disjoint account sets interleave freely: both transactions land in full.
#[test]
fn test_concurrent_posts_disjoint_accounts() {
    let cash_a = AccountId::new();
    let equity_a = AccountId::new();
    let cash_b = AccountId::new();
    let equity_b = AccountId::new();

    let accounts = Arc::new(HashMap::from([
        (cash_a, account(cash_a, "1000", BalanceType::Debit)),
        (equity_a, account(equity_a, "3000", BalanceType::Credit)),
        (cash_b, account(cash_b, "1010", BalanceType::Debit)),
        (equity_b, account(equity_b, "3010", BalanceType::Credit)),
    ]));

    let balances: Arc<Mutex<HashMap<AccountId, Decimal>>> = Arc::new(Mutex::new(
        [cash_a, equity_a, cash_b, equity_b]
            .into_iter()
            .map(|id| (id, Decimal::ZERO))
            .collect(),
    ));

    let spawn_post = |debit: AccountId, credit: AccountId, amount: Decimal| {
        let accounts = Arc::clone(&accounts);
        let balances = Arc::clone(&balances);
        std::thread::spawn(move || {
            let tx = balanced_transaction(debit, credit, amount);
            let plan = PostingPlan::for_post(&tx, &accounts).expect("plan");
            let mut guard = balances.lock().unwrap();
            for delta in &plan.deltas {
                *guard.get_mut(&delta.account_id).unwrap() += delta.delta;
            }
        })
    };

    let h1 = spawn_post(cash_a, equity_a, Decimal::new(10_000, 2));
    let h2 = spawn_post(cash_b, equity_b, Decimal::new(25_000, 2));
    h1.join().expect("thread a");
    h2.join().expect("thread b");

    let final_balances = balances.lock().unwrap();
    assert_eq!(final_balances[&cash_a], Decimal::new(10_000, 2));
    assert_eq!(final_balances[&equity_a], Decimal::new(10_000, 2));
    assert_eq!(final_balances[&cash_b], Decimal::new(25_000, 2));
    assert_eq!(final_balances[&equity_b], Decimal::new(25_000, 2));
}
