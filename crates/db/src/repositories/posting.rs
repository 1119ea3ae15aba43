//! The post/void critical sections.
//!
//! `Account.current_balance` is the principal shared mutable resource in
//! the system. It is mutated ONLY here, inside a single database
//! transaction that:
//!
//! 1. loads the transaction and checks the state machine,
//! 2. acquires `SELECT ... FOR UPDATE` row locks on every distinct
//!    referenced account in ascending account-id order (two concurrent
//!    postings touching overlapping account sets always lock in the same
//!    order, so they cannot deadlock),
//! 3. validates the transaction structurally (post only), collecting
//!    every violation,
//! 4. applies one aggregate balance delta per account and flips the
//!    transaction status with its timestamp.
//!
//! Either everything commits or nothing does; no partial balance update
//! is ever observable. Audit and cache side effects are the caller's
//! responsibility and happen after commit.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use ledgerly_core::ledger::{
    AccountRef, LedgerError, PostingPlan, ensure_can_post, ensure_can_void,
};
use ledgerly_shared::types::AccountId;

use super::transaction::{load_entries, map_db_err, to_domain};
use crate::entities::{accounts, sea_orm_active_enums::TransactionStatus, transactions};

/// Repository owning the post and void operations.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and posts a PENDING transaction.
    ///
    /// On success the transaction is POSTED with `posted_at`/`posted_by`
    /// set and every referenced account's `current_balance` adjusted.
    ///
    /// # Errors
    ///
    /// - `LedgerError::TransactionNotFound` if the id is unknown
    /// - `LedgerError::CannotPost` unless the status is PENDING
    /// - `LedgerError::ValidationFailed` with the complete violation list
    /// - `LedgerError::ConcurrencyConflict` on lock conflicts (retryable)
    pub async fn post_transaction(
        &self,
        transaction_id: Uuid,
        actor: Uuid,
    ) -> Result<transactions::Model, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let header = transactions::Entity::find_by_id(transaction_id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        ensure_can_post(header.status.into())?;

        let entries = load_entries(&txn, transaction_id).await?;
        let domain = to_domain(&header, &entries);

        let locked = lock_accounts(&txn, domain.items().map(|i| i.account_id)).await?;
        let refs = account_refs(&locked);

        let plan = PostingPlan::for_post(&domain, &refs)?;

        apply_deltas(&txn, &locked, &plan).await?;

        let now = chrono::Utc::now();
        let mut active: transactions::ActiveModel = header.into();
        active.status = Set(TransactionStatus::Posted);
        active.posted_at = Set(Some(now.into()));
        active.posted_by = Set(Some(actor));
        active.updated_at = Set(now.into());
        let updated = active.update(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(updated)
    }

    /// Voids a POSTED transaction by applying the exact inverse of every
    /// balance adjustment made at post time.
    ///
    /// The transaction and its entries/items are preserved for the audit
    /// trail; only the status and balances change.
    ///
    /// # Errors
    ///
    /// - `LedgerError::TransactionNotFound` if the id is unknown
    /// - `LedgerError::CannotVoid` unless the status is POSTED
    /// - `LedgerError::ConcurrencyConflict` on lock conflicts (retryable)
    pub async fn void_transaction(
        &self,
        transaction_id: Uuid,
        actor: Uuid,
    ) -> Result<transactions::Model, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let header = transactions::Entity::find_by_id(transaction_id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        ensure_can_void(header.status.into())?;

        let entries = load_entries(&txn, transaction_id).await?;
        let domain = to_domain(&header, &entries);

        let locked = lock_accounts(&txn, domain.items().map(|i| i.account_id)).await?;
        let refs = account_refs(&locked);

        let plan = PostingPlan::for_void(&domain, &refs)?;

        apply_deltas(&txn, &locked, &plan).await?;

        let now = chrono::Utc::now();
        let mut active: transactions::ActiveModel = header.into();
        active.status = Set(TransactionStatus::Void);
        active.voided_at = Set(Some(now.into()));
        active.voided_by = Set(Some(actor));
        active.updated_at = Set(now.into());
        let updated = active.update(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(updated)
    }
}

/// Acquires exclusive row locks on the distinct referenced accounts, in
/// ascending account-id order.
async fn lock_accounts(
    txn: &DatabaseTransaction,
    account_ids: impl Iterator<Item = AccountId>,
) -> Result<HashMap<AccountId, accounts::Model>, LedgerError> {
    let mut distinct: Vec<Uuid> = account_ids.map(AccountId::into_inner).collect();
    distinct.sort_unstable();
    distinct.dedup();

    let mut locked = HashMap::with_capacity(distinct.len());
    for id in distinct {
        let account = accounts::Entity::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::AccountNotFound(id))?;
        locked.insert(AccountId::from_uuid(id), account);
    }

    Ok(locked)
}

/// Projects locked account rows onto the slice the ledger engine needs.
fn account_refs(locked: &HashMap<AccountId, accounts::Model>) -> HashMap<AccountId, AccountRef> {
    locked
        .iter()
        .map(|(id, model)| {
            (
                *id,
                AccountRef {
                    id: *id,
                    account_number: model.account_number.clone(),
                    is_active: model.is_active,
                    allow_posting: model.allow_posting,
                    balance_type: model.balance_type.into(),
                },
            )
        })
        .collect()
}

/// Applies the plan's aggregate deltas to the locked account rows.
async fn apply_deltas(
    txn: &DatabaseTransaction,
    locked: &HashMap<AccountId, accounts::Model>,
    plan: &PostingPlan,
) -> Result<(), LedgerError> {
    let now = chrono::Utc::now();

    for delta in &plan.deltas {
        let account = locked
            .get(&delta.account_id)
            .ok_or_else(|| LedgerError::AccountNotFound(delta.account_id.into_inner()))?;

        let mut active: accounts::ActiveModel = account.clone().into();
        active.current_balance = Set(account.current_balance + delta.delta);
        active.updated_at = Set(now.into());
        active.update(txn).await.map_err(map_db_err)?;
    }

    Ok(())
}
