//! Transaction repository for transaction/entry/item database operations.
//!
//! Transactions are created PENDING and stay editable until posted. The
//! post/void critical sections live in [`super::posting`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use ledgerly_core::ledger::{
    JournalEntry, JournalItem, LedgerError, Transaction, TransactionStatus as CoreStatus,
};
use ledgerly_shared::types::{JournalEntryId, JournalItemId, TransactionId};

use crate::entities::{
    journal_entries, journal_items,
    sea_orm_active_enums::TransactionStatus,
    transaction_types, transactions,
};

pub(crate) fn map_db_err(e: DbErr) -> LedgerError {
    let message = e.to_string();
    // Serialization failures and deadlocks are retryable conflicts, not
    // internal errors.
    if message.contains("could not serialize") || message.contains("deadlock") {
        LedgerError::ConcurrencyConflict
    } else {
        LedgerError::Database(message)
    }
}

/// Input for a single journal item.
#[derive(Debug, Clone)]
pub struct CreateJournalItemInput {
    /// Account the item posts against.
    pub account_id: Uuid,
    /// Debit amount (zero if credit).
    pub debit_amount: Decimal,
    /// Credit amount (zero if debit).
    pub credit_amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

/// Input for a single journal entry.
#[derive(Debug, Clone)]
pub struct CreateJournalEntryInput {
    /// Entry description.
    pub description: String,
    /// Ordering within the transaction.
    pub sort_order: i32,
    /// The entry's items.
    pub items: Vec<CreateJournalItemInput>,
}

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Explicit transaction number; generated when absent.
    pub transaction_number: Option<String>,
    /// Optional external reference number.
    pub reference_number: Option<String>,
    /// Transaction description.
    pub description: String,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Transaction type ID.
    pub transaction_type_id: Uuid,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Journal entries.
    pub entries: Vec<CreateJournalEntryInput>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by status.
    pub status: Option<TransactionStatus>,
    /// Filter by transaction type.
    pub transaction_type_id: Option<Uuid>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// A transaction with its entries and items.
#[derive(Debug, Clone)]
pub struct TransactionWithEntries {
    /// Transaction header.
    pub transaction: transactions::Model,
    /// Entries with their items, in sort order.
    pub entries: Vec<(journal_entries::Model, Vec<journal_items::Model>)>,
}

/// Transaction repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all active transaction types.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_transaction_types(
        &self,
    ) -> Result<Vec<transaction_types::Model>, LedgerError> {
        transaction_types::Entity::find()
            .filter(transaction_types::Column::IsActive.eq(true))
            .order_by_asc(transaction_types::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Creates a new PENDING transaction with its entries and items.
    ///
    /// The header amount is the sum of entry amounts; each entry amount is
    /// its debit total. Full structural validation happens at post time.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction type is missing or the insert
    /// fails.
    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<TransactionWithEntries, LedgerError> {
        use sea_orm::TransactionTrait;

        let tx_type = transaction_types::Entity::find_by_id(input.transaction_type_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        if tx_type.is_none() {
            return Err(LedgerError::TransactionTypeNotFound(
                input.transaction_type_id,
            ));
        }

        let transaction_number = match input.transaction_number {
            Some(number) => number,
            None => self.next_transaction_number(input.transaction_date).await?,
        };

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let transaction_id = Uuid::new_v4();

        let mut total_amount = Decimal::ZERO;
        let mut stored_entries = Vec::with_capacity(input.entries.len());

        for entry_input in &input.entries {
            let entry_id = Uuid::new_v4();
            let entry_amount: Decimal =
                entry_input.items.iter().map(|i| i.debit_amount).sum();
            total_amount += entry_amount;

            let entry = journal_entries::ActiveModel {
                id: Set(entry_id),
                transaction_id: Set(transaction_id),
                description: Set(entry_input.description.clone()),
                amount: Set(entry_amount),
                sort_order: Set(entry_input.sort_order),
                created_at: Set(now),
            };

            let mut stored_items = Vec::with_capacity(entry_input.items.len());
            for item_input in &entry_input.items {
                let item = journal_items::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    journal_entry_id: Set(entry_id),
                    account_id: Set(item_input.account_id),
                    debit_amount: Set(item_input.debit_amount),
                    credit_amount: Set(item_input.credit_amount),
                    description: Set(item_input.description.clone()),
                    created_at: Set(now),
                };
                stored_items.push(item);
            }

            stored_entries.push((entry, stored_items));
        }

        let header = transactions::ActiveModel {
            id: Set(transaction_id),
            transaction_number: Set(transaction_number),
            reference_number: Set(input.reference_number),
            description: Set(input.description),
            transaction_date: Set(input.transaction_date),
            transaction_type_id: Set(input.transaction_type_id),
            amount: Set(total_amount),
            status: Set(TransactionStatus::Pending),
            posted_at: Set(None),
            posted_by: Set(None),
            voided_at: Set(None),
            voided_by: Set(None),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let header = header.insert(&txn).await.map_err(map_db_err)?;

        let mut result_entries = Vec::with_capacity(stored_entries.len());
        for (entry, items) in stored_entries {
            let entry = entry.insert(&txn).await.map_err(map_db_err)?;
            let mut result_items = Vec::with_capacity(items.len());
            for item in items {
                result_items.push(item.insert(&txn).await.map_err(map_db_err)?);
            }
            result_entries.push((entry, result_items));
        }

        txn.commit().await.map_err(map_db_err)?;

        Ok(TransactionWithEntries {
            transaction: header,
            entries: result_entries,
        })
    }

    /// Generates the next transaction number for a date:
    /// `TXN{YYYYMMDD}{seq:04}`.
    async fn next_transaction_number(&self, date: NaiveDate) -> Result<String, LedgerError> {
        let prefix = format!("TXN{}", date.format("%Y%m%d"));

        let last = transactions::Entity::find()
            .filter(transactions::Column::TransactionNumber.starts_with(&prefix))
            .order_by_desc(transactions::Column::TransactionNumber)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        let next_seq = last
            .and_then(|t| {
                t.transaction_number
                    .strip_prefix(&prefix)
                    .and_then(|s| s.parse::<u32>().ok())
            })
            .map_or(1, |seq| seq + 1);

        Ok(format!("{prefix}{next_seq:04}"))
    }

    /// Lists transactions with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let mut query = transactions::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(transactions::Column::Status.eq(status));
        }
        if let Some(type_id) = filter.transaction_type_id {
            query = query.filter(transactions::Column::TransactionTypeId.eq(type_id));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(transactions::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(transactions::Column::TransactionDate.lte(to));
        }

        query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Gets a transaction with all entries and items.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::TransactionNotFound` if missing.
    pub async fn get_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<TransactionWithEntries, LedgerError> {
        let transaction = transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        let entries = load_entries(&self.db, transaction_id).await?;

        Ok(TransactionWithEntries {
            transaction,
            entries,
        })
    }

    /// Updates a PENDING transaction's header fields.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Immutable` for posted or voided transactions.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        description: Option<String>,
        reference_number: Option<String>,
        notes: Option<String>,
    ) -> Result<transactions::Model, LedgerError> {
        let transaction = transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        let status: CoreStatus = transaction.status.into();
        if status.is_immutable() {
            return Err(LedgerError::Immutable(status));
        }

        let mut active: transactions::ActiveModel = transaction.into();
        if let Some(description) = description {
            active.description = Set(description);
        }
        if let Some(reference) = reference_number {
            active.reference_number = Set(Some(reference));
        }
        if let Some(notes) = notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map_err(map_db_err)
    }

    /// Deletes a PENDING transaction; entries and items cascade.
    ///
    /// Posted transactions are never deleted, only voided.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Immutable` for posted or voided transactions.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> Result<(), LedgerError> {
        let transaction = transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        let status: CoreStatus = transaction.status.into();
        if status.is_immutable() {
            return Err(LedgerError::Immutable(status));
        }

        transactions::Entity::delete_by_id(transaction_id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}

/// Loads a transaction's entries with their items, in sort order.
pub(crate) async fn load_entries<C: ConnectionTrait>(
    conn: &C,
    transaction_id: Uuid,
) -> Result<Vec<(journal_entries::Model, Vec<journal_items::Model>)>, LedgerError> {
    let entries = journal_entries::Entity::find()
        .filter(journal_entries::Column::TransactionId.eq(transaction_id))
        .order_by_asc(journal_entries::Column::SortOrder)
        .all(conn)
        .await
        .map_err(map_db_err)?;

    let mut result = Vec::with_capacity(entries.len());
    for entry in entries {
        let items = journal_items::Entity::find()
            .filter(journal_items::Column::JournalEntryId.eq(entry.id))
            .order_by_asc(journal_items::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(map_db_err)?;
        result.push((entry, items));
    }

    Ok(result)
}

/// Converts loaded rows into the pure domain aggregate the ledger engine
/// validates and plans against.
#[must_use]
pub(crate) fn to_domain(
    transaction: &transactions::Model,
    entries: &[(journal_entries::Model, Vec<journal_items::Model>)],
) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(transaction.id),
        transaction_number: transaction.transaction_number.clone(),
        reference_number: transaction.reference_number.clone(),
        description: transaction.description.clone(),
        transaction_date: transaction.transaction_date,
        amount: transaction.amount,
        status: transaction.status.into(),
        posted_at: transaction.posted_at.map(Into::into),
        voided_at: transaction.voided_at.map(Into::into),
        entries: entries
            .iter()
            .map(|(entry, items)| JournalEntry {
                id: JournalEntryId::from_uuid(entry.id),
                description: entry.description.clone(),
                amount: entry.amount,
                sort_order: entry.sort_order,
                items: items
                    .iter()
                    .map(|item| JournalItem {
                        id: JournalItemId::from_uuid(item.id),
                        account_id: ledgerly_shared::types::AccountId::from_uuid(item.account_id),
                        debit_amount: item.debit_amount,
                        credit_amount: item.credit_amount,
                        description: item.description.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_db_err_serialization_is_conflict() {
        let err = DbErr::Custom("could not serialize access due to concurrent update".into());
        assert!(matches!(map_db_err(err), LedgerError::ConcurrencyConflict));

        let err = DbErr::Custom("deadlock detected".into());
        assert!(matches!(map_db_err(err), LedgerError::ConcurrencyConflict));
    }

    #[test]
    fn test_map_db_err_other_is_database() {
        let err = DbErr::Custom("connection refused".into());
        assert!(matches!(map_db_err(err), LedgerError::Database(_)));
    }
}
