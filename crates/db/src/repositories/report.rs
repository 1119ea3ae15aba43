//! Report repository: posted-ledger aggregation queries and the report
//! lifecycle (pending -> generating -> completed/failed, cancellable).
//!
//! All aggregations read only journal items belonging to POSTED
//! transactions dated within the query boundary. Nothing here mutates
//! ledger state.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use ledgerly_core::coa::AccountClass;
use ledgerly_core::reports::{
    AccountActivity, PostedItem, ReportError, ReportService, lifecycle,
};
use ledgerly_shared::types::AccountId;

use crate::entities::{
    account_types, accounts, journal_entries, journal_items, reports,
    sea_orm_active_enums::{ReportStatus, ReportType, TransactionStatus},
    transactions,
};

fn db_err(e: DbErr) -> ReportError {
    ReportError::Database(e.to_string())
}

/// Input for creating a report lifecycle record.
#[derive(Debug, Clone)]
pub struct CreateReportInput {
    /// Report display name.
    pub name: String,
    /// Report type.
    pub report_type: ReportType,
    /// Type-specific parameters (dates, account).
    pub parameters: serde_json::Value,
    /// The requesting principal.
    pub requested_by: Uuid,
}

/// Parameters accepted by `generate`, stored as the report's JSON
/// parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportParameters {
    /// As-of date for point-in-time reports.
    pub as_of: Option<NaiveDate>,
    /// Range start for period reports.
    pub start_date: Option<NaiveDate>,
    /// Range end for period reports.
    pub end_date: Option<NaiveDate>,
    /// Account for general ledger reports.
    pub account_id: Option<Uuid>,
}

/// Report repository for aggregation and lifecycle persistence.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

/// Per-item sums joined with transaction metadata.
#[derive(Debug, FromQueryResult)]
struct ItemRow {
    debit_amount: Decimal,
    credit_amount: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct LedgerItemRow {
    debit_amount: Decimal,
    credit_amount: Decimal,
    item_description: Option<String>,
    txn_number: String,
    txn_date: NaiveDate,
    txn_description: String,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Aggregation queries
    // ========================================================================

    /// Per-account posted sums as of a date, opening balances included.
    ///
    /// Feeds the trial balance and balance sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn activities_as_of(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<AccountActivity>, ReportError> {
        self.collect_activities(Some(as_of), None, true).await
    }

    /// Per-account posted sums strictly within a date range, opening
    /// balances zeroed.
    ///
    /// Feeds the income statement.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn activities_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AccountActivity>, ReportError> {
        self.collect_activities(Some(end), Some(start), false).await
    }

    async fn collect_activities(
        &self,
        to: Option<NaiveDate>,
        from: Option<NaiveDate>,
        include_opening: bool,
    ) -> Result<Vec<AccountActivity>, ReportError> {
        let account_rows = accounts::Entity::find()
            .filter(accounts::Column::IsActive.eq(true))
            .find_also_related(account_types::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut activities = Vec::with_capacity(account_rows.len());

        for (account, account_type) in account_rows {
            let Some(account_type) = account_type else {
                warn!(account = %account.account_number, "account has no account type row");
                continue;
            };

            let Some(class) = AccountClass::from_code(&account_type.code) else {
                warn!(
                    account = %account.account_number,
                    type_code = %account_type.code,
                    "account type code does not map to a report class"
                );
                continue;
            };

            let (debit_total, credit_total) = self.sum_posted_items(account.id, from, to).await?;

            activities.push(AccountActivity {
                account_id: AccountId::from_uuid(account.id),
                account_number: account.account_number,
                name: account.name,
                class,
                balance_type: account.balance_type.into(),
                opening_balance: if include_opening {
                    account.opening_balance
                } else {
                    Decimal::ZERO
                },
                debit_total,
                credit_total,
            });
        }

        Ok(activities)
    }

    /// Sums posted debit/credit amounts for one account within bounds.
    async fn sum_posted_items(
        &self,
        account_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(Decimal, Decimal), ReportError> {
        let mut query = journal_items::Entity::find()
            .select_only()
            .column(journal_items::Column::DebitAmount)
            .column(journal_items::Column::CreditAmount)
            .filter(journal_items::Column::AccountId.eq(account_id))
            .join(
                JoinType::InnerJoin,
                journal_items::Relation::JournalEntries.def(),
            )
            .join(
                JoinType::InnerJoin,
                journal_entries::Relation::Transactions.def(),
            )
            .filter(transactions::Column::Status.eq(TransactionStatus::Posted));

        if let Some(from) = from {
            query = query.filter(transactions::Column::TransactionDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(transactions::Column::TransactionDate.lte(to));
        }

        let rows: Vec<ItemRow> = query.into_model().all(&self.db).await.map_err(db_err)?;

        let debit_total = rows.iter().map(|r| r.debit_amount).sum();
        let credit_total = rows.iter().map(|r| r.credit_amount).sum();

        Ok((debit_total, credit_total))
    }

    /// The account's balance in its natural sign as of a date.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::AccountNotFound` if the account is unknown.
    pub async fn balance_as_of(
        &self,
        account_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Decimal, ReportError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ReportError::AccountNotFound(account_id))?;

        let (debit_total, credit_total) =
            self.sum_posted_items(account_id, None, Some(as_of)).await?;

        let balance_type: ledgerly_core::ledger::BalanceType = account.balance_type.into();
        Ok(account.opening_balance
            + ledgerly_core::ledger::balance_delta(balance_type, debit_total, credit_total))
    }

    /// Chronologically ordered posted items for one account in a range.
    ///
    /// Ordering is (transaction_date, item created_at), so re-querying the
    /// same posted state yields the same sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn posted_items_for_account(
        &self,
        account_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PostedItem>, ReportError> {
        let rows: Vec<LedgerItemRow> = journal_items::Entity::find()
            .select_only()
            .column(journal_items::Column::DebitAmount)
            .column(journal_items::Column::CreditAmount)
            .column_as(journal_items::Column::Description, "item_description")
            .column_as(transactions::Column::TransactionNumber, "txn_number")
            .column_as(transactions::Column::TransactionDate, "txn_date")
            .column_as(transactions::Column::Description, "txn_description")
            .filter(journal_items::Column::AccountId.eq(account_id))
            .join(
                JoinType::InnerJoin,
                journal_items::Relation::JournalEntries.def(),
            )
            .join(
                JoinType::InnerJoin,
                journal_entries::Relation::Transactions.def(),
            )
            .filter(transactions::Column::Status.eq(TransactionStatus::Posted))
            .filter(transactions::Column::TransactionDate.gte(start))
            .filter(transactions::Column::TransactionDate.lte(end))
            .order_by_asc(transactions::Column::TransactionDate)
            .order_by_asc(journal_items::Column::CreatedAt)
            .into_model()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| PostedItem {
                transaction_number: row.txn_number,
                transaction_date: row.txn_date,
                description: row.item_description.unwrap_or(row.txn_description),
                debit_amount: row.debit_amount,
                credit_amount: row.credit_amount,
            })
            .collect())
    }

    // ========================================================================
    // Lifecycle persistence
    // ========================================================================

    /// Creates a PENDING report record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_report(
        &self,
        input: CreateReportInput,
    ) -> Result<reports::Model, ReportError> {
        let now = chrono::Utc::now();
        let report_number = self.next_report_number(now.date_naive()).await?;

        let report = reports::ActiveModel {
            id: Set(Uuid::new_v4()),
            report_number: Set(report_number),
            name: Set(input.name),
            report_type: Set(input.report_type),
            parameters: Set(input.parameters),
            status: Set(ReportStatus::Pending),
            result: Set(None),
            error_message: Set(None),
            requested_by: Set(input.requested_by),
            started_at: Set(None),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        report.insert(&self.db).await.map_err(db_err)
    }

    /// Generates the next report number for a date: `RPT{YYYYMMDD}{seq:04}`.
    async fn next_report_number(&self, date: NaiveDate) -> Result<String, ReportError> {
        let prefix = format!("RPT{}", date.format("%Y%m%d"));

        let last = reports::Entity::find()
            .filter(reports::Column::ReportNumber.starts_with(&prefix))
            .order_by_desc(reports::Column::ReportNumber)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let next_seq = last
            .and_then(|r| {
                r.report_number
                    .strip_prefix(&prefix)
                    .and_then(|s| s.parse::<u32>().ok())
            })
            .map_or(1, |seq| seq + 1);

        Ok(format!("{prefix}{next_seq:04}"))
    }

    /// Gets a report by ID.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ReportNotFound` if missing.
    pub async fn get_report(&self, id: Uuid) -> Result<reports::Model, ReportError> {
        reports::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ReportError::ReportNotFound(id))
    }

    /// Lists reports, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_reports(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<reports::Model>, ReportError> {
        let mut query = reports::Entity::find().order_by_desc(reports::Column::CreatedAt);

        if let Some(status) = status {
            query = query.filter(reports::Column::Status.eq(status));
        }

        query.all(&self.db).await.map_err(db_err)
    }

    /// Runs generation for a report: transitions to GENERATING, computes
    /// the requested aggregation, and transitions to COMPLETED with the
    /// stored result, or FAILED with the error message.
    ///
    /// A report is never left stuck in GENERATING: every aggregation
    /// failure is caught and persisted as FAILED.
    ///
    /// # Errors
    ///
    /// Returns the underlying error after recording the FAILED state, or
    /// an `InvalidStatusTransition` if the report cannot be generated from
    /// its current status.
    pub async fn generate(&self, report_id: Uuid) -> Result<reports::Model, ReportError> {
        let report = self.get_report(report_id).await?;

        // Guard first: only Pending or Failed (retry) may start.
        lifecycle::start_generation(report.status.into())?;

        let now = chrono::Utc::now();
        let mut active: reports::ActiveModel = report.clone().into();
        active.status = Set(ReportStatus::Generating);
        active.started_at = Set(Some(now.into()));
        active.error_message = Set(None);
        active.updated_at = Set(now.into());
        let claimed = active.update(&self.db).await.map_err(db_err)?;

        match self.run_aggregation(&claimed).await {
            Ok(result) => {
                let now = chrono::Utc::now();
                let mut active: reports::ActiveModel = claimed.into();
                active.status = Set(ReportStatus::Completed);
                active.result = Set(Some(result));
                active.completed_at = Set(Some(now.into()));
                active.updated_at = Set(now.into());
                active.update(&self.db).await.map_err(db_err)
            }
            Err(err) => {
                let now = chrono::Utc::now();
                let mut active: reports::ActiveModel = claimed.into();
                active.status = Set(ReportStatus::Failed);
                active.error_message = Set(Some(err.to_string()));
                active.updated_at = Set(now.into());
                // Persist the failure, then surface the original error.
                active.update(&self.db).await.map_err(db_err)?;
                Err(err)
            }
        }
    }

    /// Cancels a PENDING or GENERATING report.
    ///
    /// Cancellation never touches ledger state and clears any partial
    /// result.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidStatusTransition` for completed,
    /// failed, or already-cancelled reports.
    pub async fn cancel(&self, report_id: Uuid) -> Result<reports::Model, ReportError> {
        let report = self.get_report(report_id).await?;

        lifecycle::cancel_generation(report.status.into())?;

        let now = chrono::Utc::now();
        let mut active: reports::ActiveModel = report.into();
        active.status = Set(ReportStatus::Cancelled);
        active.result = Set(None);
        active.updated_at = Set(now.into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Dispatches the aggregation for a claimed report.
    async fn run_aggregation(
        &self,
        report: &reports::Model,
    ) -> Result<serde_json::Value, ReportError> {
        let raw = if report.parameters.is_null() {
            serde_json::json!({})
        } else {
            report.parameters.clone()
        };
        let params: ReportParameters = serde_json::from_value(raw)
            .map_err(|e| ReportError::InvalidParameters(e.to_string()))?;

        let today = chrono::Utc::now().date_naive();

        match report.report_type {
            ReportType::TrialBalance => {
                let as_of = params.as_of.unwrap_or(today);
                let activities = self.activities_as_of(as_of).await?;
                let result = ReportService::trial_balance(as_of, activities)?;
                serde_json::to_value(result)
                    .map_err(|e| ReportError::Database(e.to_string()))
            }
            ReportType::BalanceSheet => {
                let as_of = params.as_of.unwrap_or(today);
                let activities = self.activities_as_of(as_of).await?;
                let result = ReportService::balance_sheet(as_of, activities);
                if !result.is_balanced {
                    warn!(as_of = %as_of, "balance sheet identity does not hold");
                }
                serde_json::to_value(result)
                    .map_err(|e| ReportError::Database(e.to_string()))
            }
            ReportType::IncomeStatement => {
                let (start, end) = require_range(&params)?;
                let activities = self.activities_in_range(start, end).await?;
                let result = ReportService::income_statement(start, end, activities)?;
                serde_json::to_value(result)
                    .map_err(|e| ReportError::Database(e.to_string()))
            }
            ReportType::GeneralLedger => {
                let (start, end) = require_range(&params)?;
                let account_id = params.account_id.ok_or_else(|| {
                    ReportError::InvalidParameters(
                        "account_id is required for general ledger reports".to_string(),
                    )
                })?;
                let result = self.general_ledger(account_id, start, end).await?;
                serde_json::to_value(result)
                    .map_err(|e| ReportError::Database(e.to_string()))
            }
        }
    }

    /// Computes the general ledger for one account.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::AccountNotFound` if the account is unknown,
    /// or `InvalidDateRange` for a reversed range.
    pub async fn general_ledger(
        &self,
        account_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ledgerly_core::reports::GeneralLedgerReport, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }

        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ReportError::AccountNotFound(account_id))?;

        let opening = match start.pred_opt() {
            Some(day_before) => self.balance_as_of(account_id, day_before).await?,
            None => account.opening_balance,
        };

        let items = self.posted_items_for_account(account_id, start, end).await?;

        ReportService::general_ledger(
            AccountId::from_uuid(account.id),
            account.account_number,
            account.name,
            account.balance_type.into(),
            start,
            end,
            opening,
            items,
        )
    }
}

fn require_range(params: &ReportParameters) -> Result<(NaiveDate, NaiveDate), ReportError> {
    match (params.start_date, params.end_date) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(ReportError::InvalidParameters(
            "start_date and end_date are required".to_string(),
        )),
    }
}
