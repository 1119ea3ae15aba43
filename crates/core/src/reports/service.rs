//! Report generation service.
//!
//! Pure computation over per-account posted sums. Never mutates ledger
//! state; the storage layer supplies `AccountActivity` rows restricted to
//! POSTED transactions within the report boundary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use ledgerly_shared::types::AccountId;

use super::error::ReportError;
use super::types::{
    AccountActivity, BalanceSheetReport, BalanceSheetRow, BalanceSheetSection,
    GeneralLedgerReport, IncomeStatementReport, IncomeStatementRow, IncomeStatementSection,
    LedgerLine, PostedItem, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};
use crate::coa::AccountClass;
use crate::ledger::{BalanceType, balance::balance_delta};

/// One cent: the tolerance inside which Assets == Liabilities + Equity is
/// considered to hold.
fn identity_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance from posted sums as of a date.
    ///
    /// Every account's net position lands in its debit or credit column by
    /// sign. The grand totals are the system-wide double-entry check.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Consistency` if grand debits differ from grand
    /// credits: that means the posted ledger itself is corrupt, and the
    /// report must not pretend otherwise.
    pub fn trial_balance(
        as_of: NaiveDate,
        mut activities: Vec<AccountActivity>,
    ) -> Result<TrialBalanceReport, ReportError> {
        activities.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        let mut rows = Vec::with_capacity(activities.len());
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;

        for activity in activities {
            let net = activity.net_debit_signed();
            let (debit, credit) = if net >= Decimal::ZERO {
                (net, Decimal::ZERO)
            } else {
                (Decimal::ZERO, -net)
            };

            total_debit += debit;
            total_credit += credit;

            rows.push(TrialBalanceRow {
                account_id: activity.account_id,
                account_number: activity.account_number,
                name: activity.name,
                debit,
                credit,
            });
        }

        if total_debit != total_credit {
            return Err(ReportError::Consistency {
                total_debit,
                total_credit,
            });
        }

        Ok(TrialBalanceReport {
            as_of,
            accounts: rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: true,
            },
        })
    }

    /// Generates a balance sheet from posted sums as of a date.
    ///
    /// Partitions accounts by class into assets, liabilities, and equity
    /// (revenue/expense activity is ignored here; it rolls into equity only
    /// through closing entries, which are ordinary transactions). The
    /// accounting identity is checked within a one-cent tolerance and
    /// reported via `is_balanced`.
    #[must_use]
    pub fn balance_sheet(as_of: NaiveDate, mut activities: Vec<AccountActivity>) -> BalanceSheetReport {
        activities.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        let mut assets = BalanceSheetSection::default();
        let mut liabilities = BalanceSheetSection::default();
        let mut equity = BalanceSheetSection::default();

        for activity in activities {
            let section = match activity.class {
                AccountClass::Asset => &mut assets,
                AccountClass::Liability => &mut liabilities,
                AccountClass::Equity => &mut equity,
                AccountClass::Revenue | AccountClass::Expense => continue,
            };

            let balance = activity.natural_balance();
            section.total += balance;
            section.accounts.push(BalanceSheetRow {
                account_id: activity.account_id,
                account_number: activity.account_number,
                name: activity.name,
                balance,
            });
        }

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total;
        let liabilities_and_equity = total_liabilities + total_equity;
        let is_balanced = (total_assets - liabilities_and_equity).abs() <= identity_tolerance();

        BalanceSheetReport {
            as_of,
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced,
        }
    }

    /// Generates an income statement for a date range.
    ///
    /// The supplied activities must be restricted to posted items strictly
    /// within the range (not cumulative); opening balances are not used.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `start > end`.
    pub fn income_statement(
        start: NaiveDate,
        end: NaiveDate,
        mut activities: Vec<AccountActivity>,
    ) -> Result<IncomeStatementReport, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }

        activities.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        let mut revenue = IncomeStatementSection::default();
        let mut expenses = IncomeStatementSection::default();

        for activity in activities {
            let section = match activity.class {
                AccountClass::Revenue => &mut revenue,
                AccountClass::Expense => &mut expenses,
                _ => continue,
            };

            let amount = activity.period_activity();
            section.total += amount;
            section.accounts.push(IncomeStatementRow {
                account_id: activity.account_id,
                account_number: activity.account_number,
                name: activity.name,
                amount,
            });
        }

        let total_revenue = revenue.total;
        let total_expenses = expenses.total;

        Ok(IncomeStatementReport {
            period_start: start,
            period_end: end,
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_income: total_revenue - total_expenses,
        })
    }

    /// Generates the general ledger for one account over a date range.
    ///
    /// `items` must be the account's posted items within the range, already
    /// in chronological order; `opening_balance` is the account's balance
    /// at the day before `start`. Re-querying the same posted state yields
    /// the same ordered sequence.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `start > end`.
    #[allow(clippy::too_many_arguments)]
    pub fn general_ledger(
        account_id: AccountId,
        account_number: String,
        name: String,
        balance_type: BalanceType,
        start: NaiveDate,
        end: NaiveDate,
        opening_balance: Decimal,
        items: Vec<PostedItem>,
    ) -> Result<GeneralLedgerReport, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }

        let mut balance = opening_balance;
        let mut lines = Vec::with_capacity(items.len());

        for item in items {
            balance += balance_delta(balance_type, item.debit_amount, item.credit_amount);
            lines.push(LedgerLine {
                date: item.transaction_date,
                reference: item.transaction_number,
                description: item.description,
                debit: item.debit_amount,
                credit: item.credit_amount,
                balance,
            });
        }

        Ok(GeneralLedgerReport {
            account_id,
            account_number,
            name,
            period_start: start,
            period_end: end,
            opening_balance,
            closing_balance: balance,
            lines,
        })
    }
}
