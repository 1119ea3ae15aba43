//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ledgerly_shared::types::AccountId;

use crate::coa::AccountClass;
use crate::ledger::BalanceType;

/// Per-account sums of posted journal items, as supplied by the storage
/// layer for a report boundary.
///
/// `opening_balance` is in the account's natural sign (a credit-normal
/// account's opening credit is positive). `debit_total`/`credit_total` sum
/// only items belonging to POSTED transactions within the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountActivity {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Account class (asset, liability, equity, revenue, expense).
    pub class: AccountClass,
    /// Normal balance side.
    pub balance_type: BalanceType,
    /// Opening balance in the account's natural sign.
    pub opening_balance: Decimal,
    /// Total posted debits.
    pub debit_total: Decimal,
    /// Total posted credits.
    pub credit_total: Decimal,
}

impl AccountActivity {
    /// Net position in debit-signed arithmetic: opening folded onto the
    /// debit side plus posted debits minus posted credits.
    #[must_use]
    pub fn net_debit_signed(&self) -> Decimal {
        let opening = match self.balance_type {
            BalanceType::Debit => self.opening_balance,
            BalanceType::Credit => -self.opening_balance,
        };
        opening + self.debit_total - self.credit_total
    }

    /// Balance in the account's natural sign.
    #[must_use]
    pub fn natural_balance(&self) -> Decimal {
        match self.balance_type {
            BalanceType::Debit => self.net_debit_signed(),
            BalanceType::Credit => -self.net_debit_signed(),
        }
    }

    /// Period activity in the account's natural sign (ignores opening).
    #[must_use]
    pub fn period_activity(&self) -> Decimal {
        match self.balance_type {
            BalanceType::Debit => self.debit_total - self.credit_total,
            BalanceType::Credit => self.credit_total - self.debit_total,
        }
    }
}

/// One account row of a trial balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Debit column (nonzero when the net position is debit-side).
    pub debit: Decimal,
    /// Credit column (nonzero when the net position is credit-side).
    pub credit: Decimal,
}

/// Trial balance grand totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Grand debit total.
    pub total_debit: Decimal,
    /// Grand credit total.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Account rows, ordered by account number.
    pub accounts: Vec<TrialBalanceRow>,
    /// Grand totals.
    pub totals: TrialBalanceTotals,
}

/// One account row of a balance sheet or income statement section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Balance in the account's natural sign.
    pub balance: Decimal,
}

/// A balance sheet section (assets, liabilities, or equity).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheetSection {
    /// Section total.
    pub total: Decimal,
    /// Accounts in this section.
    pub accounts: Vec<BalanceSheetRow>,
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Assets section.
    pub assets: BalanceSheetSection,
    /// Liabilities section.
    pub liabilities: BalanceSheetSection,
    /// Equity section.
    pub equity: BalanceSheetSection,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity within tolerance.
    pub is_balanced: bool,
}

/// One account row of an income statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Period activity in the account's natural sign.
    pub amount: Decimal,
}

/// An income statement section (revenue or expenses).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeStatementSection {
    /// Section total.
    pub total: Decimal,
    /// Accounts in this section.
    pub accounts: Vec<IncomeStatementRow>,
}

/// Income statement report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Revenue section.
    pub revenue: IncomeStatementSection,
    /// Expenses section.
    pub expenses: IncomeStatementSection,
    /// Total revenue.
    pub total_revenue: Decimal,
    /// Total expenses.
    pub total_expenses: Decimal,
    /// Net income (revenue minus expenses).
    pub net_income: Decimal,
}

/// A posted journal item feeding the general ledger, in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedItem {
    /// Transaction number.
    pub transaction_number: String,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Line or transaction description.
    pub description: String,
    /// Debit amount.
    pub debit_amount: Decimal,
    /// Credit amount.
    pub credit_amount: Decimal,
}

/// One line of a general ledger with its running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Transaction date.
    pub date: NaiveDate,
    /// Transaction number.
    pub reference: String,
    /// Description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Running balance after this line, in the account's natural sign.
    pub balance: Decimal,
}

/// General ledger report for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralLedgerReport {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Balance at the day before the period start.
    pub opening_balance: Decimal,
    /// Balance after the last line.
    pub closing_balance: Decimal,
    /// Chronologically ordered lines.
    pub lines: Vec<LedgerLine>,
}
