//! Initial database migration.
//!
//! Creates the enums, chart of accounts, transaction/ledger, report, and
//! audit tables plus seed classification data.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNT_TYPES_SQL).await?;
        db.execute_unprepared(ACCOUNT_CATEGORIES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS & LEDGER
        // ============================================================
        db.execute_unprepared(TRANSACTION_TYPES_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: REPORTS
        // ============================================================
        db.execute_unprepared(REPORTS_SQL).await?;

        // ============================================================
        // PART 5: AUDIT LOG
        // ============================================================
        db.execute_unprepared(AUDIT_LOG_SQL).await?;

        // ============================================================
        // PART 6: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_ACCOUNT_TYPES_SQL).await?;
        db.execute_unprepared(SEED_TRANSACTION_TYPES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Normal balance side
CREATE TYPE balance_type AS ENUM ('debit', 'credit');

-- Transaction posting status
CREATE TYPE transaction_status AS ENUM ('pending', 'posted', 'void');

-- Report generation status
CREATE TYPE report_status AS ENUM (
    'pending',
    'generating',
    'completed',
    'failed',
    'cancelled'
);

-- Report type
CREATE TYPE report_type AS ENUM (
    'trial_balance',
    'balance_sheet',
    'income_statement',
    'general_ledger'
);
";

const ACCOUNT_TYPES_SQL: &str = r"
CREATE TABLE account_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(10) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    normal_balance balance_type NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNT_CATEGORIES_SQL: &str = r"
CREATE TABLE account_categories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(100) NOT NULL,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    account_type_id UUID NOT NULL REFERENCES account_types(id),
    parent_category_id UUID REFERENCES account_categories(id),
    sort_order INTEGER NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (code, account_type_id)
);

CREATE INDEX idx_account_categories_type ON account_categories(account_type_id);
CREATE INDEX idx_account_categories_parent ON account_categories(parent_category_id);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_number VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(200) NOT NULL,
    description TEXT,
    account_type_id UUID NOT NULL REFERENCES account_types(id),
    category_id UUID NOT NULL REFERENCES account_categories(id),
    balance_type balance_type NOT NULL,
    opening_balance NUMERIC(15,2) NOT NULL DEFAULT 0,
    current_balance NUMERIC(15,2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_bank_account BOOLEAN NOT NULL DEFAULT FALSE,
    is_cash_account BOOLEAN NOT NULL DEFAULT FALSE,
    is_reconcilable BOOLEAN NOT NULL DEFAULT FALSE,
    allow_posting BOOLEAN NOT NULL DEFAULT TRUE,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_accounts_type_active ON accounts(account_type_id, is_active);
CREATE INDEX idx_accounts_category_active ON accounts(category_id, is_active);
";

const TRANSACTION_TYPES_SQL: &str = r"
CREATE TABLE transaction_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(10) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_number VARCHAR(50) NOT NULL UNIQUE,
    reference_number VARCHAR(100),
    description TEXT NOT NULL,
    transaction_date DATE NOT NULL,
    transaction_type_id UUID NOT NULL REFERENCES transaction_types(id),
    amount NUMERIC(15,2) NOT NULL,
    status transaction_status NOT NULL DEFAULT 'pending',
    posted_at TIMESTAMPTZ,
    posted_by UUID,
    voided_at TIMESTAMPTZ,
    voided_by UUID,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_date ON transactions(transaction_date);
CREATE INDEX idx_transactions_status ON transactions(status);
CREATE INDEX idx_transactions_type ON transactions(transaction_type_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    amount NUMERIC(15,2) NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_journal_entries_transaction ON journal_entries(transaction_id);
";

const JOURNAL_ITEMS_SQL: &str = r"
CREATE TABLE journal_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit_amount NUMERIC(15,2) NOT NULL DEFAULT 0 CHECK (debit_amount >= 0),
    credit_amount NUMERIC(15,2) NOT NULL DEFAULT 0 CHECK (credit_amount >= 0),
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    -- Exactly one side carries an amount.
    CHECK ((debit_amount > 0) <> (credit_amount > 0))
);

CREATE INDEX idx_journal_items_entry ON journal_items(journal_entry_id);
CREATE INDEX idx_journal_items_account ON journal_items(account_id);
";

const REPORTS_SQL: &str = r"
CREATE TABLE reports (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    report_number VARCHAR(50) NOT NULL UNIQUE,
    name VARCHAR(200) NOT NULL,
    report_type report_type NOT NULL,
    parameters JSONB NOT NULL DEFAULT '{}',
    status report_status NOT NULL DEFAULT 'pending',
    result JSONB,
    error_message TEXT,
    requested_by UUID NOT NULL,
    started_at TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_reports_status ON reports(status);
";

const AUDIT_LOG_SQL: &str = r"
CREATE TABLE audit_log (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    actor UUID NOT NULL,
    action VARCHAR(20) NOT NULL,
    entity VARCHAR(50) NOT NULL,
    entity_id UUID NOT NULL,
    details JSONB NOT NULL DEFAULT 'null',
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_audit_log_entity ON audit_log(entity, entity_id);
CREATE INDEX idx_audit_log_recorded ON audit_log(recorded_at);
";

const SEED_ACCOUNT_TYPES_SQL: &str = r"
INSERT INTO account_types (code, name, normal_balance) VALUES
    ('ASSET', 'Asset', 'debit'),
    ('LIABILITY', 'Liability', 'credit'),
    ('EQUITY', 'Equity', 'credit'),
    ('REVENUE', 'Revenue', 'credit'),
    ('EXPENSE', 'Expense', 'debit');
";

const SEED_TRANSACTION_TYPES_SQL: &str = r"
INSERT INTO transaction_types (code, name) VALUES
    ('JRNL', 'Journal Entry'),
    ('PAY', 'Payment'),
    ('RCPT', 'Receipt'),
    ('XFER', 'Transfer'),
    ('ADJ', 'Adjustment');
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS audit_log;
DROP TABLE IF EXISTS reports;
DROP TABLE IF EXISTS journal_items;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS transaction_types;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS account_categories;
DROP TABLE IF EXISTS account_types;
DROP TYPE IF EXISTS report_type;
DROP TYPE IF EXISTS report_status;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS balance_type;
";
