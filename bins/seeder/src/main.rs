//! Development data seeder for Ledgerly.
//!
//! Creates a small demo chart of accounts and posts one opening
//! transaction so reports have something to show. Intended for local
//! development against a freshly migrated database.

use anyhow::Context;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::info;
use uuid::Uuid;

use ledgerly_core::ledger::BalanceType;
use ledgerly_db::connect;
use ledgerly_db::entities::{account_types, transaction_types};
use ledgerly_db::repositories::{
    AccountRepository, CreateAccountInput, CreateJournalEntryInput, CreateJournalItemInput,
    CreateTransactionInput, PostingRepository, TransactionRepository,
};
use ledgerly_db::repositories::CreateCategoryInput;
use ledgerly_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::load().context("load configuration")?;
    let db = connect(&config.database.url).await.context("connect")?;

    let accounts = AccountRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());
    let posting = PostingRepository::new(db.clone());

    let account_type = |code: &str| {
        let db = db.clone();
        let code = code.to_string();
        async move {
            account_types::Entity::find()
                .filter(account_types::Column::Code.eq(code.clone()))
                .one(&db)
                .await?
                .ok_or_else(|| anyhow::anyhow!("missing seeded account type {code}"))
        }
    };

    let asset = account_type("ASSET").await?;
    let equity = account_type("EQUITY").await?;
    let revenue = account_type("REVENUE").await?;
    let expense = account_type("EXPENSE").await?;

    let current_assets = accounts
        .create_category(CreateCategoryInput {
            code: "1000".to_string(),
            name: "Current Assets".to_string(),
            description: None,
            account_type_id: asset.id,
            parent_category_id: None,
            sort_order: 0,
        })
        .await?;

    let owner_equity = accounts
        .create_category(CreateCategoryInput {
            code: "3000".to_string(),
            name: "Owner Equity".to_string(),
            description: None,
            account_type_id: equity.id,
            parent_category_id: None,
            sort_order: 0,
        })
        .await?;

    let sales = accounts
        .create_category(CreateCategoryInput {
            code: "4000".to_string(),
            name: "Sales".to_string(),
            description: None,
            account_type_id: revenue.id,
            parent_category_id: None,
            sort_order: 0,
        })
        .await?;

    let operating = accounts
        .create_category(CreateCategoryInput {
            code: "5000".to_string(),
            name: "Operating Expenses".to_string(),
            description: None,
            account_type_id: expense.id,
            parent_category_id: None,
            sort_order: 0,
        })
        .await?;

    let cash = accounts
        .create_account(CreateAccountInput {
            account_number: "1000".to_string(),
            name: "Cash".to_string(),
            description: Some("Petty cash and checking".to_string()),
            account_type_id: asset.id,
            category_id: current_assets.id,
            balance_type: BalanceType::Debit,
            opening_balance: dec!(0),
            is_bank_account: true,
            is_cash_account: true,
            is_reconcilable: true,
            allow_posting: true,
            sort_order: 0,
        })
        .await?;

    let capital = accounts
        .create_account(CreateAccountInput {
            account_number: "3000".to_string(),
            name: "Owner Capital".to_string(),
            description: None,
            account_type_id: equity.id,
            category_id: owner_equity.id,
            balance_type: BalanceType::Credit,
            opening_balance: dec!(0),
            is_bank_account: false,
            is_cash_account: false,
            is_reconcilable: false,
            allow_posting: true,
            sort_order: 0,
        })
        .await?;

    accounts
        .create_account(CreateAccountInput {
            account_number: "4000".to_string(),
            name: "Service Revenue".to_string(),
            description: None,
            account_type_id: revenue.id,
            category_id: sales.id,
            balance_type: BalanceType::Credit,
            opening_balance: dec!(0),
            is_bank_account: false,
            is_cash_account: false,
            is_reconcilable: false,
            allow_posting: true,
            sort_order: 0,
        })
        .await?;

    accounts
        .create_account(CreateAccountInput {
            account_number: "5000".to_string(),
            name: "Office Expense".to_string(),
            description: None,
            account_type_id: expense.id,
            category_id: operating.id,
            balance_type: BalanceType::Debit,
            opening_balance: dec!(0),
            is_bank_account: false,
            is_cash_account: false,
            is_reconcilable: false,
            allow_posting: true,
            sort_order: 0,
        })
        .await?;

    let journal = transaction_types::Entity::find()
        .filter(transaction_types::Column::Code.eq("JRNL"))
        .one(&db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("missing seeded JRNL transaction type"))?;

    let opening = transactions
        .create_transaction(CreateTransactionInput {
            transaction_number: None,
            reference_number: None,
            description: "Opening capital contribution".to_string(),
            transaction_date: Utc::now().date_naive(),
            transaction_type_id: journal.id,
            notes: None,
            entries: vec![CreateJournalEntryInput {
                description: "Owner funds the business".to_string(),
                sort_order: 0,
                items: vec![
                    CreateJournalItemInput {
                        account_id: cash.id,
                        debit_amount: dec!(10000),
                        credit_amount: dec!(0),
                        description: None,
                    },
                    CreateJournalItemInput {
                        account_id: capital.id,
                        debit_amount: dec!(0),
                        credit_amount: dec!(10000),
                        description: None,
                    },
                ],
            }],
        })
        .await?;

    let seeder_actor = Uuid::new_v4();
    posting
        .post_transaction(opening.transaction.id, seeder_actor)
        .await?;

    info!(
        transaction_number = %opening.transaction.transaction_number,
        "Seed data created and opening transaction posted"
    );

    Ok(())
}
