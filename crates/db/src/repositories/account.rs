//! Account repository for chart of accounts database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use ledgerly_core::coa::{
    CoaError, ensure_balance_type_matches, ensure_can_deactivate, ensure_category_matches_type,
    ensure_parent_type_matches, would_create_cycle,
};

use crate::entities::{
    account_categories, account_types, accounts, journal_entries, journal_items,
    sea_orm_active_enums::{BalanceType, TransactionStatus},
    transactions,
};

fn db_err(e: DbErr) -> CoaError {
    CoaError::Database(e.to_string())
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account number (must be unique).
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type ID.
    pub account_type_id: Uuid,
    /// Category ID.
    pub category_id: Uuid,
    /// Normal balance side; must match the account type's normal balance.
    pub balance_type: ledgerly_core::ledger::BalanceType,
    /// Opening balance in the account's natural sign.
    pub opening_balance: rust_decimal::Decimal,
    /// Whether this is a bank account.
    pub is_bank_account: bool,
    /// Whether this is a cash account.
    pub is_cash_account: bool,
    /// Whether this account is reconcilable.
    pub is_reconcilable: bool,
    /// Whether direct posting is allowed.
    pub allow_posting: bool,
    /// Ordering within listings.
    pub sort_order: i32,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account name.
    pub name: Option<String>,
    /// Account description.
    pub description: Option<Option<String>>,
    /// Category ID (validated against the account's type).
    pub category_id: Option<Uuid>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
    /// Whether this is a bank account.
    pub is_bank_account: Option<bool>,
    /// Whether this is a cash account.
    pub is_cash_account: Option<bool>,
    /// Whether this account is reconcilable.
    pub is_reconcilable: Option<bool>,
    /// Whether direct posting is allowed.
    pub allow_posting: Option<bool>,
    /// Ordering within listings.
    pub sort_order: Option<i32>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type_id: Option<Uuid>,
    /// Filter by category.
    pub category_id: Option<Uuid>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Filter by bank-account flag.
    pub is_bank_account: Option<bool>,
    /// Filter by cash-account flag.
    pub is_cash_account: Option<bool>,
    /// Filter by reconcilable flag.
    pub is_reconcilable: Option<bool>,
}

/// Input for creating an account category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category code (unique per account type).
    pub code: String,
    /// Category name.
    pub name: String,
    /// Category description.
    pub description: Option<String>,
    /// Account type ID.
    pub account_type_id: Uuid,
    /// Optional parent category.
    pub parent_category_id: Option<Uuid>,
    /// Ordering among siblings.
    pub sort_order: i32,
}

/// Input for updating an account category.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// Category name.
    pub name: Option<String>,
    /// Category description.
    pub description: Option<Option<String>>,
    /// New parent (outer None = unchanged, inner None = detach to root).
    pub parent_category_id: Option<Option<Uuid>>,
    /// Ordering among siblings.
    pub sort_order: Option<i32>,
    /// Whether the category is active.
    pub is_active: Option<bool>,
}

/// A category with its subcategories and accounts.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    /// The category itself.
    pub category: account_categories::Model,
    /// Direct subcategories, recursively expanded.
    pub subcategories: Vec<CategoryTree>,
    /// Active accounts directly in this category.
    pub accounts: Vec<accounts::Model>,
}

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all active account types.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_account_types(&self) -> Result<Vec<account_types::Model>, CoaError> {
        account_types::Entity::find()
            .order_by_asc(account_types::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Creates a new account with validation.
    ///
    /// The account's balance type is fixed to its type's normal balance;
    /// the category must belong to the same account type.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account number already exists
    /// - The account type or category does not exist
    /// - The category belongs to a different account type
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, CoaError> {
        // Unique account number.
        let existing = accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(&input.account_number))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_some() {
            return Err(CoaError::DuplicateAccountNumber(input.account_number));
        }

        // Account type must exist; it fixes the balance type.
        let account_type = account_types::Entity::find_by_id(input.account_type_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CoaError::AccountTypeNotFound(input.account_type_id))?;

        // Category must exist and belong to the same account type.
        let category = account_categories::Entity::find_by_id(input.category_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CoaError::CategoryNotFound(input.category_id))?;

        ensure_category_matches_type(
            ledgerly_shared::types::AccountTypeId::from_uuid(category.account_type_id),
            ledgerly_shared::types::AccountTypeId::from_uuid(input.account_type_id),
        )?;

        ensure_balance_type_matches(account_type.normal_balance.into(), input.balance_type)?;
        let balance_type: BalanceType = input.balance_type.into();

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_number: Set(input.account_number),
            name: Set(input.name),
            description: Set(input.description),
            account_type_id: Set(input.account_type_id),
            category_id: Set(input.category_id),
            balance_type: Set(balance_type),
            opening_balance: Set(input.opening_balance),
            // Until something is posted, the derived balance is the opening.
            current_balance: Set(input.opening_balance),
            is_active: Set(true),
            is_bank_account: Set(input.is_bank_account),
            is_cash_account: Set(input.is_cash_account),
            is_reconcilable: Set(input.is_reconcilable),
            allow_posting: Set(input.allow_posting),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(&self.db).await.map_err(db_err)
    }

    /// Lists accounts with optional filters, ordered by account number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<accounts::Model>, CoaError> {
        let mut query = accounts::Entity::find().order_by_asc(accounts::Column::AccountNumber);

        if let Some(type_id) = filter.account_type_id {
            query = query.filter(accounts::Column::AccountTypeId.eq(type_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(accounts::Column::CategoryId.eq(category_id));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }
        if let Some(is_bank) = filter.is_bank_account {
            query = query.filter(accounts::Column::IsBankAccount.eq(is_bank));
        }
        if let Some(is_cash) = filter.is_cash_account {
            query = query.filter(accounts::Column::IsCashAccount.eq(is_cash));
        }
        if let Some(is_reconcilable) = filter.is_reconcilable {
            query = query.filter(accounts::Column::IsReconcilable.eq(is_reconcilable));
        }

        query.all(&self.db).await.map_err(db_err)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `CoaError::AccountNotFound` if the account does not exist.
    pub async fn find_account(&self, id: Uuid) -> Result<accounts::Model, CoaError> {
        accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CoaError::AccountNotFound(id))
    }

    /// Updates an account with validation.
    ///
    /// Deactivation (`is_active = false`) is rejected while posted journal
    /// items reference the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found, the new category
    /// belongs to a different account type, or the deactivation guard
    /// fires.
    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, CoaError> {
        let account = self.find_account(id).await?;

        if let Some(category_id) = input.category_id {
            let category = account_categories::Entity::find_by_id(category_id)
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or(CoaError::CategoryNotFound(category_id))?;

            ensure_category_matches_type(
                ledgerly_shared::types::AccountTypeId::from_uuid(category.account_type_id),
                ledgerly_shared::types::AccountTypeId::from_uuid(account.account_type_id),
            )?;
        }

        if input.is_active == Some(false) && account.is_active {
            let posted = self.count_posted_items(id).await?;
            ensure_can_deactivate(posted)?;
        }

        let now = chrono::Utc::now().into();
        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(is_bank) = input.is_bank_account {
            active.is_bank_account = Set(is_bank);
        }
        if let Some(is_cash) = input.is_cash_account {
            active.is_cash_account = Set(is_cash);
        }
        if let Some(is_reconcilable) = input.is_reconcilable {
            active.is_reconcilable = Set(is_reconcilable);
        }
        if let Some(allow_posting) = input.allow_posting {
            active.allow_posting = Set(allow_posting);
        }
        if let Some(sort_order) = input.sort_order {
            active.sort_order = Set(sort_order);
        }
        active.updated_at = Set(now);

        active.update(&self.db).await.map_err(db_err)
    }

    /// Deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `CoaError::HasPostedActivity` when posted journal items
    /// reference the account.
    pub async fn deactivate_account(&self, id: Uuid) -> Result<(), CoaError> {
        let account = self.find_account(id).await?;

        let posted = self.count_posted_items(id).await?;
        ensure_can_deactivate(posted)?;

        let now = chrono::Utc::now().into();
        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(now);
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }

    /// Counts journal items on POSTED transactions referencing an account.
    async fn count_posted_items(&self, account_id: Uuid) -> Result<u64, CoaError> {
        journal_items::Entity::find()
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
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    /// Creates a new account category with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the (code, account type) pair already exists,
    /// the account type does not exist, or the parent belongs to a
    /// different account type.
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<account_categories::Model, CoaError> {
        let account_type = account_types::Entity::find_by_id(input.account_type_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if account_type.is_none() {
            return Err(CoaError::AccountTypeNotFound(input.account_type_id));
        }

        let existing = account_categories::Entity::find()
            .filter(account_categories::Column::Code.eq(&input.code))
            .filter(account_categories::Column::AccountTypeId.eq(input.account_type_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_some() {
            return Err(CoaError::DuplicateCategoryCode(input.code));
        }

        if let Some(parent_id) = input.parent_category_id {
            let parent = account_categories::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or(CoaError::CategoryNotFound(parent_id))?;

            ensure_parent_type_matches(
                ledgerly_shared::types::AccountTypeId::from_uuid(parent.account_type_id),
                ledgerly_shared::types::AccountTypeId::from_uuid(input.account_type_id),
            )?;
        }

        let now = chrono::Utc::now().into();
        let category = account_categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            account_type_id: Set(input.account_type_id),
            parent_category_id: Set(input.parent_category_id),
            sort_order: Set(input.sort_order),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        category.insert(&self.db).await.map_err(db_err)
    }

    /// Updates a category; reparenting is validated against the type and
    /// cycle invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found, the new parent
    /// belongs to a different account type, or the reparenting would make
    /// the category its own ancestor.
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<account_categories::Model, CoaError> {
        let category = account_categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CoaError::CategoryNotFound(id))?;

        if let Some(Some(parent_id)) = input.parent_category_id {
            let parent = account_categories::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or(CoaError::CategoryNotFound(parent_id))?;

            ensure_parent_type_matches(
                ledgerly_shared::types::AccountTypeId::from_uuid(parent.account_type_id),
                ledgerly_shared::types::AccountTypeId::from_uuid(category.account_type_id),
            )?;

            // Walk the current tree of this account type to reject cycles.
            let siblings = account_categories::Entity::find()
                .filter(account_categories::Column::AccountTypeId.eq(category.account_type_id))
                .all(&self.db)
                .await
                .map_err(db_err)?;

            let parents: std::collections::HashMap<_, _> = siblings
                .iter()
                .map(|c| {
                    (
                        ledgerly_shared::types::AccountCategoryId::from_uuid(c.id),
                        c.parent_category_id
                            .map(ledgerly_shared::types::AccountCategoryId::from_uuid),
                    )
                })
                .collect();

            if would_create_cycle(
                ledgerly_shared::types::AccountCategoryId::from_uuid(id),
                ledgerly_shared::types::AccountCategoryId::from_uuid(parent_id),
                &parents,
            ) {
                return Err(CoaError::CategoryCycle);
            }
        }

        let now = chrono::Utc::now().into();
        let mut active: account_categories::ActiveModel = category.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(parent) = input.parent_category_id {
            active.parent_category_id = Set(parent);
        }
        if let Some(sort_order) = input.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(now);

        active.update(&self.db).await.map_err(db_err)
    }

    /// Lists categories, optionally restricted to one account type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_categories(
        &self,
        account_type_id: Option<Uuid>,
    ) -> Result<Vec<account_categories::Model>, CoaError> {
        let mut query = account_categories::Entity::find()
            .order_by_asc(account_categories::Column::SortOrder)
            .order_by_asc(account_categories::Column::Name);

        if let Some(type_id) = account_type_id {
            query = query.filter(account_categories::Column::AccountTypeId.eq(type_id));
        }

        query.all(&self.db).await.map_err(db_err)
    }

    /// Builds the hierarchical tree rooted at a category: the category,
    /// its active subcategories (recursively), and its active accounts.
    ///
    /// # Errors
    ///
    /// Returns `CoaError::CategoryNotFound` if the root does not exist.
    pub async fn category_tree(&self, id: Uuid) -> Result<CategoryTree, CoaError> {
        let root = account_categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CoaError::CategoryNotFound(id))?;

        self.expand_category(root).await
    }

    /// Expands one category level; recursion is via boxed futures since
    /// the tree depth is data-dependent.
    fn expand_category(
        &self,
        category: account_categories::Model,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<CategoryTree, CoaError>> + Send + '_>,
    > {
        Box::pin(async move {
            let children = account_categories::Entity::find()
                .filter(account_categories::Column::ParentCategoryId.eq(category.id))
                .filter(account_categories::Column::IsActive.eq(true))
                .order_by_asc(account_categories::Column::SortOrder)
                .all(&self.db)
                .await
                .map_err(db_err)?;

            let mut subcategories = Vec::with_capacity(children.len());
            for child in children {
                subcategories.push(self.expand_category(child).await?);
            }

            let account_rows = accounts::Entity::find()
                .filter(accounts::Column::CategoryId.eq(category.id))
                .filter(accounts::Column::IsActive.eq(true))
                .order_by_asc(accounts::Column::AccountNumber)
                .all(&self.db)
                .await
                .map_err(db_err)?;

            Ok(CategoryTree {
                category,
                subcategories,
                accounts: account_rows,
            })
        })
    }
}
