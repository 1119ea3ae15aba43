//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Pure business rules stay in `ledgerly-core`; repositories
//! load state, delegate decisions to core, and persist outcomes.

pub mod account;
pub mod audit;
pub mod posting;
pub mod report;
pub mod transaction;

pub use account::{
    AccountFilter, AccountRepository, CreateAccountInput, CreateCategoryInput, UpdateAccountInput,
    UpdateCategoryInput,
};
pub use audit::AuditLogRepository;
pub use posting::PostingRepository;
pub use report::{CreateReportInput, ReportRepository};
pub use transaction::{
    CreateJournalEntryInput, CreateJournalItemInput, CreateTransactionInput, TransactionFilter,
    TransactionRepository, TransactionWithEntries,
};
