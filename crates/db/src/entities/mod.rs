//! `SeaORM` entity definitions.

pub mod account_categories;
pub mod account_types;
pub mod accounts;
pub mod audit_log;
pub mod journal_entries;
pub mod journal_items;
pub mod reports;
pub mod sea_orm_active_enums;
pub mod transaction_types;
pub mod transactions;
