//! Pure validation functions for chart of accounts invariants.
//!
//! These run against data the repository has already loaded, so they can be
//! tested without a database.

use std::collections::{HashMap, HashSet};

use ledgerly_shared::types::{AccountCategoryId, AccountTypeId};

use super::error::CoaError;
use crate::ledger::BalanceType;

/// Checks that an account number is not already taken.
#[must_use]
pub fn is_account_number_unique<S: std::hash::BuildHasher>(
    existing_numbers: &HashSet<String, S>,
    number: &str,
) -> bool {
    !existing_numbers.contains(number)
}

/// Ensures a category belongs to the same account type as the account.
///
/// # Errors
///
/// Returns `CoaError::CategoryTypeMismatch` when the types differ.
pub fn ensure_category_matches_type(
    category_type: AccountTypeId,
    account_type: AccountTypeId,
) -> Result<(), CoaError> {
    if category_type == account_type {
        Ok(())
    } else {
        Err(CoaError::CategoryTypeMismatch)
    }
}

/// Ensures an account's balance type equals its type's normal balance.
///
/// # Errors
///
/// Returns `CoaError::BalanceTypeMismatch` when the sides differ.
pub fn ensure_balance_type_matches(
    normal_balance: BalanceType,
    balance_type: BalanceType,
) -> Result<(), CoaError> {
    if normal_balance == balance_type {
        Ok(())
    } else {
        Err(CoaError::BalanceTypeMismatch)
    }
}

/// Ensures a child category's account type equals its parent's.
///
/// # Errors
///
/// Returns `CoaError::ParentTypeMismatch` when the types differ.
pub fn ensure_parent_type_matches(
    parent_type: AccountTypeId,
    child_type: AccountTypeId,
) -> Result<(), CoaError> {
    if parent_type == child_type {
        Ok(())
    } else {
        Err(CoaError::ParentTypeMismatch)
    }
}

/// Ensures an account with posted activity is not deactivated.
///
/// # Errors
///
/// Returns `CoaError::HasPostedActivity` when posted items reference the
/// account.
pub fn ensure_can_deactivate(posted_item_count: u64) -> Result<(), CoaError> {
    if posted_item_count == 0 {
        Ok(())
    } else {
        Err(CoaError::HasPostedActivity(posted_item_count))
    }
}

/// Checks whether assigning `new_parent` to `category` would create a cycle
/// in the category tree.
///
/// `parents` maps each category to its current parent.
#[must_use]
pub fn would_create_cycle<S: std::hash::BuildHasher>(
    category: AccountCategoryId,
    new_parent: AccountCategoryId,
    parents: &HashMap<AccountCategoryId, Option<AccountCategoryId>, S>,
) -> bool {
    if category == new_parent {
        return true;
    }

    // Walk up from the proposed parent; hitting the category means the
    // category would become its own ancestor.
    let mut cursor = Some(new_parent);
    let mut hops = 0usize;
    while let Some(current) = cursor {
        if current == category {
            return true;
        }
        hops += 1;
        if hops > parents.len() {
            // Pre-existing corruption; treat as a cycle rather than loop.
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_number_uniqueness() {
        let existing: HashSet<String> = ["1000".to_string(), "2000".to_string()].into();
        assert!(!is_account_number_unique(&existing, "1000"));
        assert!(is_account_number_unique(&existing, "1010"));
    }

    #[test]
    fn test_category_type_match() {
        let t1 = AccountTypeId::new();
        let t2 = AccountTypeId::new();
        assert!(ensure_category_matches_type(t1, t1).is_ok());
        assert!(matches!(
            ensure_category_matches_type(t1, t2),
            Err(CoaError::CategoryTypeMismatch)
        ));
    }

    #[test]
    fn test_balance_type_match() {
        assert!(ensure_balance_type_matches(BalanceType::Debit, BalanceType::Debit).is_ok());
        assert!(matches!(
            ensure_balance_type_matches(BalanceType::Debit, BalanceType::Credit),
            Err(CoaError::BalanceTypeMismatch)
        ));
    }

    #[test]
    fn test_deactivation_guard() {
        assert!(ensure_can_deactivate(0).is_ok());
        assert!(matches!(
            ensure_can_deactivate(5),
            Err(CoaError::HasPostedActivity(5))
        ));
    }

    #[test]
    fn test_cycle_self_parent() {
        let c = AccountCategoryId::new();
        assert!(would_create_cycle(c, c, &HashMap::new()));
    }

    #[test]
    fn test_cycle_through_chain() {
        // a -> b -> c; reparenting a under c closes the loop.
        let a = AccountCategoryId::new();
        let b = AccountCategoryId::new();
        let c = AccountCategoryId::new();
        let parents = HashMap::from([(a, None), (b, Some(a)), (c, Some(b))]);

        assert!(would_create_cycle(a, c, &parents));
        // Sibling assignment is fine.
        assert!(!would_create_cycle(c, a, &parents));
    }

    #[test]
    fn test_no_cycle_for_unrelated() {
        let a = AccountCategoryId::new();
        let b = AccountCategoryId::new();
        let parents = HashMap::from([(a, None), (b, None)]);
        assert!(!would_create_cycle(a, b, &parents));
    }
}
