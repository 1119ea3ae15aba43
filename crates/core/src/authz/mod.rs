//! Role/operation authorization checks.
//!
//! A single capability check replaces permission-class hierarchies: every
//! mutating route asks `authorize(role, operation)` before doing anything,
//! and a deny short-circuits with no side effects.

use serde::{Deserialize, Serialize};

/// User roles recognized by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including cache management.
    Admin,
    /// Ledger and report access.
    Accountant,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Parses a role from its claims representation.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "accountant" => Some(Self::Accountant),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Returns the claims representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Accountant => "accountant",
            Self::Viewer => "viewer",
        }
    }
}

/// Named operations the API can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create/update/deactivate accounts, categories, and types.
    ManageAccounts,
    /// Create, edit, or delete pending transactions.
    CreateTransaction,
    /// Post a pending transaction to the ledger.
    PostTransaction,
    /// Void a posted transaction.
    VoidTransaction,
    /// Read financial reports.
    ViewReports,
    /// Create and run report generation requests.
    GenerateReports,
    /// Flush or inspect the cache.
    ManageCache,
}

/// Checks whether a role may perform an operation.
#[must_use]
pub fn authorize(role: Role, operation: Operation) -> bool {
    match role {
        Role::Admin => true,
        Role::Accountant => !matches!(operation, Operation::ManageCache),
        Role::Viewer => matches!(operation, Operation::ViewReports),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_can_do_everything() {
        for op in [
            Operation::ManageAccounts,
            Operation::CreateTransaction,
            Operation::PostTransaction,
            Operation::VoidTransaction,
            Operation::ViewReports,
            Operation::GenerateReports,
            Operation::ManageCache,
        ] {
            assert!(authorize(Role::Admin, op));
        }
    }

    #[test]
    fn test_accountant_cannot_manage_cache() {
        assert!(authorize(Role::Accountant, Operation::PostTransaction));
        assert!(authorize(Role::Accountant, Operation::VoidTransaction));
        assert!(authorize(Role::Accountant, Operation::GenerateReports));
        assert!(!authorize(Role::Accountant, Operation::ManageCache));
    }

    #[test]
    fn test_viewer_is_read_only() {
        assert!(authorize(Role::Viewer, Operation::ViewReports));
        for op in [
            Operation::ManageAccounts,
            Operation::CreateTransaction,
            Operation::PostTransaction,
            Operation::VoidTransaction,
            Operation::GenerateReports,
            Operation::ManageCache,
        ] {
            assert!(!authorize(Role::Viewer, op));
        }
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Accountant, Role::Viewer] {
            assert_eq!(Role::from_code(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_code("superuser"), None);
    }
}
