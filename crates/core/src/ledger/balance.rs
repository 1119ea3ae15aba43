//! Account balance delta calculations.
//!
//! Balances are maintained incrementally: posting applies one signed delta
//! per account, voiding applies the exact inverse. These functions are the
//! only arithmetic the posting protocol performs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ledgerly_shared::types::AccountId;

use super::types::BalanceType;

/// Calculates the balance change a journal item applies to an account.
///
/// The item side matching the account's balance type increases the balance;
/// the opposite side decreases it:
/// - Debit-normal: balance += debit - credit
/// - Credit-normal: balance += credit - debit
#[must_use]
pub fn balance_delta(balance_type: BalanceType, debit: Decimal, credit: Decimal) -> Decimal {
    match balance_type {
        BalanceType::Debit => debit - credit,
        BalanceType::Credit => credit - debit,
    }
}

/// One account's aggregate balance change for a posting plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDelta {
    /// The account to adjust.
    pub account_id: AccountId,
    /// Signed change to apply to the account's current balance.
    pub delta: Decimal,
}

/// Running balance for a general ledger line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Balance before the line.
    pub previous: Decimal,
    /// Balance after the line.
    pub current: Decimal,
}

impl RunningBalance {
    /// Opens a running balance sequence at the given opening balance.
    #[must_use]
    pub const fn opening(balance: Decimal) -> Self {
        Self {
            previous: balance,
            current: balance,
        }
    }

    /// Advances the running balance by one signed delta.
    #[must_use]
    pub fn advance(&self, delta: Decimal) -> Self {
        Self {
            previous: self.current,
            current: self.current + delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_debit_normal_delta() {
        // Debit increases, credit decreases.
        assert_eq!(balance_delta(BalanceType::Debit, dec!(100), dec!(0)), dec!(100));
        assert_eq!(balance_delta(BalanceType::Debit, dec!(0), dec!(40)), dec!(-40));
        assert_eq!(balance_delta(BalanceType::Debit, dec!(100), dec!(30)), dec!(70));
    }

    #[test]
    fn test_credit_normal_delta() {
        // Credit increases, debit decreases.
        assert_eq!(balance_delta(BalanceType::Credit, dec!(0), dec!(100)), dec!(100));
        assert_eq!(balance_delta(BalanceType::Credit, dec!(40), dec!(0)), dec!(-40));
        assert_eq!(balance_delta(BalanceType::Credit, dec!(30), dec!(100)), dec!(70));
    }

    #[test]
    fn test_running_balance_chain() {
        let opening = RunningBalance::opening(dec!(100));
        let after = opening.advance(dec!(50));
        assert_eq!(after.previous, dec!(100));
        assert_eq!(after.current, dec!(150));

        let after2 = after.advance(dec!(-30));
        assert_eq!(after2.previous, dec!(150));
        assert_eq!(after2.current, dec!(120));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn balance_type_strategy() -> impl Strategy<Value = BalanceType> {
        prop_oneof![Just(BalanceType::Debit), Just(BalanceType::Credit)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The side matching the balance type always increases the balance.
        #[test]
        fn prop_matching_side_increases(
            balance_type in balance_type_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assume!(amount > Decimal::ZERO);

            let (debit, credit) = match balance_type {
                BalanceType::Debit => (amount, Decimal::ZERO),
                BalanceType::Credit => (Decimal::ZERO, amount),
            };

            prop_assert_eq!(balance_delta(balance_type, debit, credit), amount);
        }

        /// The opposite side always decreases the balance.
        #[test]
        fn prop_opposite_side_decreases(
            balance_type in balance_type_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assume!(amount > Decimal::ZERO);

            let (debit, credit) = match balance_type {
                BalanceType::Debit => (Decimal::ZERO, amount),
                BalanceType::Credit => (amount, Decimal::ZERO),
            };

            prop_assert_eq!(balance_delta(balance_type, debit, credit), -amount);
        }

        /// Swapping the debit and credit sides negates the delta. This is
        /// the arithmetic fact the void operation relies on.
        #[test]
        fn prop_swapped_sides_negate(
            balance_type in balance_type_strategy(),
            debit in amount_strategy(),
            credit in amount_strategy(),
        ) {
            let forward = balance_delta(balance_type, debit, credit);
            let reversed = balance_delta(balance_type, credit, debit);
            prop_assert_eq!(forward, -reversed);
        }

        /// A sequence of running balance advances ends at opening + sum.
        #[test]
        fn prop_running_balance_sums(
            opening in amount_strategy(),
            deltas in prop::collection::vec((-100_000i64..100_000i64).prop_map(|n| Decimal::new(n, 2)), 1..20),
        ) {
            let mut rb = RunningBalance::opening(opening);
            for delta in &deltas {
                rb = rb.advance(*delta);
            }
            let expected: Decimal = opening + deltas.iter().copied().sum::<Decimal>();
            prop_assert_eq!(rb.current, expected);
        }
    }
}
