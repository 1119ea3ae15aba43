//! Monetary amount helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal`, stored at 2 decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to the ledger scale using banker's rounding.
///
/// Round-half-even keeps repeated debit/credit sums from drifting, which the
/// trial-balance equality check depends on.
#[must_use]
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Returns true if the amount is non-negative and within the ledger scale.
#[must_use]
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount.scale() <= MONEY_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_amount_half_even() {
        // Midpoints round to the even neighbour.
        assert_eq!(round_amount(dec!(2.345)), dec!(2.34));
        assert_eq!(round_amount(dec!(2.355)), dec!(2.36));
        assert_eq!(round_amount(dec!(2.3449)), dec!(2.34));
    }

    #[test]
    fn test_round_amount_already_scaled() {
        assert_eq!(round_amount(dec!(100.00)), dec!(100.00));
        assert_eq!(round_amount(dec!(0)), dec!(0));
    }

    #[test]
    fn test_is_valid_amount() {
        assert!(is_valid_amount(dec!(0)));
        assert!(is_valid_amount(dec!(10.25)));
        assert!(!is_valid_amount(dec!(-0.01)));
        assert!(!is_valid_amount(dec!(1.005)));
    }
}
