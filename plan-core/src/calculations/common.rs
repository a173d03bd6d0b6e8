//! Common utility functions for plan calculations.
//!
//! Calculations keep full decimal precision; rounding only happens when a
//! figure is presented.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Floor applied to `1 - rate` so a tax rate can never divide by zero.
pub const MIN_DIVISOR: Decimal = dec!(0.01);

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// ```
/// use rust_decimal_macros::dec;
/// use plan_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    round_dp_half_up(value, 2)
}

/// Rounds to `dp` decimal places, midpoints away from zero.
pub fn round_dp_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `1 - rate`, or [`MIN_DIVISOR`] when the rate is 1 or more.
///
/// ```
/// use rust_decimal_macros::dec;
/// use plan_core::calculations::common::safe_divisor;
///
/// assert_eq!(safe_divisor(dec!(0.2)), dec!(0.8));
/// assert_eq!(safe_divisor(dec!(1.5)), dec!(0.01));
/// ```
pub fn safe_divisor(rate: Decimal) -> Decimal {
    if rate < Decimal::ONE {
        Decimal::ONE - rate
    } else {
        MIN_DIVISOR
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    #[test]
    fn round_half_up_handles_large_values() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    #[test]
    fn round_dp_half_up_to_whole_units() {
        assert_eq!(round_dp_half_up(dec!(349999.9999999), 0), dec!(350000));
        assert_eq!(round_dp_half_up(dec!(2.5), 0), dec!(3));
    }

    // =========================================================================
    // safe_divisor tests
    // =========================================================================

    #[test]
    fn safe_divisor_subtracts_rate() {
        assert_eq!(safe_divisor(dec!(0.06)), dec!(0.94));
        assert_eq!(safe_divisor(Decimal::ZERO), Decimal::ONE);
    }

    #[test]
    fn safe_divisor_floors_at_one_percent() {
        assert_eq!(safe_divisor(dec!(0.99)), dec!(0.01));
        assert_eq!(safe_divisor(Decimal::ONE), MIN_DIVISOR);
        assert_eq!(safe_divisor(dec!(3)), MIN_DIVISOR);
    }
}
