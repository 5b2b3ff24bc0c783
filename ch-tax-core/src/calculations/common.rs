//! Shared helpers for the calculation engines.
//!
//! Rounding policy: bracket resolution works on exact decimals; every amount
//! an engine reports is rounded once with [`round_half_up`], and totals are
//! sums of reported amounts.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use ch_tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(16.245)), dec!(16.25));
/// assert_eq!(round_half_up(dec!(-16.245)), dec!(-16.25));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps negative amounts to zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use ch_tax_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(-5)), dec!(0));
/// assert_eq!(non_negative(dec!(5)), dec!(5));
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// `amount / base × 100`, rounded to two places; zero when `base` is not
/// positive.
pub fn effective_rate(
    amount: Decimal,
    base: Decimal,
) -> Decimal {
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_up(amount / base * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    // =========================================================================
    // non_negative tests
    // =========================================================================

    #[test]
    fn non_negative_clamps_negative_values() {
        assert_eq!(non_negative(dec!(-0.01)), dec!(0));
    }

    #[test]
    fn non_negative_keeps_positive_values() {
        assert_eq!(non_negative(dec!(42.50)), dec!(42.50));
    }

    // =========================================================================
    // effective_rate tests
    // =========================================================================

    #[test]
    fn effective_rate_is_percentage_of_base() {
        assert_eq!(effective_rate(dec!(15000), dec!(100000)), dec!(15.00));
    }

    #[test]
    fn effective_rate_rounds_to_two_places() {
        assert_eq!(effective_rate(dec!(1), dec!(3)), dec!(33.33));
    }

    #[test]
    fn effective_rate_is_zero_for_zero_base() {
        assert_eq!(effective_rate(dec!(500), dec!(0)), dec!(0));
    }

    #[test]
    fn effective_rate_is_zero_for_negative_base() {
        assert_eq!(effective_rate(dec!(500), dec!(-100)), dec!(0));
    }
}
