//! Common rounding helpers shared by the pricing and commission engines.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use portal_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to whole dollars, halves going up.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use portal_core::calculations::common::round_whole_dollars;
///
/// assert_eq!(round_whole_dollars(dec!(429.49)), dec!(429));
/// assert_eq!(round_whole_dollars(dec!(429.50)), dec!(430));
/// ```
pub fn round_whole_dollars(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds `value` up to the next multiple of `step`.
///
/// A value already on a multiple is returned unchanged. `step` must be
/// positive.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use portal_core::calculations::common::ceil_to_nearest;
///
/// assert_eq!(ceil_to_nearest(dec!(967.5), dec!(25)), dec!(975));
/// assert_eq!(ceil_to_nearest(dec!(950), dec!(25)), dec!(950));
/// ```
pub fn ceil_to_nearest(
    value: Decimal,
    step: Decimal,
) -> Decimal {
    (value / step).ceil() * step
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
