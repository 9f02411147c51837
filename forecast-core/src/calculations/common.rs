//! Common utility functions for the financial calculations.
//!
//! This module provides shared functionality used across the tax, growth and
//! amortization modules: rounding, clamping, rate conversion and checked
//! exponentiation.

use rust_decimal::{Decimal, MathematicalOps};

use crate::error::CalculationError;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forecast_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forecast_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Converts a nominal annual rate in percent into a monthly fraction.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forecast_core::calculations::common::monthly_rate;
///
/// assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
/// ```
pub fn monthly_rate(annual_rate_pct: Decimal) -> Decimal {
    annual_rate_pct / Decimal::from(1200)
}

/// `base^exp` for a whole-number exponent, failing instead of overflowing.
pub(crate) fn checked_pow(
    base: Decimal,
    exp: u32,
    what: &'static str,
) -> Result<Decimal, CalculationError> {
    base.checked_powi(i64::from(exp))
        .ok_or(CalculationError::Overflow(what))
}

/// Growth factor `(1 + rate_pct/100)^(months/12)` for an annually quoted rate.
///
/// The exponent is fractional, so the base must be positive.
pub(crate) fn annual_growth_factor(
    annual_rate_pct: Decimal,
    months: u32,
) -> Result<Decimal, CalculationError> {
    let base = Decimal::ONE + annual_rate_pct / Decimal::ONE_HUNDRED;
    if base <= Decimal::ZERO {
        return Err(CalculationError::invalid(format!(
            "annual growth rate must be above -100%, got {annual_rate_pct}%"
        )));
    }
    if annual_rate_pct.is_zero() {
        return Ok(Decimal::ONE);
    }
    if months % 12 == 0 {
        return checked_pow(base, months / 12, "annual growth factor");
    }
    let years = Decimal::from(months) / Decimal::from(12);
    base.checked_powd(years)
        .ok_or(CalculationError::Overflow("annual growth factor"))
}
