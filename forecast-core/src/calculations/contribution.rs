//! Rolling monthly contributions compounded on a starting balance.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::monthly_rate;
use crate::error::CalculationError;

/// Month-end balances of a compounding contribution stream.
///
/// Each month the running balance earns `annual_rate_pct / 1200` and then
/// receives `monthly_contribution`. The returned vector holds the balance at
/// the end of months `1..=months`; the starting value itself is not included.
/// A zero rate degrades to linear accumulation and negative rates shrink the
/// balance.
///
/// # Errors
///
/// - [`CalculationError::InvalidArgument`] if `months` is zero
/// - [`CalculationError::Overflow`] if the balance leaves the decimal range
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use forecast_core::calculations::project;
///
/// let values = project(dec!(0), dec!(100), dec!(0), 3).unwrap();
/// assert_eq!(values, vec![dec!(100), dec!(200), dec!(300)]);
/// ```
pub fn project(
    initial: Decimal,
    monthly_contribution: Decimal,
    annual_rate_pct: Decimal,
    months: u32,
) -> Result<Vec<Decimal>, CalculationError> {
    if months == 0 {
        return Err(CalculationError::invalid(
            "projection horizon must be at least one month",
        ));
    }

    let growth = Decimal::ONE + monthly_rate(annual_rate_pct);
    let mut values = Vec::with_capacity(months as usize);
    let mut value = initial;
    for _ in 0..months {
        value = value
            .checked_mul(growth)
            .and_then(|v| v.checked_add(monthly_contribution))
            .ok_or(CalculationError::Overflow("contribution projection"))?;
        values.push(value);
    }

    debug!(months, final_value = %value, "projected rolling contributions");
    Ok(values)
}
