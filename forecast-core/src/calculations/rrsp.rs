//! Tax refund estimate for a deductible retirement (RRSP) contribution.
//!
//! The refund is the drop in total tax when the contribution is deducted
//! from income:
//!
//! ```text
//! tax_saved = total_tax(income) - total_tax(max(income - contribution, 0))
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::max;
use crate::calculations::tax::IncomeTaxCalculator;

/// Estimates the tax saved by deducting a contribution from income.
#[derive(Debug, Clone, Copy)]
pub struct RrspReturnEstimator<'a> {
    calculator: &'a IncomeTaxCalculator,
}

impl<'a> RrspReturnEstimator<'a> {
    pub fn new(calculator: &'a IncomeTaxCalculator) -> Self {
        Self { calculator }
    }

    /// Tax saved by contributing `contribution` out of `income`.
    ///
    /// Zero when the contribution is zero or negative. A contribution larger
    /// than the income saves exactly the tax on the whole income.
    pub fn tax_saved(
        &self,
        income: Decimal,
        contribution: Decimal,
    ) -> Decimal {
        if contribution <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let initial_tax = self.calculator.compute_total_tax(income).total;
        let reduced_income = income
            .checked_sub(contribution)
            .map_or(Decimal::ZERO, |reduced| max(reduced, Decimal::ZERO));
        let reduced_tax = self.calculator.compute_total_tax(reduced_income).total;
        let saved = initial_tax - reduced_tax;
        debug!(%income, %contribution, %saved, "estimated contribution tax return");

        saved
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn tax_saved_zero_contribution_is_zero() {
        let calculator = IncomeTaxCalculator::default();
        let estimator = RrspReturnEstimator::new(&calculator);

        assert_eq!(estimator.tax_saved(dec!(100000), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn tax_saved_negative_contribution_is_zero() {
        let calculator = IncomeTaxCalculator::default();
        let estimator = RrspReturnEstimator::new(&calculator);

        assert_eq!(estimator.tax_saved(dec!(100000), dec!(-500)), Decimal::ZERO);
    }

    #[test]
    fn tax_saved_within_one_bracket_uses_marginal_rate() {
        let calculator = IncomeTaxCalculator::default();
        let estimator = RrspReturnEstimator::new(&calculator);

        // Both federal (20.5%) and Ontario (9.15%) stay in the same bracket.
        assert_eq!(estimator.tax_saved(dec!(100000), dec!(1000)), dec!(296.50));
    }

    #[test]
    fn tax_saved_caps_at_total_tax_when_contribution_exceeds_income() {
        let calculator = IncomeTaxCalculator::default();
        let estimator = RrspReturnEstimator::new(&calculator);

        let saved = estimator.tax_saved(dec!(50000), dec!(80000));

        assert_eq!(saved, calculator.compute_total_tax(dec!(50000)).total);
    }

    #[test]
    fn tax_saved_extreme_inputs_are_zero() {
        let calculator = IncomeTaxCalculator::default();
        let estimator = RrspReturnEstimator::new(&calculator);

        assert_eq!(estimator.tax_saved(Decimal::MIN, Decimal::MAX), Decimal::ZERO);
    }

    #[test]
    fn tax_saved_below_exemptions_is_zero() {
        let calculator = IncomeTaxCalculator::default();
        let estimator = RrspReturnEstimator::new(&calculator);

        assert_eq!(estimator.tax_saved(dec!(10000), dec!(2000)), Decimal::ZERO);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_tax_saved_is_non_negative_and_monotonic(
            income in 0i64..400_000,
            first_pct in 0i64..=100,
            second_pct in 0i64..=100
        ) {
            let calculator = IncomeTaxCalculator::default();
            let estimator = RrspReturnEstimator::new(&calculator);
            let income = Decimal::from(income);
            let (small_pct, large_pct) = if first_pct <= second_pct {
                (first_pct, second_pct)
            } else {
                (second_pct, first_pct)
            };
            let small = income * Decimal::from(small_pct) / Decimal::ONE_HUNDRED;
            let large = income * Decimal::from(large_pct) / Decimal::ONE_HUNDRED;

            let small_saved = estimator.tax_saved(income, small);
            let large_saved = estimator.tax_saved(income, large);

            prop_assert!(small_saved >= Decimal::ZERO);
            prop_assert!(small_saved <= large_saved);
        }
    }
}
