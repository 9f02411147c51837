//! Progressive income tax over one or two bracket schedules.
//!
//! A schedule is applied by subtracting its exemption from gross income,
//! clamping the result at zero, and walking the brackets in ascending
//! threshold order. Income above the last threshold is taxed at the
//! schedule's excess rate.
//!
//! [`IncomeTaxCalculator`] layers two independent schedules (for example
//! federal and provincial) and sums them. Each schedule applies its own
//! exemption; credits, surtaxes and interactions between the two levels are
//! not modelled.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use forecast_core::calculations::{IncomeTaxCalculator, compute_tax};
//! use forecast_core::TaxBracketSchedule;
//!
//! let federal = TaxBracketSchedule::canada_federal();
//! assert_eq!(compute_tax(&federal, dec!(100000)), dec!(14207.79));
//!
//! let calculator = IncomeTaxCalculator::default();
//! let total = calculator.compute_total_tax(dec!(100000));
//! assert_eq!(total.total, dec!(20113.9955));
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::TaxBracketSchedule;
use crate::calculations::common::max;

/// Portion of an income that fell into one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BracketSlice {
    pub lower: Decimal,
    /// `None` for the open-ended excess bracket.
    pub upper: Option<Decimal>,
    pub rate: Decimal,
    pub taxed_amount: Decimal,
    pub tax: Decimal,
}

/// Income left after the schedule's exemption, never negative.
pub fn taxable_income(
    schedule: &TaxBracketSchedule,
    gross_income: Decimal,
) -> Decimal {
    gross_income
        .checked_sub(schedule.exemption())
        .map_or(Decimal::ZERO, |taxable| max(taxable, Decimal::ZERO))
}

/// Tax owed under a single schedule.
///
/// Negative income, or income below the exemption, yields zero.
pub fn compute_tax(
    schedule: &TaxBracketSchedule,
    gross_income: Decimal,
) -> Decimal {
    let taxable = taxable_income(schedule, gross_income);

    let mut tax = Decimal::ZERO;
    let mut prev_threshold = Decimal::ZERO;
    for bracket in schedule.brackets() {
        if taxable <= bracket.upper_threshold {
            tax += (taxable - prev_threshold) * bracket.rate;
            return tax;
        }
        tax += (bracket.upper_threshold - prev_threshold) * bracket.rate;
        prev_threshold = bracket.upper_threshold;
    }

    tax + (taxable - prev_threshold) * schedule.excess_rate()
}

/// Splits the tax owed under `schedule` into one slice per bracket touched.
///
/// The slice taxes sum to [`compute_tax`]. Brackets above the taxable income
/// are omitted; an income of zero produces an empty breakdown.
pub fn bracket_breakdown(
    schedule: &TaxBracketSchedule,
    gross_income: Decimal,
) -> Vec<BracketSlice> {
    let taxable = taxable_income(schedule, gross_income);
    let mut slices = Vec::new();
    if taxable.is_zero() {
        return slices;
    }

    let mut prev_threshold = Decimal::ZERO;
    for bracket in schedule.brackets() {
        let top = taxable.min(bracket.upper_threshold);
        let taxed_amount = top - prev_threshold;
        slices.push(BracketSlice {
            lower: prev_threshold,
            upper: Some(bracket.upper_threshold),
            rate: bracket.rate,
            taxed_amount,
            tax: taxed_amount * bracket.rate,
        });
        if taxable <= bracket.upper_threshold {
            return slices;
        }
        prev_threshold = bracket.upper_threshold;
    }

    let taxed_amount = taxable - prev_threshold;
    slices.push(BracketSlice {
        lower: prev_threshold,
        upper: None,
        rate: schedule.excess_rate(),
        taxed_amount,
        tax: taxed_amount * schedule.excess_rate(),
    });
    slices
}

/// Rate applied to the next dollar of gross income.
pub fn marginal_rate(
    schedule: &TaxBracketSchedule,
    gross_income: Decimal,
) -> Decimal {
    if gross_income < schedule.exemption() {
        return Decimal::ZERO;
    }
    let taxable = taxable_income(schedule, gross_income);
    schedule
        .brackets()
        .iter()
        .find(|b| taxable < b.upper_threshold)
        .map_or(schedule.excess_rate(), |b| b.rate)
}

/// Tax owed under both schedules of an [`IncomeTaxCalculator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalTax {
    pub primary: Decimal,
    pub secondary: Decimal,
    pub total: Decimal,
}

/// Sums the tax of two independently parameterized schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeTaxCalculator {
    primary: TaxBracketSchedule,
    secondary: TaxBracketSchedule,
}

impl IncomeTaxCalculator {
    pub fn new(
        primary: TaxBracketSchedule,
        secondary: TaxBracketSchedule,
    ) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &TaxBracketSchedule {
        &self.primary
    }

    pub fn secondary(&self) -> &TaxBracketSchedule {
        &self.secondary
    }

    /// Tax under each schedule and their sum.
    pub fn compute_total_tax(
        &self,
        income: Decimal,
    ) -> TotalTax {
        let primary = compute_tax(&self.primary, income);
        let secondary = compute_tax(&self.secondary, income);
        let total = primary.saturating_add(secondary);
        debug!(%income, %primary, %secondary, %total, "computed total tax");

        TotalTax {
            primary,
            secondary,
            total,
        }
    }

    /// Combined marginal rate of both schedules.
    pub fn marginal_rate(
        &self,
        income: Decimal,
    ) -> Decimal {
        marginal_rate(&self.primary, income) + marginal_rate(&self.secondary, income)
    }
}

impl Default for IncomeTaxCalculator {
    /// Canadian federal plus Ontario provincial tax.
    fn default() -> Self {
        Self::new(
            TaxBracketSchedule::canada_federal(),
            TaxBracketSchedule::ontario(),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::TaxBracket;

    fn simple_schedule() -> TaxBracketSchedule {
        TaxBracketSchedule::new(
            vec![
                TaxBracket::new(dec!(0.10), dec!(10000)),
                TaxBracket::new(dec!(0.20), dec!(20000)),
            ],
            dec!(0.30),
            dec!(1000),
        )
        .unwrap()
    }

    // =========================================================================
    // compute_tax tests
    // =========================================================================

    #[test]
    fn compute_tax_zero_income_is_zero() {
        assert_eq!(compute_tax(&simple_schedule(), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn compute_tax_negative_income_is_zero() {
        assert_eq!(compute_tax(&simple_schedule(), dec!(-5000)), Decimal::ZERO);
    }

    #[test]
    fn compute_tax_most_negative_income_is_zero() {
        assert_eq!(
            compute_tax(&TaxBracketSchedule::canada_federal(), Decimal::MIN),
            Decimal::ZERO
        );
        assert!(bracket_breakdown(&TaxBracketSchedule::ontario(), Decimal::MIN).is_empty());
    }

    #[test]
    fn compute_tax_below_exemption_is_zero() {
        assert_eq!(compute_tax(&simple_schedule(), dec!(500)), Decimal::ZERO);
    }

    #[test]
    fn compute_tax_within_first_bracket() {
        assert_eq!(compute_tax(&simple_schedule(), dec!(6000)), dec!(500));
    }

    #[test]
    fn compute_tax_exactly_at_first_threshold() {
        assert_eq!(compute_tax(&simple_schedule(), dec!(11000)), dec!(1000));
    }

    #[test]
    fn compute_tax_within_second_bracket() {
        assert_eq!(compute_tax(&simple_schedule(), dec!(16000)), dec!(2000));
    }

    #[test]
    fn compute_tax_above_last_threshold_uses_excess_rate() {
        assert_eq!(compute_tax(&simple_schedule(), dec!(31000)), dec!(6000));
    }

    #[test]
    fn compute_tax_with_no_brackets_taxes_everything_at_excess_rate() {
        let flat = TaxBracketSchedule::new(vec![], dec!(0.25), dec!(0)).unwrap();

        assert_eq!(compute_tax(&flat, dec!(1000)), dec!(250));
    }

    #[test]
    fn compute_tax_federal_reference_income() {
        let federal = TaxBracketSchedule::canada_federal();

        // 55867 * 0.15 + (84295 - 55867) * 0.205
        assert_eq!(compute_tax(&federal, dec!(100000)), dec!(14207.79));
    }

    #[test]
    fn compute_tax_ontario_reference_income() {
        let ontario = TaxBracketSchedule::ontario();

        // 51446 * 0.0505 + (87601 - 51446) * 0.0915
        assert_eq!(compute_tax(&ontario, dec!(100000)), dec!(5906.2055));
    }

    #[test]
    fn compute_tax_at_each_threshold_matches_cumulative_tax() {
        for schedule in [
            TaxBracketSchedule::canada_federal(),
            TaxBracketSchedule::ontario(),
            simple_schedule(),
        ] {
            for (index, bracket) in schedule.brackets().iter().enumerate() {
                let income = bracket.upper_threshold + schedule.exemption();
                let expected = schedule.cumulative_tax(index).unwrap();
                let slices_total: Decimal = bracket_breakdown(&schedule, income)
                    .iter()
                    .map(|s| s.tax)
                    .sum();

                assert!((compute_tax(&schedule, income) - expected).abs() < dec!(0.000001));
                assert!((slices_total - expected).abs() < dec!(0.000001));
            }
        }
    }

    // =========================================================================
    // bracket_breakdown tests
    // =========================================================================

    #[test]
    fn bracket_breakdown_empty_for_zero_taxable_income() {
        assert!(bracket_breakdown(&simple_schedule(), dec!(1000)).is_empty());
    }

    #[test]
    fn bracket_breakdown_stops_at_partial_bracket() {
        let slices = bracket_breakdown(&simple_schedule(), dec!(16000));

        assert_eq!(
            slices,
            vec![
                BracketSlice {
                    lower: dec!(0),
                    upper: Some(dec!(10000)),
                    rate: dec!(0.10),
                    taxed_amount: dec!(10000),
                    tax: dec!(1000),
                },
                BracketSlice {
                    lower: dec!(10000),
                    upper: Some(dec!(20000)),
                    rate: dec!(0.20),
                    taxed_amount: dec!(5000),
                    tax: dec!(1000),
                },
            ]
        );
    }

    #[test]
    fn bracket_breakdown_includes_excess_slice() {
        let slices = bracket_breakdown(&simple_schedule(), dec!(31000));

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[2].upper, None);
        assert_eq!(slices[2].taxed_amount, dec!(10000));
        assert_eq!(slices[2].tax, dec!(3000));
    }

    // =========================================================================
    // marginal_rate tests
    // =========================================================================

    #[test]
    fn marginal_rate_below_exemption_is_zero() {
        assert_eq!(marginal_rate(&simple_schedule(), dec!(999)), Decimal::ZERO);
    }

    #[test]
    fn marginal_rate_at_threshold_is_next_bracket() {
        assert_eq!(marginal_rate(&simple_schedule(), dec!(11000)), dec!(0.20));
    }

    #[test]
    fn marginal_rate_above_last_threshold_is_excess() {
        assert_eq!(marginal_rate(&simple_schedule(), dec!(50000)), dec!(0.30));
    }

    // =========================================================================
    // IncomeTaxCalculator tests
    // =========================================================================

    #[test]
    fn compute_total_tax_sums_both_schedules() {
        let calculator = IncomeTaxCalculator::default();

        let total = calculator.compute_total_tax(dec!(100000));

        assert_eq!(
            total,
            TotalTax {
                primary: dec!(14207.79),
                secondary: dec!(5906.2055),
                total: dec!(20113.9955),
            }
        );
    }

    #[test]
    fn compute_total_tax_applies_each_exemption_separately() {
        let calculator = IncomeTaxCalculator::default();

        // Above the Ontario exemption (12399) but below the federal one (15705).
        let total = calculator.compute_total_tax(dec!(14000));

        assert_eq!(total.primary, Decimal::ZERO);
        assert_eq!(total.secondary, dec!(80.8505)); // 1601 * 0.0505
    }

    #[test]
    fn combined_marginal_rate_at_reference_income() {
        let calculator = IncomeTaxCalculator::default();

        assert_eq!(calculator.marginal_rate(dec!(100000)), dec!(0.2965));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_compute_tax_is_non_decreasing_in_income(
            lower_cents in 0i64..50_000_000,
            delta_cents in 0i64..20_000_000
        ) {
            let calculator = IncomeTaxCalculator::default();
            let lower = Decimal::new(lower_cents, 2);
            let higher = Decimal::new(lower_cents + delta_cents, 2);

            prop_assert!(
                compute_tax(calculator.primary(), lower) <= compute_tax(calculator.primary(), higher)
            );
            prop_assert!(
                calculator.compute_total_tax(lower).total
                    <= calculator.compute_total_tax(higher).total
            );
        }

        #[test]
        fn prop_breakdown_matches_compute_tax(income_cents in -1_000_000i64..60_000_000) {
            let schedule = TaxBracketSchedule::canada_federal();
            let income = Decimal::new(income_cents, 2);
            let from_slices: Decimal = bracket_breakdown(&schedule, income)
                .iter()
                .map(|s| s.tax)
                .sum();

            prop_assert_eq!(from_slices, compute_tax(&schedule, income));
        }
    }
}
