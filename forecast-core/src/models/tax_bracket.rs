use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// A single marginal bracket: income up to `upper_threshold` is taxed at `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub rate: Decimal,
    pub upper_threshold: Decimal,
}

impl TaxBracket {
    pub fn new(
        rate: Decimal,
        upper_threshold: Decimal,
    ) -> Self {
        Self {
            rate,
            upper_threshold,
        }
    }
}

/// A progressive tax schedule.
///
/// Brackets are ordered by strictly increasing `upper_threshold`. Taxable
/// income above the last threshold is taxed at `excess_rate`, and the
/// `exemption` is subtracted from gross income before any bracket applies.
///
/// The fields are private so that every schedule in circulation has passed
/// [`TaxBracketSchedule::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxBracketSchedule {
    brackets: Vec<TaxBracket>,
    excess_rate: Decimal,
    exemption: Decimal,
}

impl TaxBracketSchedule {
    /// Builds a schedule after checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::InvalidArgument`] if:
    /// - a rate (including the excess rate) lies outside `[0, 1]`
    /// - thresholds are not strictly increasing, or the first one is not positive
    /// - the exemption is negative
    pub fn new(
        brackets: Vec<TaxBracket>,
        excess_rate: Decimal,
        exemption: Decimal,
    ) -> Result<Self, CalculationError> {
        if exemption < Decimal::ZERO {
            return Err(CalculationError::invalid(format!(
                "exemption must be non-negative, got {exemption}"
            )));
        }
        check_rate(excess_rate)?;

        let mut prev_threshold = Decimal::ZERO;
        for bracket in &brackets {
            check_rate(bracket.rate)?;
            if bracket.upper_threshold <= prev_threshold {
                return Err(CalculationError::invalid(format!(
                    "bracket thresholds must be strictly increasing, got {} after {}",
                    bracket.upper_threshold, prev_threshold
                )));
            }
            prev_threshold = bracket.upper_threshold;
        }

        Ok(Self {
            brackets,
            excess_rate,
            exemption,
        })
    }

    /// Canadian federal schedule (2024 thresholds).
    pub fn canada_federal() -> Self {
        Self {
            brackets: vec![
                TaxBracket::new(dec!(0.15), dec!(55867)),
                TaxBracket::new(dec!(0.205), dec!(111733)),
                TaxBracket::new(dec!(0.26), dec!(173205)),
                TaxBracket::new(dec!(0.29), dec!(246752)),
            ],
            excess_rate: dec!(0.33),
            exemption: dec!(15705),
        }
    }

    /// Ontario provincial schedule (2024 thresholds).
    pub fn ontario() -> Self {
        Self {
            brackets: vec![
                TaxBracket::new(dec!(0.0505), dec!(51446)),
                TaxBracket::new(dec!(0.0915), dec!(102894)),
                TaxBracket::new(dec!(0.1116), dec!(150000)),
                TaxBracket::new(dec!(0.1216), dec!(220000)),
            ],
            excess_rate: dec!(0.1316),
            exemption: dec!(12399),
        }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn excess_rate(&self) -> Decimal {
        self.excess_rate
    }

    pub fn exemption(&self) -> Decimal {
        self.exemption
    }

    /// Tax owed on taxable income sitting exactly at the `index`-th threshold.
    ///
    /// This is the sum of every full bracket up to and including `index`,
    /// i.e. the base tax a bracket-table lookup would start from. Returns
    /// `None` when `index` is out of range.
    pub fn cumulative_tax(
        &self,
        index: usize,
    ) -> Option<Decimal> {
        if index >= self.brackets.len() {
            return None;
        }

        let mut tax = Decimal::ZERO;
        let mut prev_threshold = Decimal::ZERO;
        for bracket in &self.brackets[..=index] {
            tax += (bracket.upper_threshold - prev_threshold) * bracket.rate;
            prev_threshold = bracket.upper_threshold;
        }
        Some(tax)
    }
}

fn check_rate(rate: Decimal) -> Result<(), CalculationError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(CalculationError::invalid(format!(
            "tax rate must be between 0 and 1, got {rate}"
        )));
    }
    Ok(())
}
