use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// How the amortizer treats a 0% loan, where the annuity formula divides by zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroRatePolicy {
    /// Repay the principal in equal instalments of `principal / term_months`.
    #[default]
    Linear,
    /// Fail with [`CalculationError::DivisionSingularity`].
    Reject,
}

impl ZeroRatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for ZeroRatePolicy {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZeroRatePolicy {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "reject" => Ok(Self::Reject),
            other => Err(CalculationError::invalid(format!(
                "unknown zero-rate policy '{other}' (expected 'linear' or 'reject')"
            ))),
        }
    }
}

/// Inputs to a remaining-balance calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationParameters {
    /// Amount borrowed. Must be positive.
    pub principal: Decimal,
    /// Nominal annual rate in percent (e.g. `3` for 3%). Must be non-negative.
    pub annual_interest_rate: Decimal,
    /// Total number of monthly payments. Must be positive.
    pub term_months: u32,
    /// Payments already made, `0..=term_months`.
    pub payments_made: u32,
}

impl AmortizationParameters {
    /// Checks every field against the ranges the annuity formula accepts.
    pub fn validate(&self) -> Result<(), CalculationError> {
        validate_loan(self.principal, self.annual_interest_rate, self.term_months)?;
        if self.payments_made > self.term_months {
            return Err(CalculationError::invalid(format!(
                "payments made ({}) exceeds the amortization term ({} months)",
                self.payments_made, self.term_months
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_loan(
    principal: Decimal,
    annual_interest_rate: Decimal,
    term_months: u32,
) -> Result<(), CalculationError> {
    if principal <= Decimal::ZERO {
        return Err(CalculationError::invalid(format!(
            "principal must be positive, got {principal}"
        )));
    }
    if annual_interest_rate < Decimal::ZERO {
        return Err(CalculationError::invalid(format!(
            "annual interest rate must be non-negative, got {annual_interest_rate}"
        )));
    }
    if term_months == 0 {
        return Err(CalculationError::invalid(
            "amortization term must be at least one month",
        ));
    }
    Ok(())
}
