use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::contribution;
use crate::error::CalculationError;

/// A recurring deposit stream compounded monthly on top of a starting balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSeries {
    pub initial_value: Decimal,
    pub monthly_contribution: Decimal,
    /// Nominal annual rate in percent. May be zero or negative.
    pub annual_rate: Decimal,
    pub horizon_months: u32,
}

impl ContributionSeries {
    /// Month-end balances for months `1..=horizon_months`.
    ///
    /// See [`contribution::project`].
    pub fn project(&self) -> Result<Vec<Decimal>, CalculationError> {
        contribution::project(
            self.initial_value,
            self.monthly_contribution,
            self.annual_rate,
            self.horizon_months,
        )
    }
}
