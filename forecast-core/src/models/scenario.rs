use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Everything the scenario projector needs, collected up front.
///
/// Percentages are whole-number percents (`5` means 5%). Missing fields in a
/// config file fall back to [`ScenarioInputs::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInputs {
    // Economic parameters
    pub home_appreciation_pct: Decimal,
    pub home_depreciation_pct: Decimal,
    pub horizon_years: u32,

    // Home
    pub mortgage_principal: Decimal,
    pub mortgage_rate_pct: Decimal,
    pub amortization_months: u32,
    pub sell_price: Decimal,
    pub purchase_price: Decimal,
    pub realtor_fee_pct: Decimal,
    pub first_time_buyer_discount: Decimal,

    // Capital growth
    pub monthly_rental_income: Decimal,
    pub starting_capital: Decimal,
    pub gic_rate_pct: Decimal,
    pub rrsp_contribution: Decimal,
    pub annual_income: Decimal,
}

impl ScenarioInputs {
    pub fn horizon_months(&self) -> u32 {
        self.horizon_years.saturating_mul(12)
    }
}

impl Default for ScenarioInputs {
    fn default() -> Self {
        Self {
            home_appreciation_pct: dec!(0),
            home_depreciation_pct: dec!(0),
            horizon_years: 5,
            mortgage_principal: dec!(100000),
            mortgage_rate_pct: dec!(3),
            amortization_months: 22 * 12,
            sell_price: dec!(200000),
            purchase_price: dec!(150000),
            realtor_fee_pct: dec!(5),
            first_time_buyer_discount: dec!(5000),
            monthly_rental_income: dec!(2000),
            starting_capital: dec!(50000),
            gic_rate_pct: dec!(2),
            rrsp_contribution: dec!(5000),
            annual_income: dec!(100000),
        }
    }
}
