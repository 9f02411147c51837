//! Month-by-month comparison of keeping a rental property versus selling it.
//!
//! The projection combines every other calculation in this crate:
//!
//! | Series            | Per month `m` (with `g(m) = (1 + gic/100)^(m/12)`)                    |
//! |-------------------|-----------------------------------------------------------------------|
//! | mortgage balance  | remaining balance after `min(m, amortization_months)` payments        |
//! | sell scenario     | `net_capital * g(m) + rrsp + rrsp * g(m)`                             |
//! | keep scenario     | rolling rent `[m]` + `capital + capital * g(m)` + yearly tax return    |
//!
//! where `net_capital = starting_capital + sell_price * (1 - fee) - principal`.
//! In the keep scenario the rent is reinvested as a rolling contribution and
//! the tax return on deducting a year of rent is credited every twelfth month.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ScenarioInputs;
use crate::calculations::common::{annual_growth_factor, checked_pow};
use crate::calculations::contribution::project;
use crate::calculations::mortgage::MortgageAmortizer;
use crate::calculations::rrsp::RrspReturnEstimator;
use crate::calculations::tax::IncomeTaxCalculator;
use crate::error::CalculationError;

/// One month of a [`ScenarioProjection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectionRow {
    pub month: u32,
    pub mortgage_balance: Decimal,
    pub sell_investment: Decimal,
    pub keep_capital: Decimal,
}

/// Headline figures derived from the projected series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectionSummary {
    pub monthly_payment: Decimal,
    /// Sell scenario value at the end of the horizon.
    pub final_investment_value: Decimal,
    /// Net proceeds of selling today, after fees, purchase price and discount.
    pub net_gain_selling_now: Decimal,
    /// Sale price after the horizon's appreciation and depreciation.
    pub projected_sale_price: Decimal,
    pub net_gain_selling_at_end: Decimal,
    /// Keep scenario value at the end of the horizon.
    pub final_keep_capital: Decimal,
    /// Tax saved each year by deducting twelve months of rent.
    pub yearly_tax_return: Decimal,
}

/// Series for months `1..=horizon_months`, all of equal length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioProjection {
    pub months: Vec<u32>,
    pub mortgage_balance: Vec<Decimal>,
    pub sell_investment: Vec<Decimal>,
    pub keep_capital: Vec<Decimal>,
    pub summary: ProjectionSummary,
}

impl ScenarioProjection {
    pub fn rows(&self) -> impl Iterator<Item = ProjectionRow> + '_ {
        self.months.iter().enumerate().map(|(i, &month)| ProjectionRow {
            month,
            mortgage_balance: self.mortgage_balance[i],
            sell_investment: self.sell_investment[i],
            keep_capital: self.keep_capital[i],
        })
    }
}

/// Projects the keep-versus-sell scenario described by `inputs`.
///
/// # Errors
///
/// Returns [`CalculationError::InvalidArgument`] if the horizon is zero, a
/// percentage is out of range, or the mortgage parameters are invalid, and
/// propagates any error from the underlying calculations.
pub fn project_scenario(
    inputs: &ScenarioInputs,
    tax: &IncomeTaxCalculator,
    amortizer: &MortgageAmortizer,
) -> Result<ScenarioProjection, CalculationError> {
    validate_inputs(inputs)?;

    let horizon_months = inputs.horizon_months();
    let months: Vec<u32> = (1..=horizon_months).collect();
    info!(
        horizon_months,
        zero_rate_policy = %amortizer.zero_rate_policy(),
        "projecting scenario"
    );

    if horizon_months > inputs.amortization_months {
        warn!(
            horizon_months,
            amortization_months = inputs.amortization_months,
            "horizon runs past the amortization term, balance is held at zero"
        );
    }
    let monthly_payment = amortizer.monthly_payment(
        inputs.mortgage_principal,
        inputs.mortgage_rate_pct,
        inputs.amortization_months,
    )?;
    let mortgage_balance = amortizer.balance_curve(
        inputs.mortgage_principal,
        inputs.mortgage_rate_pct,
        inputs.amortization_months,
        months.iter().map(|&m| m.min(inputs.amortization_months)),
    )?;

    let growth: Vec<Decimal> = months
        .iter()
        .map(|&m| annual_growth_factor(inputs.gic_rate_pct, m))
        .collect::<Result<_, _>>()?;

    // Sell: invest the net proceeds and the one-time RRSP contribution.
    let net_sale_proceeds = mul(
        inputs.sell_price,
        Decimal::ONE - pct(inputs.realtor_fee_pct),
        "sale proceeds",
    )?;
    let net_capital = inputs
        .starting_capital
        .checked_add(net_sale_proceeds)
        .and_then(|v| v.checked_sub(inputs.mortgage_principal))
        .ok_or(CalculationError::Overflow("sale proceeds"))?;
    let sell_investment: Vec<Decimal> = growth
        .iter()
        .map(|&g| {
            net_capital
                .checked_mul(g)
                .and_then(|v| v.checked_add(inputs.rrsp_contribution))
                .and_then(|v| v.checked_add(inputs.rrsp_contribution.checked_mul(g)?))
                .ok_or(CalculationError::Overflow("sell scenario"))
        })
        .collect::<Result<_, _>>()?;

    // Keep: reinvest rent monthly and bank the yearly tax return on it.
    let rent = project(
        inputs.monthly_rental_income,
        inputs.monthly_rental_income,
        inputs.gic_rate_pct,
        horizon_months,
    )?;
    let yearly_rent = mul(inputs.monthly_rental_income, Decimal::from(12), "yearly rent")?;
    let yearly_tax_return = RrspReturnEstimator::new(tax).tax_saved(inputs.annual_income, yearly_rent);
    let keep_capital: Vec<Decimal> = months
        .iter()
        .zip(rent.iter().zip(&growth))
        .map(|(&m, (&rent_value, &g))| {
            let credit = if m % 12 == 0 {
                yearly_tax_return
            } else {
                Decimal::ZERO
            };
            rent_value
                .checked_add(inputs.starting_capital)
                .and_then(|v| v.checked_add(inputs.starting_capital.checked_mul(g)?))
                .and_then(|v| v.checked_add(credit))
                .ok_or(CalculationError::Overflow("keep scenario"))
        })
        .collect::<Result<_, _>>()?;

    let years = inputs.horizon_years;
    let appreciation = checked_pow(
        Decimal::ONE + pct(inputs.home_appreciation_pct),
        years,
        "projected sale price",
    )?;
    let depreciation = checked_pow(
        Decimal::ONE - pct(inputs.home_depreciation_pct),
        years,
        "projected sale price",
    )?;
    let projected_sale_price = mul(
        mul(inputs.sell_price, appreciation, "projected sale price")?,
        depreciation,
        "projected sale price",
    )?;
    let cost_basis = inputs
        .purchase_price
        .checked_add(inputs.first_time_buyer_discount)
        .ok_or(CalculationError::Overflow("cost basis"))?;

    let summary = ProjectionSummary {
        monthly_payment,
        final_investment_value: last(&sell_investment),
        net_gain_selling_now: sub(net_sale_proceeds, cost_basis, "net gain")?,
        projected_sale_price,
        net_gain_selling_at_end: sub(projected_sale_price, cost_basis, "net gain")?,
        final_keep_capital: last(&keep_capital),
        yearly_tax_return,
    };
    debug!(?summary, "scenario projected");

    Ok(ScenarioProjection {
        months,
        mortgage_balance,
        sell_investment,
        keep_capital,
        summary,
    })
}

/// Range checks for the fields the mortgage and growth formulas do not cover.
pub fn validate_inputs(inputs: &ScenarioInputs) -> Result<(), CalculationError> {
    if inputs.horizon_years == 0 {
        return Err(CalculationError::invalid(
            "forecasting horizon must be at least one year",
        ));
    }
    if inputs.realtor_fee_pct < Decimal::ZERO || inputs.realtor_fee_pct > Decimal::ONE_HUNDRED {
        return Err(CalculationError::invalid(format!(
            "realtor fee must be between 0% and 100%, got {}%",
            inputs.realtor_fee_pct
        )));
    }
    if inputs.home_depreciation_pct >= Decimal::ONE_HUNDRED {
        return Err(CalculationError::invalid(format!(
            "home depreciation must be below 100%, got {}%",
            inputs.home_depreciation_pct
        )));
    }
    if inputs.home_appreciation_pct <= -Decimal::ONE_HUNDRED {
        return Err(CalculationError::invalid(format!(
            "home appreciation must be above -100%, got {}%",
            inputs.home_appreciation_pct
        )));
    }
    if inputs.gic_rate_pct <= -Decimal::ONE_HUNDRED {
        return Err(CalculationError::invalid(format!(
            "GIC rate must be above -100%, got {}%",
            inputs.gic_rate_pct
        )));
    }
    Ok(())
}

fn pct(value: Decimal) -> Decimal {
    value / Decimal::ONE_HUNDRED
}

fn mul(
    a: Decimal,
    b: Decimal,
    what: &'static str,
) -> Result<Decimal, CalculationError> {
    a.checked_mul(b).ok_or(CalculationError::Overflow(what))
}

fn sub(
    a: Decimal,
    b: Decimal,
    what: &'static str,
) -> Result<Decimal, CalculationError> {
    a.checked_sub(b).ok_or(CalculationError::Overflow(what))
}

fn last(series: &[Decimal]) -> Decimal {
    series.last().copied().unwrap_or(Decimal::ZERO)
}
