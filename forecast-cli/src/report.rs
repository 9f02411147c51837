//! Plain-text and CSV rendering of calculation results.

use std::io::Write;

use anyhow::Result;
use forecast_core::TaxBracketSchedule;
use forecast_core::calculations::common::round_half_up;
use forecast_core::calculations::{
    IncomeTaxCalculator, ProjectionSummary, ScenarioProjection, bracket_breakdown,
    marginal_rate,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::utils::{money, percent};

const SCENARIO_NOTES: &str = "\
All figures assume invested funds go into a GIC, and that the full tax return \
from rental income contributions is reinvested in a GIC on a rolling basis. \
RRSP contributions are a one-time deposit at the start of the period. Growth \
of RRSP contributions made elsewhere and tax on income from taxable accounts \
are not considered.";

/// Writes the scenario summary.
pub fn write_summary<W: Write>(
    out: &mut W,
    summary: &ProjectionSummary,
    horizon_years: u32,
    amortization_months: u32,
) -> Result<()> {
    writeln!(out, "Summary of Financial Analysis")?;
    writeln!(out, "Monthly Mortgage Payment: {}", money(summary.monthly_payment))?;
    writeln!(
        out,
        "Total Investment Value after {horizon_years} years: {}",
        money(summary.final_investment_value)
    )?;
    writeln!(
        out,
        "Net Gain/Loss from Selling Immediately: {}",
        money(summary.net_gain_selling_now)
    )?;
    writeln!(
        out,
        "Projected Sale Price at End of Timeline: {}",
        money(summary.projected_sale_price)
    )?;
    writeln!(
        out,
        "Net Gain/Loss from Selling At End of Timeline: {}",
        money(summary.net_gain_selling_at_end)
    )?;
    writeln!(
        out,
        "Capital Upon Selling At End of Timeline: {}",
        money(summary.final_keep_capital)
    )?;
    writeln!(
        out,
        "Yearly Tax Return on Rental Contributions: {}",
        money(summary.yearly_tax_return)
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{SCENARIO_NOTES} An amortization period of {amortization_months} months is assumed."
    )?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SeriesRecord {
    month: u32,
    mortgage_balance: Decimal,
    sell_investment: Decimal,
    keep_capital: Decimal,
}

/// Writes the month-by-month series as CSV, rounded to cents.
pub fn write_series_csv<W: Write>(
    out: W,
    projection: &ScenarioProjection,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in projection.rows() {
        writer.serialize(SeriesRecord {
            month: row.month,
            mortgage_balance: round_half_up(row.mortgage_balance),
            sell_investment: round_half_up(row.sell_investment),
            keep_capital: round_half_up(row.keep_capital),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes tax per schedule, the total, marginal rates and bracket slices.
pub fn write_tax<W: Write>(
    out: &mut W,
    calculator: &IncomeTaxCalculator,
    income: Decimal,
) -> Result<()> {
    let total = calculator.compute_total_tax(income);

    writeln!(out, "Income: {}", money(income))?;
    write_schedule(out, "Primary", calculator.primary(), income, total.primary)?;
    write_schedule(out, "Secondary", calculator.secondary(), income, total.secondary)?;
    writeln!(out, "Total tax: {}", money(total.total))?;
    writeln!(
        out,
        "Combined marginal rate: {}",
        percent(calculator.marginal_rate(income))
    )?;
    Ok(())
}

fn write_schedule<W: Write>(
    out: &mut W,
    label: &str,
    schedule: &TaxBracketSchedule,
    income: Decimal,
    tax: Decimal,
) -> Result<()> {
    writeln!(
        out,
        "{label} tax: {} (exemption {}, marginal rate {})",
        money(tax),
        money(schedule.exemption()),
        percent(marginal_rate(schedule, income))
    )?;
    for slice in bracket_breakdown(schedule, income) {
        let upper = slice.upper.map_or_else(|| "and up".to_string(), money);
        writeln!(
            out,
            "  {} to {} at {}: {}",
            money(slice.lower),
            upper,
            percent(slice.rate),
            money(slice.tax)
        )?;
    }
    Ok(())
}
