//! Command dispatch: resolves configuration, runs the requested calculation
//! and writes the report.

use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use forecast_core::CalculationError;
use forecast_core::calculations::{
    MortgageAmortizer, RrspReturnEstimator, project, project_scenario,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::cli::{Cli, Command};
use crate::config::ForecastConfig;
use crate::report;
use crate::utils::money;

/// Loads the config file (if any) and applies command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<ForecastConfig> {
    let mut config = match &cli.config {
        Some(path) => ForecastConfig::load(path)?,
        None => ForecastConfig::default(),
    };

    if let Some(brackets) = &cli.brackets {
        config.tax.brackets = Some(brackets.clone());
    }
    if let Some(primary) = &cli.primary {
        config.tax.primary = primary.clone();
    }
    if let Some(secondary) = &cli.secondary {
        config.tax.secondary = secondary.clone();
    }
    if let Some(policy) = cli.zero_rate {
        config.mortgage.zero_rate_policy = policy;
    }
    if let Command::Scenario {
        horizon_years: Some(years),
        ..
    } = &cli.command
    {
        config.scenario.horizon_years = *years;
    }

    debug!(?config, "resolved configuration");
    Ok(config)
}

/// Runs `cli.command`, writing its report to `out`.
pub fn run<W: Write>(
    cli: &Cli,
    out: &mut W,
) -> Result<()> {
    let config = resolve_config(cli)?;
    let amortizer = MortgageAmortizer::new(config.mortgage.zero_rate_policy);

    match &cli.command {
        Command::Scenario { series_out, .. } => {
            let calculator = config
                .tax
                .calculator()
                .context("Failed to build tax schedules")?;
            let projection = project_scenario(&config.scenario, &calculator, &amortizer)
                .context("Failed to project scenario")?;

            report::write_summary(
                out,
                &projection.summary,
                config.scenario.horizon_years,
                config.scenario.amortization_months,
            )?;

            if let Some(path) = series_out {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create: {}", path.display()))?;
                report::write_series_csv(file, &projection)
                    .with_context(|| format!("Failed to write series: {}", path.display()))?;
                info!(path = %path.display(), months = projection.months.len(), "wrote series");
            }
        }

        Command::Tax {
            income,
            contribution,
        } => {
            let calculator = config
                .tax
                .calculator()
                .context("Failed to build tax schedules")?;
            report::write_tax(out, &calculator, *income)?;

            if let Some(contribution) = contribution {
                let saved = RrspReturnEstimator::new(&calculator).tax_saved(*income, *contribution);
                writeln!(
                    out,
                    "Tax return on a {} contribution: {}",
                    money(*contribution),
                    money(saved)
                )?;
            }
        }

        Command::Mortgage {
            principal,
            rate,
            term_months,
            payments_made,
        } => {
            let payment = amortizer.monthly_payment(*principal, *rate, *term_months)?;
            let total_interest = payment
                .checked_mul(Decimal::from(*term_months))
                .and_then(|total| total.checked_sub(*principal))
                .ok_or(CalculationError::Overflow("total interest"))?;
            writeln!(out, "Monthly payment: {}", money(payment))?;
            writeln!(
                out,
                "Total interest over {term_months} months: {}",
                money(total_interest)
            )?;

            if let Some(k) = payments_made {
                let balance = amortizer.remaining_balance(*principal, *rate, *term_months, *k)?;
                writeln!(out, "Balance after {k} payments: {}", money(balance))?;
            }
        }

        Command::Grow {
            initial,
            monthly,
            rate,
            months,
        } => {
            let values = project(*initial, *monthly, *rate, *months)?;
            for (i, value) in values.iter().enumerate() {
                let month = i + 1;
                if month % 12 == 0 || month == values.len() {
                    writeln!(out, "Month {month}: {}", money(*value))?;
                }
            }
        }
    }

    Ok(())
}
