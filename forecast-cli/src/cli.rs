use std::path::PathBuf;

use clap::{Parser, Subcommand};
use forecast_core::ZeroRatePolicy;
use rust_decimal::Decimal;

use crate::utils::parse_amount;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Personal-finance forecaster: income tax, RRSP returns, compounding
/// contributions, mortgage balances and a keep-versus-sell property scenario.
///
/// Rates are nominal annual percentages (`3` or `3%` means 3%).
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file with [scenario], [mortgage] and [tax] tables.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// CSV bracket table to load tax schedules from.
    #[arg(long, global = true)]
    pub brackets: Option<PathBuf>,

    /// Jurisdiction of the first tax schedule (default `federal`).
    #[arg(long, global = true)]
    pub primary: Option<String>,

    /// Jurisdiction of the second tax schedule (default `ontario`).
    #[arg(long, global = true)]
    pub secondary: Option<String>,

    /// How to amortize a 0% mortgage: `linear` or `reject`.
    #[arg(long, global = true)]
    pub zero_rate: Option<ZeroRatePolicy>,

    /// Log filter, e.g. `debug` or `forecast_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Project the configured keep-versus-sell scenario and print a summary.
    Scenario {
        /// Override the forecasting horizon from the config file.
        #[arg(long)]
        horizon_years: Option<u32>,

        /// Write the month-by-month series to this CSV file.
        #[arg(long)]
        series_out: Option<PathBuf>,
    },

    /// Income tax under both schedules, and the return on a contribution.
    Tax {
        /// Gross annual income.
        #[arg(long, value_parser = parse_amount, allow_negative_numbers = true)]
        income: Decimal,

        /// Deductible RRSP contribution to estimate the tax return for.
        #[arg(long, value_parser = parse_amount)]
        contribution: Option<Decimal>,
    },

    /// Monthly payment and remaining balance of an amortizing loan.
    Mortgage {
        #[arg(long, value_parser = parse_amount)]
        principal: Decimal,

        /// Annual interest rate in percent.
        #[arg(long, value_parser = parse_amount)]
        rate: Decimal,

        #[arg(long)]
        term_months: u32,

        /// Number of payments already made.
        #[arg(long)]
        payments_made: Option<u32>,
    },

    /// Month-end balances of a monthly contribution compounded at a fixed rate.
    Grow {
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        initial: Decimal,

        #[arg(long, value_parser = parse_amount)]
        monthly: Decimal,

        /// Annual rate in percent; may be zero or negative.
        #[arg(long, value_parser = parse_amount, allow_negative_numbers = true)]
        rate: Decimal,

        #[arg(long)]
        months: u32,
    },
}
