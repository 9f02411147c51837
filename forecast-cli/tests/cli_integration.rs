//! End-to-end tests that parse real command lines, load the on-disk fixtures
//! and check the rendered reports.

use std::path::{Path, PathBuf};

use clap::Parser;
use forecast_cli::{Cli, app};
use forecast_core::ZeroRatePolicy;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("forecast").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    app::run(&cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_scenario_from_fixture_config() {
    let config = fixture("scenario.toml");

    let text = run(&["--config", config.to_str().unwrap(), "scenario"]).unwrap();

    assert!(text.contains("Monthly Mortgage Payment: $500.00"));
    assert!(text.contains("Total Investment Value after 2 years: $199449.20"));
    assert!(text.contains("Net Gain/Loss from Selling Immediately: $33000.00"));
    assert!(text.contains("Net Gain/Loss from Selling At End of Timeline: $45000.00"));
    assert!(text.contains("Capital Upon Selling At End of Timeline: $84828.40"));
    assert!(text.contains("Yearly Tax Return on Rental Contributions: $4963.54"));
    assert!(text.contains("240 months"));
}

#[test]
fn test_scenario_writes_series_csv() {
    let dir = tempfile::tempdir().unwrap();
    let series = dir.path().join("series.csv");
    let config = fixture("scenario.toml");

    run(&[
        "--config",
        config.to_str().unwrap(),
        "scenario",
        "--series-out",
        series.to_str().unwrap(),
    ])
    .unwrap();

    let text = std::fs::read_to_string(&series).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 25);
    assert_eq!(
        lines[0],
        "month,mortgage_balance,sell_investment,keep_capital"
    );

    let last: Vec<Decimal> = lines[24]
        .split(',')
        .map(|field| field.parse().unwrap())
        .collect();
    assert_eq!(
        last,
        vec![dec!(24), dec!(108000), dec!(199449.20), dec!(84828.40)]
    );
}

#[test]
fn test_scenario_zero_rate_rejected_by_flag() {
    let config = fixture("scenario.toml");

    let err = run(&[
        "--config",
        config.to_str().unwrap(),
        "--zero-rate",
        "reject",
        "scenario",
    ])
    .unwrap_err();

    assert!(format!("{err:#}").contains("division singularity"));
}

#[test]
fn test_scenario_horizon_override() {
    let text = run(&["scenario", "--horizon-years", "3"]).unwrap();

    assert!(text.contains("Total Investment Value after 3 years"));
}

#[test]
fn test_tax_with_contribution() {
    let text = run(&["tax", "--income", "100,000", "--contribution", "1000"]).unwrap();

    assert!(text.contains("Total tax: $20114.00"));
    assert!(text.contains("Tax return on a $1000.00 contribution: $296.50"));
}

#[test]
fn test_tax_with_bracket_table_flags() {
    let brackets = fixture("brackets.csv");

    let text = run(&[
        "--brackets",
        brackets.to_str().unwrap(),
        "--secondary",
        "flat",
        "tax",
        "--income",
        "100000",
    ])
    .unwrap();

    assert!(text.contains("Secondary tax: $10000.00"));
    assert!(text.contains("Total tax: $24207.79"));
}

#[test]
fn test_tax_unknown_jurisdiction_fails() {
    let result = run(&["--secondary", "quebec", "tax", "--income", "50000"]);

    assert!(result.is_err());
}

#[test]
fn test_mortgage_payment_and_balance() {
    let text = run(&[
        "mortgage",
        "--principal",
        "100000",
        "--rate",
        "3%",
        "--term-months",
        "264",
        "--payments-made",
        "12",
    ])
    .unwrap();

    assert!(text.contains("Monthly payment: $517.90"));
    assert!(text.contains("Balance after 12 payments: $96740.68"));
}

#[test]
fn test_mortgage_total_interest() {
    let text = run(&[
        "mortgage",
        "--principal",
        "120000",
        "--rate",
        "0",
        "--term-months",
        "240",
    ])
    .unwrap();

    assert!(text.contains("Monthly payment: $500.00"));
    assert!(text.contains("Total interest over 240 months: $0.00"));
}

#[test]
fn test_mortgage_overflowing_total_is_an_error() {
    let max = Decimal::MAX.to_string();

    let err = run(&[
        "mortgage",
        "--principal",
        &max,
        "--rate",
        "12",
        "--term-months",
        "12",
    ])
    .unwrap_err();

    assert!(format!("{err:#}").contains("total interest"));
}

#[test]
fn test_mortgage_payments_past_term_fail() {
    let result = run(&[
        "mortgage",
        "--principal",
        "100000",
        "--rate",
        "3",
        "--term-months",
        "12",
        "--payments-made",
        "13",
    ]);

    assert!(result.is_err());
}

#[test]
fn test_grow_prints_yearly_and_final_balances() {
    let text = run(&["grow", "--monthly", "100", "--rate", "6", "--months", "14"]).unwrap();

    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Month 12: $1233.56");
    assert!(lines[1].starts_with("Month 14: "));
}

#[test]
fn test_grow_rejects_zero_months() {
    assert!(run(&["grow", "--monthly", "100", "--rate", "6", "--months", "0"]).is_err());
}

#[test]
fn test_zero_rate_flag_parses() {
    let cli = Cli::try_parse_from(["forecast", "--zero-rate", "Reject", "scenario"]).unwrap();

    assert_eq!(cli.zero_rate, Some(ZeroRatePolicy::Reject));
}
