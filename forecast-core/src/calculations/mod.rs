//! Financial calculations: progressive tax, contribution tax returns,
//! compounding contributions, mortgage amortization, and the scenario
//! projection that combines them.

pub mod common;
pub mod contribution;
pub mod mortgage;
pub mod projection;
pub mod rrsp;
pub mod tax;

pub use contribution::project;
pub use mortgage::MortgageAmortizer;
pub use projection::{
    ProjectionRow, ProjectionSummary, ScenarioProjection, project_scenario, validate_inputs,
};
pub use rrsp::RrspReturnEstimator;
pub use tax::{
    BracketSlice, IncomeTaxCalculator, TotalTax, bracket_breakdown, compute_tax, marginal_rate,
    taxable_income,
};
