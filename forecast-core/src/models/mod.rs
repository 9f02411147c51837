mod amortization;
mod contribution;
mod scenario;
mod tax_bracket;

pub(crate) use amortization::validate_loan;
pub use amortization::{AmortizationParameters, ZeroRatePolicy};
pub use contribution::ContributionSeries;
pub use scenario::ScenarioInputs;
pub use tax_bracket::{TaxBracket, TaxBracketSchedule};
