//! Personal-finance projections: progressive income tax, RRSP tax returns,
//! compounding contributions and mortgage amortization, all in exact
//! decimal arithmetic.

pub mod calculations;
pub mod error;
pub mod models;

pub use error::CalculationError;
pub use models::*;
