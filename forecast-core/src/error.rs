use thiserror::Error;

/// Errors raised by the financial calculations.
///
/// Inputs are checked at the function boundary so that a bad value surfaces
/// as one of these variants instead of a meaningless number further down.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalculationError {
    /// An input is outside the range the formula accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The annuity formula was evaluated with a zero periodic rate.
    #[error("division singularity: the amortization formula is undefined at a zero interest rate")]
    DivisionSingularity,

    /// A decimal operation exceeded the representable range.
    #[error("numeric overflow while computing {0}")]
    Overflow(&'static str),
}

impl CalculationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
