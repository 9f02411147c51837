//! Fixed-payment mortgage amortization.
//!
//! With monthly rate `r = annual_rate_pct / 1200` and `n` monthly payments:
//!
//! ```text
//! payment = P * r * (1 + r)^n / ((1 + r)^n - 1)
//! balance(k) = payment / r * (1 - (1 + r)^-(n - k))
//! ```
//!
//! Both formulas divide by `r`. What happens at `r = 0` is chosen by the
//! amortizer's [`ZeroRatePolicy`].

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::{checked_pow, monthly_rate};
use crate::error::CalculationError;
use crate::models::{AmortizationParameters, ZeroRatePolicy, validate_loan};

/// Computes payments and outstanding balances of an amortizing loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MortgageAmortizer {
    zero_rate_policy: ZeroRatePolicy,
}

impl MortgageAmortizer {
    pub fn new(zero_rate_policy: ZeroRatePolicy) -> Self {
        Self { zero_rate_policy }
    }

    pub fn zero_rate_policy(&self) -> ZeroRatePolicy {
        self.zero_rate_policy
    }

    /// Level monthly payment that retires `principal` in `term_months`.
    ///
    /// # Errors
    ///
    /// - [`CalculationError::InvalidArgument`] for a non-positive principal,
    ///   a negative rate or a zero term
    /// - [`CalculationError::DivisionSingularity`] for a zero rate under
    ///   [`ZeroRatePolicy::Reject`]
    /// - [`CalculationError::Overflow`] when `(1 + r)^n` is out of range
    pub fn monthly_payment(
        &self,
        principal: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
    ) -> Result<Decimal, CalculationError> {
        validate_loan(principal, annual_rate_pct, term_months)?;

        let r = monthly_rate(annual_rate_pct);
        if r.is_zero() {
            self.check_zero_rate()?;
            return Ok(principal / Decimal::from(term_months));
        }

        let growth = checked_pow(Decimal::ONE + r, term_months, "monthly payment")?;
        let numerator = principal
            .checked_mul(r)
            .and_then(|v| v.checked_mul(growth))
            .ok_or(CalculationError::Overflow("monthly payment"))?;
        let payment = numerator
            .checked_div(growth - Decimal::ONE)
            .ok_or(CalculationError::DivisionSingularity)?;

        debug!(%principal, %annual_rate_pct, term_months, %payment, "computed monthly payment");
        Ok(payment)
    }

    /// Balance still owed after `payments_made` of `term_months` payments.
    ///
    /// Zero payments leaves the full principal; `term_months` payments leave
    /// nothing.
    ///
    /// # Errors
    ///
    /// As [`MortgageAmortizer::monthly_payment`], plus
    /// [`CalculationError::InvalidArgument`] when `payments_made` exceeds
    /// `term_months`.
    pub fn remaining_balance(
        &self,
        principal: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
        payments_made: u32,
    ) -> Result<Decimal, CalculationError> {
        self.remaining_balance_for(&AmortizationParameters {
            principal,
            annual_interest_rate: annual_rate_pct,
            term_months,
            payments_made,
        })
    }

    /// [`MortgageAmortizer::remaining_balance`] over a parameter struct.
    pub fn remaining_balance_for(
        &self,
        params: &AmortizationParameters,
    ) -> Result<Decimal, CalculationError> {
        params.validate()?;
        let payment = self.monthly_payment(
            params.principal,
            params.annual_interest_rate,
            params.term_months,
        )?;
        balance_after(params, payment)
    }

    /// Applies [`MortgageAmortizer::remaining_balance`] to each payment count
    /// in turn, preserving order.
    ///
    /// The payment is computed once. The first invalid payment count aborts
    /// the whole curve.
    pub fn balance_curve<I>(
        &self,
        principal: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
        payments_made: I,
    ) -> Result<Vec<Decimal>, CalculationError>
    where
        I: IntoIterator<Item = u32>,
    {
        let payment = self.monthly_payment(principal, annual_rate_pct, term_months)?;

        payments_made
            .into_iter()
            .map(|k| {
                let params = AmortizationParameters {
                    principal,
                    annual_interest_rate: annual_rate_pct,
                    term_months,
                    payments_made: k,
                };
                params.validate()?;
                balance_after(&params, payment)
            })
            .collect()
    }

    fn check_zero_rate(&self) -> Result<(), CalculationError> {
        match self.zero_rate_policy {
            ZeroRatePolicy::Linear => {
                warn!("zero interest rate, amortizing linearly");
                Ok(())
            }
            ZeroRatePolicy::Reject => Err(CalculationError::DivisionSingularity),
        }
    }
}

/// Balance left once `params.payments_made` level payments of `payment` are made.
///
/// `params` must already be validated.
fn balance_after(
    params: &AmortizationParameters,
    payment: Decimal,
) -> Result<Decimal, CalculationError> {
    let remaining = params.term_months - params.payments_made;
    let r = monthly_rate(params.annual_interest_rate);

    if r.is_zero() {
        return params
            .principal
            .checked_mul(Decimal::from(remaining))
            .and_then(|v| v.checked_div(Decimal::from(params.term_months)))
            .ok_or(CalculationError::Overflow("remaining balance"));
    }

    let growth = checked_pow(Decimal::ONE + r, remaining, "remaining balance")?;
    let discount = Decimal::ONE
        .checked_div(growth)
        .ok_or(CalculationError::Overflow("remaining balance"))?;
    let annuity = payment
        .checked_div(r)
        .ok_or(CalculationError::DivisionSingularity)?;

    annuity
        .checked_mul(Decimal::ONE - discount)
        .ok_or(CalculationError::Overflow("remaining balance"))
}
