//! Closed-form mortgage economics.
//!
//! Payment and remaining balance both come from the amortization
//! identity rather than month-by-month simulation, so they are O(1)
//! and free of accumulated rounding drift. The simulated schedule
//! exists for display and for cross-checking the closed form.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RealvestError;
use crate::types::{Money, Percent};
use crate::RealvestResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One month of a simulated amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Month number, 1-based
    pub month: u32,
    /// Interest portion of the payment
    pub interest: Money,
    /// Principal portion of the payment
    pub principal: Money,
    /// Balance after this payment
    pub balance: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly payment on a fully amortizing fixed-rate loan.
///
/// With monthly rate `c = rate/100/12` and `n = loan_years * 12`:
/// `P = L * c(1+c)^n / ((1+c)^n - 1)`. A zero rate degenerates to
/// straight-line repayment `L / n`.
pub fn monthly_payment(
    loan_amount: Money,
    interest_rate: Percent,
    loan_years: u32,
) -> RealvestResult<Money> {
    validate_loan(loan_amount, interest_rate, loan_years)?;

    let n = Decimal::from(loan_years) * MONTHS_PER_YEAR;
    let c = monthly_rate(interest_rate);

    if c.is_zero() {
        return Ok(loan_amount / n);
    }

    let factor = (Decimal::ONE + c)
        .checked_powd(n)
        .ok_or(RealvestError::NumericOverflow {
            context: "the mortgage growth factor".into(),
        })?;
    // Divide first: factor/(factor - 1) stays near one even when the
    // factor itself is enormous.
    Ok(loan_amount * c * (factor / (factor - Decimal::ONE)))
}

/// Remaining balance after `months_paid` payments, closed form:
/// `B = L * ((1+c)^n - (1+c)^m) / ((1+c)^n - 1)`.
///
/// `months_paid` is clamped to `[0, n]`; anything at or past full term
/// yields exactly zero.
pub fn remaining_balance(
    loan_amount: Money,
    interest_rate: Percent,
    loan_years: u32,
    months_paid: u32,
) -> RealvestResult<Money> {
    validate_loan(loan_amount, interest_rate, loan_years)?;

    let n = loan_years * 12;
    if months_paid == 0 {
        return Ok(loan_amount);
    }
    if months_paid >= n {
        return Ok(Decimal::ZERO);
    }

    let c = monthly_rate(interest_rate);
    let n_dec = Decimal::from(n);
    let m_dec = Decimal::from(months_paid);

    if c.is_zero() {
        return Ok(loan_amount - (loan_amount / n_dec) * m_dec);
    }

    let one_plus_c = Decimal::ONE + c;
    let overflow = || RealvestError::NumericOverflow {
        context: "the mortgage growth factor".into(),
    };
    let grown_full = one_plus_c.checked_powd(n_dec).ok_or_else(overflow)?;
    let grown_paid = one_plus_c.checked_powd(m_dec).ok_or_else(overflow)?;
    // Same divide-first shape as the payment: the ratio is in [0, 1].
    Ok(loan_amount * ((grown_full - grown_paid) / (grown_full - Decimal::ONE)))
}

/// Month-by-month schedule with interest/principal split.
///
/// Intended for display; the closed-form [`remaining_balance`] is the
/// authoritative balance everywhere else in the engine.
pub fn amortization_schedule(
    loan_amount: Money,
    interest_rate: Percent,
    loan_years: u32,
) -> RealvestResult<Vec<AmortizationRow>> {
    let payment = monthly_payment(loan_amount, interest_rate, loan_years)?;
    let c = monthly_rate(interest_rate);
    let n = loan_years * 12;

    let mut rows = Vec::with_capacity(n as usize);
    let mut balance = loan_amount;

    for month in 1..=n {
        let interest = balance * c;
        let principal = payment - interest;
        balance -= principal;
        rows.push(AmortizationRow {
            month,
            interest,
            principal,
            balance,
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn monthly_rate(interest_rate: Percent) -> Decimal {
    interest_rate / HUNDRED / MONTHS_PER_YEAR
}

fn validate_loan(
    loan_amount: Money,
    interest_rate: Percent,
    loan_years: u32,
) -> RealvestResult<()> {
    if loan_years == 0 {
        return Err(RealvestError::InvalidInput {
            field: "loan_years".into(),
            reason: "Loan term must be at least 1 year".into(),
        });
    }
    if loan_amount < Decimal::ZERO {
        return Err(RealvestError::InvalidInput {
            field: "loan_amount".into(),
            reason: "Loan amount cannot be negative".into(),
        });
    }
    if interest_rate < Decimal::ZERO {
        return Err(RealvestError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
