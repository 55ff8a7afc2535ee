//! Stock-market counterfactual: compound growth of the same capital
//! the property purchase ties up as a down payment.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::RealvestError;
use crate::types::{Money, Percent};
use crate::RealvestResult;

const HUNDRED: Decimal = dec!(100);

/// Value of the down payment invested at `stock_return_rate` percent
/// for `years` years. Same capital base as the property purchase, so
/// the comparison is of cash actually committed.
pub fn stock_future_value(
    down_payment: Money,
    stock_return_rate: Percent,
    years: u32,
) -> RealvestResult<Money> {
    stock_value_at_year(down_payment, stock_return_rate, years)
}

/// Compound value at an intermediate year of the holding period.
pub fn stock_value_at_year(
    down_payment: Money,
    stock_return_rate: Percent,
    year: u32,
) -> RealvestResult<Money> {
    let growth = Decimal::ONE + stock_return_rate / HUNDRED;
    growth
        .checked_powd(Decimal::from(year))
        .and_then(|grown| down_payment.checked_mul(grown))
        .ok_or(RealvestError::NumericOverflow {
            context: "the stock growth factor".into(),
        })
}
