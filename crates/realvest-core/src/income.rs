//! Operating income and leveraged return metrics.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::RealvestError;
use crate::types::{Money, Percent, Ratio};
use crate::RealvestResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Effective gross income: annualized rent less vacancy loss.
pub fn effective_gross_income(rent: Money, vacancy_rate: Percent) -> Money {
    rent * MONTHS_PER_YEAR * (Decimal::ONE - vacancy_rate / HUNDRED)
}

/// Net operating income: effective gross income less operating
/// expenses, before debt service.
pub fn net_operating_income(
    rent: Money,
    vacancy_rate: Percent,
    property_tax: Money,
    insurance: Money,
    maintenance: Money,
) -> Money {
    effective_gross_income(rent, vacancy_rate) - (property_tax + insurance + maintenance)
}

/// Capitalization rate: NOI as a percent of purchase price.
pub fn cap_rate(noi: Money, purchase_price: Money) -> RealvestResult<Percent> {
    if purchase_price.is_zero() {
        return Err(RealvestError::DivisionUndefined {
            context: "cap rate (purchase_price is zero)".into(),
        });
    }
    Ok(noi / purchase_price * HUNDRED)
}

/// Annual cash flow after debt service.
pub fn annual_cash_flow(noi: Money, monthly_payment: Money) -> Money {
    noi - monthly_payment * MONTHS_PER_YEAR
}

/// Cash-on-cash return: annual cash flow as a percent of the cash
/// actually invested.
pub fn cash_on_cash(cash_flow: Money, down_payment: Money) -> RealvestResult<Percent> {
    if down_payment.is_zero() {
        return Err(RealvestError::DivisionUndefined {
            context: "cash-on-cash (down_payment is zero)".into(),
        });
    }
    Ok(cash_flow / down_payment * HUNDRED)
}

/// Debt service coverage ratio: NOI over annual debt service.
pub fn debt_service_coverage(noi: Money, monthly_payment: Money) -> RealvestResult<Ratio> {
    let annual_debt_service = monthly_payment * MONTHS_PER_YEAR;
    if annual_debt_service.is_zero() {
        return Err(RealvestError::DivisionUndefined {
            context: "DSCR (annual debt service is zero)".into(),
        });
    }
    Ok(noi / annual_debt_service)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
