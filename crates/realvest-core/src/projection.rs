//! Year-by-year holding-period series for charting.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::amortization;
use crate::error::RealvestError;
use crate::market;
use crate::types::{Money, ScenarioInput, TimeSeriesPoint};
use crate::RealvestResult;

const HUNDRED: Decimal = dec!(100);

/// One point per holding year, ordered by year ascending.
///
/// Equity uses the closed-form remaining balance, the same path the
/// valuation module uses, so chart and sale-equity figures always
/// agree. `annual_cash_flow` is the already-derived after-debt-service
/// figure; the series does not re-derive it.
pub fn time_series(
    scenario: &ScenarioInput,
    annual_cash_flow: Money,
) -> RealvestResult<Vec<TimeSeriesPoint>> {
    if scenario.years == 0 {
        return Err(RealvestError::InvalidInput {
            field: "years".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }

    let growth = Decimal::ONE + scenario.appreciation_rate / HUNDRED;
    let mut points = Vec::with_capacity(scenario.years as usize);

    for year in 1..=scenario.years {
        let property_value = growth
            .checked_powd(Decimal::from(year))
            .and_then(|grown| scenario.purchase_price.checked_mul(grown))
            .ok_or(RealvestError::NumericOverflow {
                context: "the appreciated property value".into(),
            })?;
        let balance = amortization::remaining_balance(
            scenario.loan_amount,
            scenario.interest_rate,
            scenario.loan_years,
            year * 12,
        )?;

        points.push(TimeSeriesPoint {
            year,
            cumulative_cash_flow: annual_cash_flow * Decimal::from(year),
            equity: property_value - balance,
            stock_value: market::stock_value_at_year(
                scenario.down_payment,
                scenario.stock_return_rate,
                year,
            )?,
        });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_scenario() -> ScenarioInput {
        ScenarioInput {
            purchase_price: dec!(300000),
            down_payment: dec!(60000),
            loan_amount: dec!(240000),
            interest_rate: dec!(6.5),
            loan_years: 30,
            property_tax: dec!(3000),
            insurance: dec!(1200),
            maintenance: dec!(1500),
            vacancy_rate: dec!(5),
            rent: dec!(2000),
            appreciation_rate: dec!(3),
            stock_return_rate: dec!(8),
            years: 10,
        }
    }

    #[test]
    fn test_one_point_per_year_ascending() {
        let series = time_series(&sample_scenario(), dec!(-1103.52)).unwrap();
        assert_eq!(series.len(), 10);
        for (i, point) in series.iter().enumerate() {
            assert_eq!(point.year, (i + 1) as u32);
        }
    }

    #[test]
    fn test_cumulative_cash_flow_is_linear() {
        let series = time_series(&sample_scenario(), dec!(-1103.52)).unwrap();
        assert_eq!(series[0].cumulative_cash_flow, dec!(-1103.52));
        assert_eq!(series[9].cumulative_cash_flow, dec!(-11035.20));
    }

    #[test]
    fn test_equity_grows_with_amortization_and_appreciation() {
        let series = time_series(&sample_scenario(), dec!(-1103.52)).unwrap();
        let mut prev = Decimal::ZERO;
        for point in &series {
            assert!(point.equity > prev, "equity not growing at year {}", point.year);
            prev = point.equity;
        }
        // Year 1 equity: ~309,000 property value minus ~237,300 balance
        assert!(
            series[0].equity > dec!(68000) && series[0].equity < dec!(75000),
            "year 1 equity {}",
            series[0].equity
        );
    }

    #[test]
    fn test_final_stock_value_matches_future_value() {
        let scenario = sample_scenario();
        let series = time_series(&scenario, dec!(-1103.52)).unwrap();
        let fv = market::stock_future_value(dec!(60000), dec!(8), 10).unwrap();
        assert_eq!(series[9].stock_value, fv);
    }

    #[test]
    fn test_holding_to_loan_maturity_has_no_debt_left() {
        let mut scenario = sample_scenario();
        scenario.years = 30;
        let series = time_series(&scenario, dec!(-1103.52)).unwrap();
        let last = series.last().unwrap();
        let appreciated =
            dec!(300000) * (Decimal::ONE + dec!(0.03)).powd(Decimal::from(30u32));
        assert_eq!(last.equity, appreciated);
    }

    #[test]
    fn test_rejects_zero_years() {
        let mut scenario = sample_scenario();
        scenario.years = 0;
        assert!(time_series(&scenario, dec!(0)).is_err());
    }
}
