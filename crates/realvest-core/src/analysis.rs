//! Engine entry points: one scenario in, one complete metric bundle
//! (or the year-by-year projection) out.
//!
//! Both calls are pure and synchronous; all state lives in the
//! explicit `ScenarioInput` argument.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::time::Instant;

use crate::amortization;
use crate::error::RealvestError;
use crate::income;
use crate::market;
use crate::projection;
use crate::types::{
    with_metadata, CalculationResult, ComputationOutput, ScenarioInput, TimeSeriesPoint,
};
use crate::valuation;
use crate::RealvestResult;

const HUNDRED: Decimal = dec!(100);

/// Tolerance for the loan-amount consistency warning.
const CONSISTENCY_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive the full metric bundle from a scenario.
///
/// The NPV discount rate is the scenario's `stock_return_rate`: the
/// stock alternative is the opportunity cost of the capital tied up in
/// the property. Metrics with a zero denominator degrade to `None`
/// with a warning; an IRR search that exhausts its budget reports its
/// best estimate with `irr_converged = false`. Invalid inputs fail the
/// whole request — a result is never partially populated.
pub fn calculate(
    scenario: &ScenarioInput,
) -> RealvestResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_scenario(scenario)?;
    check_loan_consistency(scenario, &mut warnings);

    let monthly_payment = amortization::monthly_payment(
        scenario.loan_amount,
        scenario.interest_rate,
        scenario.loan_years,
    )?;

    let noi = income::net_operating_income(
        scenario.rent,
        scenario.vacancy_rate,
        scenario.property_tax,
        scenario.insurance,
        scenario.maintenance,
    );
    if noi < Decimal::ZERO {
        warnings.push(
            "Vacancy and operating expenses exceed rental income (negative NOI)".to_string(),
        );
    }

    let cap_rate = degrade(
        income::cap_rate(noi, scenario.purchase_price),
        &mut warnings,
    )?;
    let cash_flow = income::annual_cash_flow(noi, monthly_payment);
    let cash_on_cash = degrade(
        income::cash_on_cash(cash_flow, scenario.down_payment),
        &mut warnings,
    )?;
    let dscr = degrade(
        income::debt_service_coverage(noi, monthly_payment),
        &mut warnings,
    )?;

    let stock_value = market::stock_future_value(
        scenario.down_payment,
        scenario.stock_return_rate,
        scenario.years,
    )?;

    let sale_equity = valuation::equity_from_sale(
        scenario.purchase_price,
        scenario.appreciation_rate,
        scenario.years,
        scenario.loan_amount,
        scenario.interest_rate,
        scenario.loan_years,
    )?;

    // Full precision through the valuation; rounding is display-grade
    // and happens only here.
    let npv = valuation::npv(
        scenario.down_payment,
        cash_flow,
        scenario.years,
        scenario.stock_return_rate,
        sale_equity,
    )?
    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let (irr, irr_converged) = match valuation::irr(
        scenario.down_payment,
        cash_flow,
        scenario.years,
        sale_equity,
    ) {
        Ok(outcome) => {
            if !outcome.converged {
                warnings.push(format!(
                    "IRR search did not converge after {} evaluations; reporting best estimate",
                    outcome.iterations
                ));
            }
            (Some(outcome.rate.round_dp(6)), outcome.converged)
        }
        Err(e) => {
            warnings.push(format!("IRR reported as undefined: {e}"));
            (None, false)
        }
    };

    let result = CalculationResult {
        monthly_payment,
        noi,
        cap_rate,
        cash_flow,
        cash_on_cash,
        dscr,
        stock_value,
        npv,
        irr,
        irr_converged,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Leveraged Property vs. Equity Market DCF Comparison",
        scenario,
        warnings,
        elapsed,
        result,
    ))
}

/// Derive the year-by-year projection for charting.
pub fn project(
    scenario: &ScenarioInput,
) -> RealvestResult<ComputationOutput<Vec<TimeSeriesPoint>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_scenario(scenario)?;
    check_loan_consistency(scenario, &mut warnings);

    let monthly_payment = amortization::monthly_payment(
        scenario.loan_amount,
        scenario.interest_rate,
        scenario.loan_years,
    )?;
    let noi = income::net_operating_income(
        scenario.rent,
        scenario.vacancy_rate,
        scenario.property_tax,
        scenario.insurance,
        scenario.maintenance,
    );
    let cash_flow = income::annual_cash_flow(noi, monthly_payment);

    let series = projection::time_series(scenario, cash_flow)?;

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Holding-Period Projection (closed-form amortization)",
        scenario,
        warnings,
        elapsed,
        series,
    ))
}

/// Check the scenario against its field constraints, naming the
/// offending field. Loan-amount consistency is deliberately not
/// enforced here; see [`calculate`].
pub fn validate_scenario(scenario: &ScenarioInput) -> RealvestResult<()> {
    if scenario.purchase_price <= Decimal::ZERO {
        return Err(invalid("purchase_price", "Purchase price must be positive"));
    }
    if scenario.down_payment < Decimal::ZERO {
        return Err(invalid("down_payment", "Down payment cannot be negative"));
    }
    if scenario.down_payment > scenario.purchase_price {
        return Err(invalid(
            "down_payment",
            "Down payment cannot exceed purchase price",
        ));
    }
    if scenario.loan_amount < Decimal::ZERO {
        return Err(invalid("loan_amount", "Loan amount cannot be negative"));
    }
    if scenario.interest_rate < Decimal::ZERO {
        return Err(invalid("interest_rate", "Interest rate cannot be negative"));
    }
    if scenario.loan_years == 0 {
        return Err(invalid("loan_years", "Loan term must be at least 1 year"));
    }
    for (field, value) in [
        ("property_tax", scenario.property_tax),
        ("insurance", scenario.insurance),
        ("maintenance", scenario.maintenance),
        ("rent", scenario.rent),
    ] {
        if value < Decimal::ZERO {
            return Err(invalid(field, "Value cannot be negative"));
        }
    }
    if scenario.vacancy_rate < Decimal::ZERO || scenario.vacancy_rate > HUNDRED {
        return Err(invalid(
            "vacancy_rate",
            "Vacancy rate must be between 0 and 100",
        ));
    }
    if scenario.appreciation_rate <= -HUNDRED {
        return Err(invalid(
            "appreciation_rate",
            "Appreciation rate must be greater than -100%",
        ));
    }
    if scenario.stock_return_rate <= -HUNDRED {
        return Err(invalid(
            "stock_return_rate",
            "Stock return rate must be greater than -100%",
        ));
    }
    if scenario.years == 0 {
        return Err(invalid("years", "Holding period must be at least 1 year"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn invalid(field: &str, reason: &str) -> RealvestError {
    RealvestError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

fn check_loan_consistency(scenario: &ScenarioInput, warnings: &mut Vec<String>) {
    let implied = scenario.purchase_price - scenario.down_payment;
    if (scenario.loan_amount - implied).abs() > CONSISTENCY_TOLERANCE {
        warnings.push(format!(
            "loan_amount ({}) differs from purchase_price - down_payment ({}); \
             results are computed from the fields as given",
            scenario.loan_amount, implied
        ));
    }
}

/// Per-metric graceful degradation: a zero denominator turns the one
/// affected metric into `None` with a warning, while any other error
/// still fails the whole request.
fn degrade<T>(
    result: RealvestResult<T>,
    warnings: &mut Vec<String>,
) -> RealvestResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ RealvestError::DivisionUndefined { .. }) => {
            warnings.push(format!("Metric reported as undefined: {e}"));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

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
    fn test_reference_scenario_bundle() {
        let output = calculate(&sample_scenario()).unwrap();
        let r = &output.result;

        assert!((r.monthly_payment - dec!(1516.96)).abs() < dec!(0.05));
        assert_eq!(r.noi, dec!(17100));
        assert_eq!(r.cap_rate.unwrap(), dec!(5.7));
        assert!((r.cash_flow - dec!(-1103.52)).abs() < dec!(0.5));
        assert!((r.cash_on_cash.unwrap() - dec!(-1.84)).abs() < dec!(0.01));
        assert!((r.stock_value - dec!(129535.50)).abs() < dec!(1));
        assert!(r.dscr.unwrap() < Decimal::ONE);
        assert!(r.irr_converged);
        // Leveraged appreciation pushes the IRR well above the 8%
        // stock alternative, so the NPV at 8% is positive.
        assert!(r.npv > Decimal::ZERO);
        let irr = r.irr.unwrap();
        assert!(irr > dec!(10) && irr < dec!(13), "IRR {irr}");
    }

    #[test]
    fn test_result_is_deterministic() {
        let a = calculate(&sample_scenario()).unwrap();
        let b = calculate(&sample_scenario()).unwrap();
        assert_eq!(
            serde_json::to_value(&a.result).unwrap(),
            serde_json::to_value(&b.result).unwrap()
        );
    }

    #[test]
    fn test_zero_down_payment_degrades_cash_on_cash() {
        let mut scenario = sample_scenario();
        scenario.down_payment = dec!(0);
        scenario.loan_amount = dec!(300000);

        let output = calculate(&scenario).unwrap();
        assert!(output.result.cash_on_cash.is_none());
        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("undefined")));
        // Everything else still computes
        assert!(output.result.monthly_payment > Decimal::ZERO);
        assert_eq!(output.result.noi, dec!(17100));
    }

    #[test]
    fn test_unlevered_scenario_degrades_dscr() {
        let mut scenario = sample_scenario();
        scenario.down_payment = dec!(300000);
        scenario.loan_amount = dec!(0);

        let output = calculate(&scenario).unwrap();
        let r = &output.result;
        assert_eq!(r.monthly_payment, Decimal::ZERO);
        assert!(r.dscr.is_none());
        assert_eq!(r.cash_flow, r.noi);
    }

    #[test]
    fn test_loan_mismatch_warns_but_computes() {
        let mut scenario = sample_scenario();
        scenario.loan_amount = dec!(200000);

        let output = calculate(&scenario).unwrap();
        assert!(output.warnings.iter().any(|w| w.contains("loan_amount")));
        // Metrics follow the fields as given, not the implied loan
        let expected = amortization::monthly_payment(dec!(200000), dec!(6.5), 30).unwrap();
        assert_eq!(output.result.monthly_payment, expected);
    }

    #[test]
    fn test_holding_period_at_loan_maturity() {
        let mut scenario = sample_scenario();
        scenario.years = 30;
        let output = calculate(&scenario).unwrap();
        let series = project(&scenario).unwrap().result;

        // Sale at maturity: the loan is fully repaid, so final equity
        // is the appreciated value with no debt offset
        let sale_equity = valuation::equity_from_sale(
            dec!(300000),
            dec!(3),
            30,
            dec!(240000),
            dec!(6.5),
            30,
        )
        .unwrap();
        assert_eq!(series[29].equity, sale_equity);
        assert_eq!(
            amortization::remaining_balance(dec!(240000), dec!(6.5), 30, 360).unwrap(),
            Decimal::ZERO
        );
        // Discounted at the 8% stock alternative, the long-dated sale
        // just fails to repay the committed capital: NPV is slightly
        // negative, and the IRR lands just under 8%.
        assert!(output.result.npv < Decimal::ZERO);
        assert!(output.result.npv.abs() < dec!(1000), "NPV {}", output.result.npv);
        assert!(output.result.irr_converged);
        let irr = output.result.irr.unwrap();
        assert!(irr > dec!(7) && irr < dec!(8), "IRR {irr}");
    }

    #[test]
    fn test_rejects_zero_purchase_price() {
        let mut scenario = sample_scenario();
        scenario.purchase_price = dec!(0);
        assert!(matches!(
            calculate(&scenario),
            Err(RealvestError::InvalidInput { field, .. }) if field == "purchase_price"
        ));
    }

    #[test]
    fn test_rejects_down_payment_above_price() {
        let mut scenario = sample_scenario();
        scenario.down_payment = dec!(400000);
        assert!(calculate(&scenario).is_err());
    }

    #[test]
    fn test_rejects_vacancy_above_100() {
        let mut scenario = sample_scenario();
        scenario.vacancy_rate = dec!(101);
        assert!(matches!(
            calculate(&scenario),
            Err(RealvestError::InvalidInput { field, .. }) if field == "vacancy_rate"
        ));
    }

    #[test]
    fn test_rejects_zero_holding_period() {
        let mut scenario = sample_scenario();
        scenario.years = 0;
        assert!(calculate(&scenario).is_err());
    }

    #[test]
    fn test_extreme_loan_term_errors_instead_of_panicking() {
        let mut scenario = sample_scenario();
        scenario.loan_years = 3000;
        assert!(matches!(
            calculate(&scenario),
            Err(RealvestError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_extreme_holding_period_errors_instead_of_panicking() {
        let mut scenario = sample_scenario();
        scenario.years = 2000;
        assert!(matches!(
            calculate(&scenario),
            Err(RealvestError::NumericOverflow { .. })
        ));
        assert!(project(&scenario).is_err());
    }

    #[test]
    fn test_negative_noi_warns() {
        let mut scenario = sample_scenario();
        scenario.rent = dec!(300);
        let output = calculate(&scenario).unwrap();
        assert!(output.result.noi < Decimal::ZERO);
        assert!(output.warnings.iter().any(|w| w.contains("negative NOI")));
    }

    #[test]
    fn test_projection_matches_calculation() {
        let scenario = sample_scenario();
        let calc = calculate(&scenario).unwrap();
        let series = project(&scenario).unwrap().result;

        assert_eq!(series.len(), 10);
        assert_eq!(
            series[9].cumulative_cash_flow,
            calc.result.cash_flow * dec!(10)
        );
        assert_eq!(series[9].stock_value, calc.result.stock_value);
    }
}
