use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed in percent units (6.0 = 6%), matching the scenario
/// wire format. Internal maths divides by 100 at the module boundary.
pub type Percent = Decimal;

/// Dimensionless ratios (e.g. 1.2x debt service coverage)
pub type Ratio = Decimal;

/// A single investment scenario: property, loan, income, and market
/// assumptions. Immutable once a calculation begins; every engine call
/// takes the full scenario explicitly, no ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// Property acquisition price
    pub purchase_price: Money,
    /// Cash invested up front
    pub down_payment: Money,
    /// Financed amount. The engine does not enforce
    /// `loan_amount == purchase_price - down_payment`; a mismatch only
    /// produces a warning (consistency is the caller's responsibility).
    pub loan_amount: Money,
    /// Annual mortgage interest rate in percent
    pub interest_rate: Percent,
    /// Mortgage term in years
    pub loan_years: u32,
    /// Annual property tax
    pub property_tax: Money,
    /// Annual insurance premium
    pub insurance: Money,
    /// Annual maintenance allowance
    pub maintenance: Money,
    /// Vacancy and collection loss in percent of gross rent
    pub vacancy_rate: Percent,
    /// Monthly rental income
    pub rent: Money,
    /// Annual property appreciation rate in percent (may be negative)
    pub appreciation_rate: Percent,
    /// Annual return of the stock alternative in percent
    pub stock_return_rate: Percent,
    /// Holding period in years
    pub years: u32,
}

/// The full metric bundle derived from one scenario. Field names follow
/// the established wire format of the calculation API.
///
/// Metrics whose denominator is zero for the given scenario are `None`
/// and omitted from serialization; a warning in the output envelope
/// names the metric. The bundle is never partially populated beyond
/// that per-metric degradation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Monthly mortgage payment
    pub monthly_payment: Money,
    /// Net operating income (annual)
    #[serde(rename = "NOI")]
    pub noi: Money,
    /// NOI as percent of purchase price
    #[serde(rename = "CapRate", skip_serializing_if = "Option::is_none")]
    pub cap_rate: Option<Percent>,
    /// Annual cash flow after debt service
    #[serde(rename = "CashFlow")]
    pub cash_flow: Money,
    /// Annual cash flow as percent of cash invested
    #[serde(rename = "CashOnCash", skip_serializing_if = "Option::is_none")]
    pub cash_on_cash: Option<Percent>,
    /// NOI over annual debt service
    #[serde(rename = "DSCR", skip_serializing_if = "Option::is_none")]
    pub dscr: Option<Ratio>,
    /// Stock-market counterfactual value at the end of the holding period
    #[serde(rename = "StockValue")]
    pub stock_value: Money,
    /// Net present value over the holding period, discounted at the
    /// stock return rate and rounded to the nearest currency unit
    #[serde(rename = "NPV")]
    pub npv: Money,
    /// Internal rate of return in percent
    #[serde(rename = "IRR", skip_serializing_if = "Option::is_none")]
    pub irr: Option<Percent>,
    /// False when the IRR search hit its iteration cap; the reported
    /// IRR is then the best estimate found
    pub irr_converged: bool,
}

/// One year of the holding-period projection. Field names follow the
/// established chart wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeriesPoint {
    pub year: u32,
    /// Cumulative operating cash flow through this year
    #[serde(rename = "cashFlow")]
    pub cumulative_cash_flow: Money,
    /// Appreciated property value minus remaining loan balance
    pub equity: Money,
    /// Value of the stock alternative at this year
    #[serde(rename = "stockValue")]
    pub stock_value: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
