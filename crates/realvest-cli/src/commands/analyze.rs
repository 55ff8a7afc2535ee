use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use realvest_core::analysis;
use realvest_core::types::ScenarioInput;

use crate::input;

/// Scenario fields, shared by `analyze` and `series`. Either provide
/// `--input` / piped JSON, or every individual flag.
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to a JSON or YAML scenario file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property acquisition price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Cash invested up front
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Financed amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual mortgage interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Mortgage term in years
    #[arg(long)]
    pub loan_years: Option<u32>,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual insurance premium
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Annual maintenance allowance
    #[arg(long)]
    pub maintenance: Option<Decimal>,

    /// Vacancy loss in percent of gross rent
    #[arg(long)]
    pub vacancy_rate: Option<Decimal>,

    /// Monthly rental income
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Annual property appreciation rate in percent (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    pub appreciation_rate: Option<Decimal>,

    /// Annual return of the stock alternative in percent
    #[arg(long, allow_hyphen_values = true)]
    pub stock_return_rate: Option<Decimal>,

    /// Holding period in years
    #[arg(long)]
    pub years: Option<u32>,
}

/// Arguments for the full metric bundle
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

/// Arguments for the year-by-year projection
#[derive(Args)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = resolve_scenario(args.scenario)?;
    let output = analysis::calculate(&scenario)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_series(args: SeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = resolve_scenario(args.scenario)?;
    let output = analysis::project(&scenario)?;
    Ok(serde_json::to_value(output)?)
}

fn resolve_scenario(args: ScenarioArgs) -> Result<ScenarioInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    Ok(ScenarioInput {
        purchase_price: args
            .purchase_price
            .ok_or("--purchase-price is required (or provide --input)")?,
        down_payment: args
            .down_payment
            .ok_or("--down-payment is required (or provide --input)")?,
        loan_amount: args
            .loan_amount
            .ok_or("--loan-amount is required (or provide --input)")?,
        interest_rate: args
            .interest_rate
            .ok_or("--interest-rate is required (or provide --input)")?,
        loan_years: args
            .loan_years
            .ok_or("--loan-years is required (or provide --input)")?,
        property_tax: args
            .property_tax
            .ok_or("--property-tax is required (or provide --input)")?,
        insurance: args
            .insurance
            .ok_or("--insurance is required (or provide --input)")?,
        maintenance: args
            .maintenance
            .ok_or("--maintenance is required (or provide --input)")?,
        vacancy_rate: args
            .vacancy_rate
            .ok_or("--vacancy-rate is required (or provide --input)")?,
        rent: args.rent.ok_or("--rent is required (or provide --input)")?,
        appreciation_rate: args
            .appreciation_rate
            .ok_or("--appreciation-rate is required (or provide --input)")?,
        stock_return_rate: args
            .stock_return_rate
            .ok_or("--stock-return-rate is required (or provide --input)")?,
        years: args.years.ok_or("--years is required (or provide --input)")?,
    })
}
