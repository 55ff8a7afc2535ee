use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};

use realvest_core::amortization;

/// Arguments for the mortgage payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Financed amount
    #[arg(long)]
    pub loan_amount: Decimal,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub interest_rate: Decimal,

    /// Loan term in years
    #[arg(long)]
    pub loan_years: u32,

    /// Also report the remaining balance after this many payments
    #[arg(long)]
    pub months_paid: Option<u32>,

    /// Include the year-end amortization schedule
    #[arg(long)]
    pub schedule: bool,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment =
        amortization::monthly_payment(args.loan_amount, args.interest_rate, args.loan_years)?;

    let mut result = Map::new();
    result.insert("monthly_payment".into(), serde_json::to_value(payment)?);
    result.insert(
        "annual_debt_service".into(),
        serde_json::to_value(payment * dec!(12))?,
    );

    if let Some(months) = args.months_paid {
        let balance = amortization::remaining_balance(
            args.loan_amount,
            args.interest_rate,
            args.loan_years,
            months,
        )?;
        result.insert("remaining_balance".into(), serde_json::to_value(balance)?);
    }

    if args.schedule {
        let rows =
            amortization::amortization_schedule(args.loan_amount, args.interest_rate, args.loan_years)?;
        let year_ends: Vec<&amortization::AmortizationRow> =
            rows.iter().filter(|r| r.month % 12 == 0).collect();
        result.insert("schedule".into(), serde_json::to_value(year_ends)?);
    }

    Ok(Value::Object(result))
}
