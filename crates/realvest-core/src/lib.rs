//! Compare a leveraged real-estate purchase against an equivalent
//! stock-market investment over a holding period.
//!
//! The engine is a pure function of a [`types::ScenarioInput`]: no
//! shared state, no I/O, safe to call concurrently for independent
//! scenarios. [`analysis::calculate`] produces the metric bundle and
//! [`analysis::project`] the year-by-year series for charting.

pub mod amortization;
pub mod analysis;
pub mod error;
pub mod income;
pub mod market;
pub mod projection;
pub mod types;
pub mod valuation;

pub use error::RealvestError;
pub use types::*;

/// Standard result type for all realvest operations
pub type RealvestResult<T> = Result<T, RealvestError>;
