//! Rate Engine - mortgage rate, payment and APR calculations for rate display
//!
//! This library provides:
//! - Note rate derivation from a benchmark index plus product spread
//! - Level-payment amortization and schedules
//! - APR solving with financed fees and explicit convergence reporting
//! - Index observations with a tagged fallback policy for missing series
//! - A product catalog and parallel batch quoting
//! - Environment-driven engine configuration
//!
//! Binaries: `rates` (command-line quoting, payments, APR and schedules) and
//! `lambda_handler` (AWS Lambda Function URL returning product quotes).

pub mod error;
pub mod pricing;
pub mod market;
pub mod catalog;
pub mod quote;
pub mod config;

// Re-export commonly used types
pub use error::{RateError, Result};
pub use pricing::{AprSolution, FeeAssumptions, PaymentResult, RateEngine, RateQuote};
pub use market::{IndexObservation, IndexSeries, IndexSnapshot, IndexValue};
pub use catalog::{LoanProduct, ProductCatalog};
pub use quote::{ProductQuote, QuoteRunner};
pub use config::EngineConfig;
