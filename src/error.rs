//! Error types for rate, payment and APR calculations

use thiserror::Error;

/// Errors raised by the rate engine and its data loaders
#[derive(Debug, Error)]
pub enum RateError {
    /// Loan term must be between one month and the maximum term
    #[error("invalid term: {term_months} months (term must be between 1 and 1200 months)")]
    InvalidTerm { term_months: u32 },

    /// An input was NaN or infinite
    #[error("{field} must be a finite number, got {value}")]
    NonFiniteInput { field: &'static str, value: f64 },

    /// Periodic rate at or below -100% makes the amortization formula meaningless
    #[error("annual rate {annual_rate_pct}% is out of range")]
    RateOutOfRange { annual_rate_pct: f64 },

    /// Fee assumptions were negative or non-finite
    #[error("invalid fee assumptions: origination {origination_fee_pct}%, flat fees {flat_fees}")]
    InvalidFees {
        origination_fee_pct: f64,
        flat_fees: f64,
    },

    /// Financed fees leave nothing to disburse
    #[error("fees of {total_fees:.2} consume the entire principal of {principal:.2}")]
    FeesExceedPrincipal { principal: f64, total_fees: f64 },

    /// No observation for the series and no fallback available
    #[error("no observation available for index series {series}")]
    MissingIndex { series: String },

    /// Malformed catalog or observation data
    #[error("invalid data: {0}")]
    Data(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RateError>;

/// Reject NaN and infinities with a field-specific error
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RateError::NonFiniteInput { field, value })
    }
}
