//! Note rate derivation from a benchmark index and product spread

use crate::error::{ensure_finite, Result};

/// Quoting granularity for mortgage rates (1/8 of a percentage point)
pub const RATE_INCREMENT: f64 = 0.125;

/// Round a percent rate to the nearest eighth of a point
pub fn round_to_eighth(rate_pct: f64) -> f64 {
    (rate_pct * 8.0).round() / 8.0
}

/// Derive the borrower-facing note rate from an index value and a signed spread
///
/// Negative results are returned as-is; callers must not assume the note
/// rate is non-negative.
pub fn derive_note_rate(index_rate: f64, spread: f64) -> Result<f64> {
    let index_rate = ensure_finite("index_rate", index_rate)?;
    let spread = ensure_finite("spread", spread)?;
    Ok(round_to_eighth(index_rate + spread))
}

/// Round to 3 decimal places, the display precision for rates and APRs
pub fn round_3dp(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
