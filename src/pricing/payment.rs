//! Level-payment amortization

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, RateError, Result};

/// Months per year for periodic rate conversion
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Convert an annual percent rate to a monthly periodic rate (decimal)
pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / MONTHS_PER_YEAR
}

/// Longest term accepted (100 years)
pub const MAX_TERM_MONTHS: u32 = 1_200;

/// Below this magnitude a monthly rate is treated as zero
pub(crate) const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Reject zero terms and terms beyond `MAX_TERM_MONTHS`
pub(crate) fn validate_term(term_months: u32) -> Result<()> {
    if term_months == 0 || term_months > MAX_TERM_MONTHS {
        return Err(RateError::InvalidTerm { term_months });
    }
    Ok(())
}

/// Validate the common inputs to the payment and APR calculations
pub(crate) fn validate_loan(principal: f64, annual_rate_pct: f64, term_months: u32) -> Result<()> {
    validate_term(term_months)?;
    ensure_finite("principal", principal)?;
    ensure_finite("annual_rate_pct", annual_rate_pct)?;
    if monthly_rate(annual_rate_pct) <= -1.0 {
        return Err(RateError::RateOutOfRange { annual_rate_pct });
    }
    Ok(())
}

/// `(1 + r)^n - 1` without cancellation for small `r`
fn compound_growth_m1(r: f64, n: f64) -> f64 {
    (n * r.ln_1p()).exp_m1()
}

/// Monthly principal-and-interest payment for a fully amortizing loan
///
/// A (near) zero rate falls back to straight-line repayment. A non-positive
/// principal yields a zero payment.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_months: u32) -> Result<f64> {
    validate_loan(principal, annual_rate_pct, term_months)?;

    if principal <= 0.0 {
        return Ok(0.0);
    }

    let r = monthly_rate(annual_rate_pct);
    let n = term_months as f64;
    if r.abs() < ZERO_RATE_EPSILON {
        return Ok(principal / n);
    }

    let growth_m1 = compound_growth_m1(r, n);
    Ok(principal * r * (1.0 + growth_m1) / growth_m1)
}

/// Present value of `term_months` end-of-month payments at a monthly rate
///
/// `monthly_rate` must be above -1.
pub fn present_value(payment: f64, monthly_rate: f64, term_months: u32) -> f64 {
    let n = term_months as f64;
    if monthly_rate.abs() < ZERO_RATE_EPSILON {
        return payment * n;
    }
    // 1 - (1 + r)^-n
    let discount_m1 = -compound_growth_m1(monthly_rate, -n);
    payment * discount_m1 / monthly_rate
}

/// One month of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub beginning_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub ending_balance: f64,
}

/// Split each level payment into interest and principal over the full term
///
/// Balances are not rounded per period, so the final ending balance is zero
/// up to floating point error.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    term_months: u32,
) -> Result<Vec<AmortizationRow>> {
    let payment = monthly_payment(principal, annual_rate_pct, term_months)?;
    let r = monthly_rate(annual_rate_pct);

    let mut balance = principal.max(0.0);
    let mut rows = Vec::with_capacity(term_months as usize);

    for month in 1..=term_months {
        let interest = balance * r;
        let principal_paid = payment - interest;
        let ending_balance = balance - principal_paid;

        rows.push(AmortizationRow {
            month,
            beginning_balance: balance,
            payment,
            interest,
            principal: principal_paid,
            ending_balance,
        });

        balance = ending_balance;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_default_scenario_payment() {
        // $340k at 6.625% over 30 years
        let payment = monthly_payment(340_000.0, 6.625, 360).unwrap();
        assert_abs_diff_eq!(payment, 2176.98, epsilon = 1.0);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        for (p, n) in [(340_000.0, 360), (12_000.0, 12), (1.0, 7)] {
            let payment = monthly_payment(p, 0.0, n).unwrap();
            assert_relative_eq!(payment, p / n as f64, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_single_period() {
        let payment = monthly_payment(10_000.0, 6.0, 1).unwrap();
        assert_relative_eq!(payment, 10_000.0 * 1.005, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = monthly_payment(10_000.0, 6.0, 0).unwrap_err();
        assert!(matches!(err, RateError::InvalidTerm { term_months: 0 }));
    }

    #[test]
    fn test_non_positive_principal() {
        assert_eq!(monthly_payment(0.0, 6.0, 360).unwrap(), 0.0);
        assert_eq!(monthly_payment(-5.0, 6.0, 360).unwrap(), 0.0);
    }

    #[test]
    fn test_rate_out_of_range() {
        assert!(matches!(
            monthly_payment(10_000.0, -1200.0, 12),
            Err(RateError::RateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_tiny_rate_matches_straight_line() {
        let payment = monthly_payment(100_000.0, 1e-14, 360).unwrap();
        assert!(payment.is_finite());
        assert_relative_eq!(payment, 100_000.0 / 360.0, max_relative = 1e-12);

        let payment = monthly_payment(100_000.0, 1e-10, 360).unwrap();
        assert_abs_diff_eq!(payment, 277.7778, epsilon = 1e-4);

        // Just above the straight-line cutoff the formula still holds precision
        let payment = monthly_payment(100_000.0, 1e-6, 360).unwrap();
        assert_relative_eq!(payment, 100_000.0 / 360.0, max_relative = 1e-6);
        assert!(payment > 100_000.0 / 360.0);
    }

    #[test]
    fn test_term_limits() {
        assert!(monthly_payment(100_000.0, 6.0, MAX_TERM_MONTHS).unwrap().is_finite());
        assert!(matches!(
            monthly_payment(100_000.0, 6.0, MAX_TERM_MONTHS + 1),
            Err(RateError::InvalidTerm { .. })
        ));
        assert!(matches!(
            monthly_payment(100_000.0, 6.0, 3_000_000_000),
            Err(RateError::InvalidTerm { .. })
        ));
        assert!(amortization_schedule(100_000.0, 6.0, u32::MAX).is_err());
    }

    #[test]
    fn test_present_value_huge_term_does_not_overflow() {
        let pv = present_value(100.0, 0.005, 2_147_483_648);
        assert_abs_diff_eq!(pv, 100.0 / 0.005, epsilon = 1e-6);
        assert_eq!(present_value(100.0, 0.0, u32::MAX), 100.0 * u32::MAX as f64);
    }

    #[test]
    fn test_negative_rate_payment() {
        // Negative rate: less than straight-line, still positive
        let payment = monthly_payment(340_000.0, -0.375, 360).unwrap();
        assert!(payment > 0.0 && payment < 340_000.0 / 360.0);

        // Just above the -100% monthly boundary
        let payment = monthly_payment(10_000.0, -1199.0, 12).unwrap();
        assert!(payment.is_finite() && payment >= 0.0);
        assert!(matches!(
            monthly_payment(10_000.0, -1200.0, 12),
            Err(RateError::RateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_schedule_pays_off_balance() {
        for (p, rate, n) in [(340_000.0, 6.625, 360), (250_000.0, 5.5, 180), (8_000.0, 12.0, 60)] {
            let schedule = amortization_schedule(p, rate, n).unwrap();
            assert_eq!(schedule.len(), n as usize);

            let last = schedule.last().unwrap();
            assert!(last.ending_balance.abs() < 0.01, "Balance left: {}", last.ending_balance);

            let principal_repaid: f64 = schedule.iter().map(|row| row.principal).sum();
            assert_abs_diff_eq!(principal_repaid, p, epsilon = 0.01);
        }
    }

    #[test]
    fn test_present_value_inverts_payment() {
        let payment = monthly_payment(200_000.0, 7.0, 360).unwrap();
        let pv = present_value(payment, monthly_rate(7.0), 360);
        assert_abs_diff_eq!(pv, 200_000.0, epsilon = 1e-6);
    }
}
