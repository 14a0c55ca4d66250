//! Annual Percentage Rate (APR) calculation
//!
//! The APR is the annual rate at which the present value of the scheduled
//! payments equals the amount actually disbursed (principal net of financed
//! fees). This is a simplified approximation for rate display, not a
//! regulatory Truth-in-Lending computation.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::note_rate::round_3dp;
use super::payment::{monthly_payment, monthly_rate, validate_loan, validate_term, MONTHS_PER_YEAR};
use crate::error::{RateError, Result};

/// Default origination fee (percent of principal)
pub const DEFAULT_ORIGINATION_FEE_PCT: f64 = 1.0;

/// Default flat closing costs (currency units)
pub const DEFAULT_FLAT_FEES: f64 = 3_500.0;

/// Financed closing cost assumptions applied to every quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeAssumptions {
    /// Origination fee as a percent of principal (1.0 = 1%)
    pub origination_fee_pct: f64,
    /// Flat fees in currency units
    pub flat_fees: f64,
}

impl FeeAssumptions {
    pub fn new(origination_fee_pct: f64, flat_fees: f64) -> Result<Self> {
        let fees = Self {
            origination_fee_pct,
            flat_fees,
        };
        fees.validate()?;
        Ok(fees)
    }

    /// No financed fees (APR equals the note rate)
    pub fn none() -> Self {
        Self {
            origination_fee_pct: 0.0,
            flat_fees: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if valid(self.origination_fee_pct) && valid(self.flat_fees) {
            Ok(())
        } else {
            Err(RateError::InvalidFees {
                origination_fee_pct: self.origination_fee_pct,
                flat_fees: self.flat_fees,
            })
        }
    }

    /// Total financed fees for a given principal
    pub fn total(&self, principal: f64) -> f64 {
        principal * self.origination_fee_pct / 100.0 + self.flat_fees
    }

    /// Principal net of financed fees
    pub fn amount_financed(&self, principal: f64) -> f64 {
        principal - self.total(principal)
    }
}

impl Default for FeeAssumptions {
    fn default() -> Self {
        Self {
            origination_fee_pct: DEFAULT_ORIGINATION_FEE_PCT,
            flat_fees: DEFAULT_FLAT_FEES,
        }
    }
}

/// Outcome of the APR solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AprSolution {
    /// PV matched the amount financed within tolerance
    Converged {
        /// APR in percent, 3 decimal places
        apr: f64,
        iterations: u32,
    },
    /// Iteration budget exhausted; `best_estimate` had the smallest residual seen
    NotConverged {
        best_estimate: f64,
        /// PV minus amount financed at the best estimate
        residual: f64,
        iterations: u32,
    },
}

impl AprSolution {
    /// APR in percent (the best estimate when not converged)
    pub fn apr(&self) -> f64 {
        match *self {
            AprSolution::Converged { apr, .. } => apr,
            AprSolution::NotConverged { best_estimate, .. } => best_estimate,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, AprSolution::Converged { .. })
    }

    pub fn iterations(&self) -> u32 {
        match *self {
            AprSolution::Converged { iterations, .. } => iterations,
            AprSolution::NotConverged { iterations, .. } => iterations,
        }
    }
}

/// Bounds on the monthly periodic rate searched by the solver
const MIN_MONTHLY_RATE: f64 = -0.5;
const MAX_MONTHLY_RATE: f64 = 1.0;

/// Solver for the periodic rate equating an annuity's PV to a target amount
///
/// Newton-Raphson from the nominal rate, falling back to bisection over
/// `[MIN_MONTHLY_RATE, MAX_MONTHLY_RATE]` when Newton stalls. The bisection
/// budget is derived from the bracket width and `rate_tolerance`.
#[derive(Debug, Clone, Copy)]
pub struct AprSolver {
    /// Acceptable |PV - amount financed| in currency units
    pub pv_tolerance: f64,
    /// Bisection stops once the bracket is narrower than this (monthly rate)
    pub rate_tolerance: f64,
    pub max_newton_iterations: u32,
}

impl Default for AprSolver {
    fn default() -> Self {
        Self {
            pv_tolerance: 0.01, // one cent
            rate_tolerance: 1e-12,
            max_newton_iterations: 50,
        }
    }
}

/// Tracks the closest rate seen so far
#[derive(Debug, Clone, Copy)]
struct Best {
    rate: f64,
    residual: f64,
}

impl Best {
    fn offer(&mut self, rate: f64, residual: f64) {
        if residual.abs() < self.residual.abs() {
            self.rate = rate;
            self.residual = residual;
        }
    }
}

impl AprSolver {
    /// Solve for the APR given a level payment and the amount financed
    ///
    /// Fails only on a term outside `1..=MAX_TERM_MONTHS`; running out of
    /// iterations is reported through `AprSolution::NotConverged`.
    pub fn solve(&self, payment: f64, term_months: u32, amount_financed: f64, initial_rate_pct: f64) -> Result<AprSolution> {
        validate_term(term_months)?;

        let mut iterations = 0u32;
        let mut rate = monthly_rate(initial_rate_pct).clamp(MIN_MONTHLY_RATE, MAX_MONTHLY_RATE);
        let mut best = Best {
            rate,
            residual: f64::INFINITY,
        };

        for _ in 0..self.max_newton_iterations {
            iterations += 1;
            let (pv, dpv) = pv_and_derivative(payment, rate, term_months);
            let residual = pv - amount_financed;
            best.offer(rate, residual);

            if residual.abs() < self.pv_tolerance {
                return Ok(self.converged(rate, iterations));
            }

            if dpv.abs() < 1e-20 || !residual.is_finite() {
                break;
            }

            let next = (rate - residual / dpv).clamp(MIN_MONTHLY_RATE, MAX_MONTHLY_RATE);
            if next == rate {
                break;
            }
            rate = next;
        }

        debug!("APR Newton iteration stalled after {} steps, falling back to bisection", iterations);
        Ok(self.bisect(payment, term_months, amount_financed, iterations, best))
    }

    fn bisect(
        &self,
        payment: f64,
        term_months: u32,
        amount_financed: f64,
        mut iterations: u32,
        mut best: Best,
    ) -> AprSolution {
        let mut low = MIN_MONTHLY_RATE;
        let mut high = MAX_MONTHLY_RATE;

        let residual_low = pv_at_rate(payment, low, term_months) - amount_financed;
        let residual_high = pv_at_rate(payment, high, term_months) - amount_financed;
        best.offer(low, residual_low);
        best.offer(high, residual_high);

        // PV falls as the rate rises, so a root needs residual_low >= 0 >= residual_high
        if residual_low < 0.0 || residual_high > 0.0 {
            return self.not_converged(best, iterations);
        }

        let budget = ((high - low) / self.rate_tolerance).log2().ceil().max(1.0) as u32;

        for _ in 0..budget {
            iterations += 1;
            let mid = (low + high) / 2.0;
            let residual = pv_at_rate(payment, mid, term_months) - amount_financed;
            best.offer(mid, residual);

            if residual.abs() < self.pv_tolerance {
                return self.converged(mid, iterations);
            }

            if residual > 0.0 {
                low = mid;
            } else {
                high = mid;
            }
        }

        self.not_converged(best, iterations)
    }

    fn converged(&self, rate: f64, iterations: u32) -> AprSolution {
        debug!("APR converged in {} iterations", iterations);
        AprSolution::Converged {
            apr: round_3dp(rate * MONTHS_PER_YEAR * 100.0),
            iterations,
        }
    }

    fn not_converged(&self, best: Best, iterations: u32) -> AprSolution {
        warn!(
            "APR solver did not converge after {} iterations (residual {:.4})",
            iterations, best.residual
        );
        AprSolution::NotConverged {
            best_estimate: round_3dp(best.rate * MONTHS_PER_YEAR * 100.0),
            residual: best.residual,
            iterations,
        }
    }
}

/// PV of level end-of-month payments and its derivative with respect to the rate
fn pv_and_derivative(payment: f64, rate: f64, term_months: u32) -> (f64, f64) {
    let v = 1.0 / (1.0 + rate);
    let mut discount = 1.0;
    let mut pv = 0.0;
    let mut dpv = 0.0;

    for t in 1..=term_months {
        discount *= v;
        pv += payment * discount;
        dpv -= t as f64 * payment * discount * v;
    }

    (pv, dpv)
}

fn pv_at_rate(payment: f64, rate: f64, term_months: u32) -> f64 {
    pv_and_derivative(payment, rate, term_months).0
}

/// Calculate the APR for a loan with financed fees
///
/// A non-positive principal short-circuits to an APR of zero.
pub fn calculate_apr(
    principal: f64,
    annual_rate_pct: f64,
    term_months: u32,
    origination_fee_pct: f64,
    flat_fees: f64,
) -> Result<AprSolution> {
    validate_loan(principal, annual_rate_pct, term_months)?;
    let fees = FeeAssumptions::new(origination_fee_pct, flat_fees)?;

    if principal <= 0.0 {
        return Ok(AprSolution::Converged {
            apr: 0.0,
            iterations: 0,
        });
    }

    let amount_financed = fees.amount_financed(principal);
    if amount_financed <= 0.0 {
        return Err(RateError::FeesExceedPrincipal {
            principal,
            total_fees: fees.total(principal),
        });
    }

    let payment = monthly_payment(principal, annual_rate_pct, term_months)?;
    AprSolver::default().solve(payment, term_months, amount_financed, annual_rate_pct)
}
