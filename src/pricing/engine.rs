//! Rate engine: note rate, payment and APR for a single quote

use serde::{Deserialize, Serialize};

use super::apr::{AprSolution, AprSolver, FeeAssumptions};
use super::note_rate::derive_note_rate;
use super::payment::{amortization_schedule, monthly_payment, AmortizationRow};
use crate::error::{RateError, Result};

/// Inputs for one quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    /// Benchmark index value in percent (e.g. 6.875)
    pub index_rate: f64,
    /// Signed product spread in percentage points
    pub spread: f64,
    /// Loan amount in currency units
    pub principal: f64,
    pub term_months: u32,
}

impl RateQuote {
    pub fn new(index_rate: f64, spread: f64, principal: f64, term_months: u32) -> Self {
        Self {
            index_rate,
            spread,
            principal,
            term_months,
        }
    }

    /// Index plus spread, rounded to the nearest eighth
    pub fn note_rate(&self) -> Result<f64> {
        derive_note_rate(self.index_rate, self.spread)
    }
}

/// Computed payment and APR for a quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub note_rate: f64,
    pub monthly_payment: f64,
    /// Principal net of financed fees
    pub amount_financed: f64,
    pub apr: AprSolution,
}

impl PaymentResult {
    /// APR in percent, 3 decimal places
    pub fn apr(&self) -> f64 {
        self.apr.apr()
    }
}

/// Stateless calculator configured with deployment-wide fee assumptions
#[derive(Debug, Clone, Default)]
pub struct RateEngine {
    fees: FeeAssumptions,
    solver: AprSolver,
}

impl RateEngine {
    pub fn new(fees: FeeAssumptions) -> Result<Self> {
        fees.validate()?;
        Ok(Self {
            fees,
            solver: AprSolver::default(),
        })
    }

    /// Override the APR solver settings
    pub fn with_solver(mut self, solver: AprSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn fees(&self) -> &FeeAssumptions {
        &self.fees
    }

    /// Price a quote: derive the note rate, then payment, then APR
    pub fn quote(&self, quote: &RateQuote) -> Result<PaymentResult> {
        let note_rate = quote.note_rate()?;
        self.price(quote.principal, note_rate, quote.term_months)
    }

    /// Payment and APR at an already-derived note rate
    pub fn price(&self, principal: f64, note_rate: f64, term_months: u32) -> Result<PaymentResult> {
        let payment = monthly_payment(principal, note_rate, term_months)?;

        if principal <= 0.0 {
            return Ok(PaymentResult {
                note_rate,
                monthly_payment: 0.0,
                amount_financed: 0.0,
                apr: AprSolution::Converged {
                    apr: 0.0,
                    iterations: 0,
                },
            });
        }

        let amount_financed = self.fees.amount_financed(principal);
        if amount_financed <= 0.0 {
            return Err(RateError::FeesExceedPrincipal {
                principal,
                total_fees: self.fees.total(principal),
            });
        }

        let apr = self.solver.solve(payment, term_months, amount_financed, note_rate)?;

        Ok(PaymentResult {
            note_rate,
            monthly_payment: payment,
            amount_financed,
            apr,
        })
    }

    /// Full amortization schedule for a quote at its note rate
    pub fn schedule(&self, quote: &RateQuote) -> Result<Vec<AmortizationRow>> {
        amortization_schedule(quote.principal, quote.note_rate()?, quote.term_months)
    }
}
