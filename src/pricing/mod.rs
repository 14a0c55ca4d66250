//! Rate engine: note rate derivation, amortization and APR solving

mod note_rate;
mod payment;
mod apr;
mod engine;

pub use note_rate::{derive_note_rate, round_to_eighth, round_3dp, RATE_INCREMENT};
pub use payment::{amortization_schedule, monthly_payment, monthly_rate, present_value, AmortizationRow, MONTHS_PER_YEAR};
pub use apr::{
    calculate_apr, AprSolution, AprSolver, FeeAssumptions,
    DEFAULT_FLAT_FEES, DEFAULT_ORIGINATION_FEE_PCT,
};
pub use engine::{PaymentResult, RateEngine, RateQuote};
