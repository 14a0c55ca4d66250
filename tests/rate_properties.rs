//! End-to-end checks of the rate engine against the quoting conventions
//! used by the rate display widgets.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use rate_engine::pricing::{
    amortization_schedule, calculate_apr, derive_note_rate, monthly_payment, monthly_rate, RATE_INCREMENT,
};
use rate_engine::market::load_observations_from_reader;
use rate_engine::{FeeAssumptions, IndexSeries, QuoteRunner, RateEngine, RateError, RateQuote};

#[test]
fn note_rates_land_on_eighths() {
    let indices = [0.0, 1.234, 3.3333, 6.75, 6.876, 7.0625, 11.99];
    let spreads = [-1.0, -0.375, -0.125, 0.0, 0.0625, 0.3, 2.25];

    for index in indices {
        for spread in spreads {
            let rate = derive_note_rate(index, spread).unwrap();
            let eighths = rate / RATE_INCREMENT;
            assert_abs_diff_eq!(eighths, eighths.round(), epsilon = 1e-9);
            assert!((rate - (index + spread)).abs() <= RATE_INCREMENT / 2.0 + 1e-12);
        }
    }
}

#[test]
fn zero_rate_payment_is_principal_over_term() {
    for principal in [1.0, 95_000.0, 340_000.0, 1_250_000.0] {
        for term in [1, 60, 180, 360, 480] {
            let payment = monthly_payment(principal, 0.0, term).unwrap();
            assert_relative_eq!(payment, principal / term as f64, max_relative = 1e-12);
        }
    }
}

#[test]
fn payments_fully_amortize_the_loan() {
    for (principal, rate, term) in [(340_000.0, 6.625, 360), (150_000.0, 3.25, 180), (999_999.0, 14.875, 480)] {
        let payment = monthly_payment(principal, rate, term).unwrap();
        let r = monthly_rate(rate);

        let mut balance = principal;
        for _ in 0..term {
            balance = balance + balance * r - payment;
        }
        assert!(balance.abs() < 0.01, "Balance after {} payments: {}", term, balance);

        let schedule = amortization_schedule(principal, rate, term).unwrap();
        assert_abs_diff_eq!(schedule.last().unwrap().ending_balance, 0.0, epsilon = 0.01);
    }
}

#[test]
fn apr_never_below_nominal_with_fees() {
    let engine = RateEngine::default();
    for rate in [3.0, 5.5, 6.875, 8.125, 12.0] {
        for term in [120, 180, 240, 360] {
            let result = engine.price(500_000.0, rate, term).unwrap();
            assert!(result.apr.is_converged());
            assert!(result.apr() >= rate, "APR {} below nominal {}", result.apr(), rate);
        }
    }
}

#[test]
fn standard_loan_apr_converges_in_range() {
    let solution = calculate_apr(340_000.0, 6.875, 360, 1.0, 3_500.0).unwrap();
    assert!(solution.is_converged());
    assert!(solution.apr() > 6.875);
    assert!(solution.apr() < 7.5);
}

#[test]
fn default_thirty_year_scenario() {
    let engine = RateEngine::new(FeeAssumptions::default()).unwrap();
    let result = engine.quote(&RateQuote::new(6.75, -0.125, 340_000.0, 360)).unwrap();

    assert_eq!(result.note_rate, 6.625);
    assert_abs_diff_eq!(result.monthly_payment, 2176.98, epsilon = 1.0);
    // $3,400 origination + $3,500 flat
    assert_abs_diff_eq!(result.amount_financed, 340_000.0 - 6_900.0, epsilon = 1e-6);
    assert!(result.apr() > 6.63 && result.apr() < 6.88, "APR {}", result.apr());
}

#[test]
fn single_month_term() {
    let payment = monthly_payment(50_000.0, 7.2, 1).unwrap();
    assert_relative_eq!(payment, 50_000.0 * (1.0 + 0.072 / 12.0), max_relative = 1e-12);

    let solution = calculate_apr(50_000.0, 7.2, 1, 0.0, 0.0).unwrap();
    assert!(solution.is_converged());
    assert_abs_diff_eq!(solution.apr(), 7.2, epsilon = 1e-9);
}

#[test]
fn repeated_calls_are_bit_identical() {
    let engine = RateEngine::default();
    let quote = RateQuote::new(6.6, 0.125, 287_500.0, 300);

    let first = engine.quote(&quote).unwrap();
    for _ in 0..10 {
        let again = engine.quote(&quote).unwrap();
        assert_eq!(first.monthly_payment.to_bits(), again.monthly_payment.to_bits());
        assert_eq!(first.apr().to_bits(), again.apr().to_bits());
    }
}

#[test]
fn zero_term_is_rejected_everywhere() {
    assert!(matches!(monthly_payment(1_000.0, 5.0, 0), Err(RateError::InvalidTerm { .. })));
    assert!(matches!(calculate_apr(1_000.0, 5.0, 0, 1.0, 0.0), Err(RateError::InvalidTerm { .. })));
    assert!(matches!(amortization_schedule(1_000.0, 5.0, 0), Err(RateError::InvalidTerm { .. })));
}

#[test]
fn catalog_quotes_from_observation_file() {
    let data = "\
series,date,value
MORTGAGE30US,2025-06-19,6.81
MORTGAGE30US,2025-06-26,6.77
MORTGAGE15US,2025-06-19,5.96
MORTGAGE15US,2025-06-26,5.89
";
    let snapshot = load_observations_from_reader(data.as_bytes()).unwrap();
    let runner = QuoteRunner::default();
    let quotes: Vec<_> = runner
        .quote_all(&snapshot, 340_000.0)
        .into_iter()
        .map(|q| q.unwrap())
        .collect();

    assert_eq!(quotes.len(), 8);

    // DGS10 is absent, so the ARM is priced off the 30-year series and says so
    let arm = quotes.iter().find(|q| q.series == IndexSeries::Dgs10).unwrap();
    assert!(arm.index.is_fallback());
    assert_eq!(arm.rate, "9.000");

    let conv15 = quotes.iter().find(|q| q.product_id == "conv-15").unwrap();
    assert_eq!(conv15.rate, "5.875");
    assert_eq!(conv15.change, "-0.125");
}
