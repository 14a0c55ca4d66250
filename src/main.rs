//! Rate Engine CLI
//!
//! Command-line interface for pricing quotes, payments, APRs and schedules

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;

use rate_engine::market::{load_observations, loader::DEFAULT_OBSERVATIONS_PATH};
use rate_engine::pricing::{amortization_schedule, calculate_apr, derive_note_rate, monthly_payment, AprSolution};
use rate_engine::{EngineConfig, IndexObservation, IndexSeries, IndexSnapshot, ProductCatalog, QuoteRunner};
use rate_engine::catalog::load_catalog;

#[derive(Debug, Parser)]
#[command(name = "rates", version, about = "Mortgage rate, payment and APR calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Round index + spread to the nearest eighth
    NoteRate {
        /// Index value in percent
        #[arg(long, allow_negative_numbers = true)]
        index: f64,
        /// Spread in percentage points
        #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
        spread: f64,
    },
    /// Monthly principal and interest payment
    Payment(LoanArgs),
    /// APR with financed fees
    Apr {
        #[command(flatten)]
        loan: LoanArgs,
        /// Origination fee, percent of principal (defaults to RATE_ORIGINATION_FEE_PCT or 1.0)
        #[arg(long)]
        origination_fee_pct: Option<f64>,
        /// Flat financed fees (defaults to RATE_FLAT_FEES or 3500)
        #[arg(long)]
        flat_fees: Option<f64>,
    },
    /// Amortization schedule as CSV
    Schedule {
        #[command(flatten)]
        loan: LoanArgs,
        /// Print only the first N months
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Quote every product in the catalog
    Quote(QuoteArgs),
}

#[derive(Debug, clap::Args)]
struct LoanArgs {
    /// Loan amount
    #[arg(short, long)]
    principal: f64,
    /// Annual note rate in percent
    #[arg(short, long, allow_negative_numbers = true)]
    rate: f64,
    /// Term in months
    #[arg(short, long, default_value_t = 360)]
    term: u32,
}

#[derive(Debug, clap::Args)]
struct QuoteArgs {
    /// Product catalog CSV (defaults to RATE_CATALOG_PATH or the built-in catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Index observations CSV (ignored when --index is given)
    #[arg(long)]
    observations: Option<PathBuf>,
    /// Index value as SERIES=VALUE or SERIES=VALUE:PREVIOUS (repeatable)
    #[arg(long = "index", value_parser = parse_index)]
    indices: Vec<IndexObservation>,
    /// Loan amount (defaults to RATE_DEFAULT_PRINCIPAL or 340000)
    #[arg(long)]
    principal: Option<f64>,
    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_index(raw: &str) -> Result<IndexObservation, String> {
    let (series, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SERIES=VALUE, got {:?}", raw))?;
    let parse = |s: &str| s.trim().parse::<f64>().map_err(|e| format!("bad value {:?}: {}", s, e));

    let observation = match values.split_once(':') {
        Some((value, previous)) => IndexObservation::new(IndexSeries::from(series), parse(value)?).with_previous(parse(previous)?),
        None => IndexObservation::new(IndexSeries::from(series), parse(values)?),
    };
    Ok(observation)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env();

    match cli.command {
        Command::NoteRate { index, spread } => {
            let rate = derive_note_rate(index, spread)?;
            println!("{:.3}", rate);
        }
        Command::Payment(loan) => {
            let payment = monthly_payment(loan.principal, loan.rate, loan.term)?;
            println!("{:.2}", payment);
        }
        Command::Apr { loan, origination_fee_pct, flat_fees } => {
            let origination = origination_fee_pct.unwrap_or(config.fees.origination_fee_pct);
            let flat = flat_fees.unwrap_or(config.fees.flat_fees);
            match calculate_apr(loan.principal, loan.rate, loan.term, origination, flat)? {
                AprSolution::Converged { apr, iterations } => {
                    info!("APR converged in {} iterations", iterations);
                    println!("{:.3}", apr);
                }
                AprSolution::NotConverged { best_estimate, residual, .. } => {
                    bail!("APR did not converge (best estimate {:.3}, residual {:.4})", best_estimate, residual);
                }
            }
        }
        Command::Schedule { loan, limit } => {
            let schedule = amortization_schedule(loan.principal, loan.rate, loan.term)?;
            let mut writer = csv::Writer::from_writer(io::stdout());
            for row in schedule.iter().take(limit.unwrap_or(usize::MAX)) {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        Command::Quote(args) => run_quote(args, &config)?,
    }

    Ok(())
}

fn run_quote(args: QuoteArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let catalog = match args.catalog.as_ref().or(config.catalog_path.as_ref()) {
        Some(path) => load_catalog(path).with_context(|| format!("loading catalog {}", path.display()))?,
        None => ProductCatalog::default_products(),
    };

    let snapshot = if args.indices.is_empty() {
        let path = args
            .observations
            .clone()
            .or_else(|| config.observations_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OBSERVATIONS_PATH));
        load_observations(&path).with_context(|| format!("loading observations {}", path.display()))?
    } else {
        IndexSnapshot::from_observations(args.indices)
    };

    let principal = args.principal.unwrap_or(config.default_principal);
    let runner = QuoteRunner::new(config.engine()?, catalog);
    info!("Quoting {} products from {} index series", runner.catalog().len(), snapshot.len());

    let results = runner.quote_all(&snapshot, principal);

    if args.json {
        let quotes: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        println!("{}", serde_json::to_string_pretty(&quotes)?);
    } else {
        println!("{:<22} {:>8} {:>8} {:>9} {:>8}  {}", "Product", "Rate", "APR", "Payment", "Change", "Source");
        println!("{}", "-".repeat(72));
        for quote in results.iter().filter_map(|r| r.as_ref().ok()) {
            let source = if quote.index.is_fallback() { "fallback" } else { "observed" };
            println!(
                "{:<22} {:>8} {:>8} {:>9} {:>8}  {}",
                quote.product_name, quote.rate, quote.apr, quote.monthly_payment, quote.change, source
            );
        }
    }

    let failures: Vec<_> = results
        .iter()
        .zip(runner.catalog().products())
        .filter_map(|(r, product)| r.as_ref().err().map(|e| (product, e)))
        .collect();
    for (product, err) in &failures {
        eprintln!("{}: {}", product.id, err);
    }
    if !failures.is_empty() {
        bail!("{} of {} products failed to quote", failures.len(), results.len());
    }

    Ok(())
}
