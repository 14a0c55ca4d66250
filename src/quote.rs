//! Batch quoting of a product catalog against an index snapshot
//!
//! Produces the per-product display records consumed by the rate widgets:
//! rate and APR as 3-decimal text, payment in whole currency units and the
//! signed period-over-period change.

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::{LoanProduct, ProductCatalog};
use crate::error::Result;
use crate::market::{IndexSeries, IndexSnapshot, IndexValue};
use crate::pricing::{derive_note_rate, round_3dp, RateEngine};

/// Loan amount used for display quotes when none is supplied
pub const DEFAULT_PRINCIPAL: f64 = 340_000.0;

/// Display record for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuote {
    pub product_id: String,
    pub product_name: String,
    pub series: IndexSeries,
    pub term_months: u32,
    /// Note rate, 3 decimal places
    pub rate: String,
    /// APR, 3 decimal places
    pub apr: String,
    pub apr_converged: bool,
    /// Monthly principal and interest, whole currency units
    pub monthly_payment: i64,
    /// Note rate change since the previous observation, signed, 3 decimal places
    pub change: String,
    /// Index value used and whether it was substituted
    pub index: IndexValue,
}

/// Format a signed change with an explicit sign; zero is always `+0.000`
pub fn format_change(change: f64) -> String {
    let change = round_3dp(change);
    let change = if change == 0.0 { 0.0 } else { change };
    format!("{:+.3}", change)
}

/// Pre-configured engine and catalog for repeated quoting
#[derive(Debug, Clone, Default)]
pub struct QuoteRunner {
    engine: RateEngine,
    catalog: ProductCatalog,
}

impl QuoteRunner {
    pub fn new(engine: RateEngine, catalog: ProductCatalog) -> Self {
        Self { engine, catalog }
    }

    pub fn engine(&self) -> &RateEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Quote a single product
    pub fn quote_product(&self, product: &LoanProduct, snapshot: &IndexSnapshot, principal: f64) -> Result<ProductQuote> {
        let index = snapshot.resolve(&product.series)?;
        let note_rate = derive_note_rate(index.value(), product.spread)?;
        let priced = self.engine.price(principal, note_rate, product.term_months)?;

        if !priced.apr.is_converged() {
            warn!("APR for {} did not converge, displaying best estimate", product.id);
        }

        let change = match index.previous() {
            Some(previous) => note_rate - derive_note_rate(previous, product.spread)?,
            None => 0.0,
        };

        Ok(ProductQuote {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            series: product.series.clone(),
            term_months: product.term_months,
            rate: format!("{:.3}", note_rate),
            apr: format!("{:.3}", priced.apr()),
            apr_converged: priced.apr.is_converged(),
            monthly_payment: priced.monthly_payment.round() as i64,
            change: format_change(change),
            index,
        })
    }

    /// Quote every product in parallel; failures are reported per product
    pub fn quote_all(&self, snapshot: &IndexSnapshot, principal: f64) -> Vec<Result<ProductQuote>> {
        self.catalog
            .products()
            .par_iter()
            .map(|product| self.quote_product(product, snapshot, principal))
            .collect()
    }
}
