//! Runtime configuration resolved from environment variables
//!
//! Recognised variables:
//!   RATE_ORIGINATION_FEE_PCT, RATE_FLAT_FEES, RATE_DEFAULT_PRINCIPAL,
//!   RATE_CATALOG_PATH, RATE_OBSERVATIONS_PATH
//! Unset or unparseable values fall back to the built-in defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use log::warn;

use crate::catalog::{load_catalog, ProductCatalog};
use crate::error::Result;
use crate::pricing::{FeeAssumptions, RateEngine};
use crate::quote::{QuoteRunner, DEFAULT_PRINCIPAL};

/// Deployment-wide settings for the engine and its data sources
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fees: FeeAssumptions,
    /// Loan amount for display quotes
    pub default_principal: f64,
    /// products.csv override; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    pub observations_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fees: FeeAssumptions::default(),
            default_principal: DEFAULT_PRINCIPAL,
            catalog_path: None,
            observations_path: None,
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();

        Self {
            fees: FeeAssumptions {
                origination_fee_pct: parse_or(&lookup, "RATE_ORIGINATION_FEE_PCT", defaults.fees.origination_fee_pct),
                flat_fees: parse_or(&lookup, "RATE_FLAT_FEES", defaults.fees.flat_fees),
            },
            default_principal: parse_or(&lookup, "RATE_DEFAULT_PRINCIPAL", defaults.default_principal),
            catalog_path: lookup("RATE_CATALOG_PATH").map(PathBuf::from),
            observations_path: lookup("RATE_OBSERVATIONS_PATH").map(PathBuf::from),
        }
    }

    /// Configured catalog, or the built-in products
    pub fn catalog(&self) -> Result<ProductCatalog> {
        match &self.catalog_path {
            Some(path) => load_catalog(path),
            None => Ok(ProductCatalog::default_products()),
        }
    }

    pub fn engine(&self) -> Result<RateEngine> {
        RateEngine::new(self.fees)
    }

    pub fn runner(&self) -> Result<QuoteRunner> {
        Ok(QuoteRunner::new(self.engine()?, self.catalog()?))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}
