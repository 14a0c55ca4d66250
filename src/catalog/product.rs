//! Loan products and the product catalog

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{RateError, Result};
use crate::market::IndexSeries;

/// A priced loan product: an index series, a fixed spread and a term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub id: String,
    pub name: String,
    pub series: IndexSeries,
    /// Signed percentage points over the index
    pub spread: f64,
    pub term_months: u32,
}

impl LoanProduct {
    pub fn new(id: &str, name: &str, series: IndexSeries, spread: f64, term_months: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            series,
            spread,
            term_months,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RateError::Data("Product id must not be empty".to_string()));
        }
        if self.term_months == 0 {
            return Err(RateError::Data(format!("Product {} has a zero term", self.id)));
        }
        if !self.spread.is_finite() {
            return Err(RateError::Data(format!("Product {} has a non-finite spread", self.id)));
        }
        Ok(())
    }
}

/// Ordered set of products with unique ids
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCatalog {
    products: Vec<LoanProduct>,
}

impl ProductCatalog {
    /// Build a catalog, rejecting duplicate ids and malformed products
    pub fn new(products: Vec<LoanProduct>) -> Result<Self> {
        let mut seen = HashSet::new();
        for product in &products {
            product.validate()?;
            if !seen.insert(product.id.as_str()) {
                return Err(RateError::Data(format!("Duplicate product id: {}", product.id)));
            }
        }
        Ok(Self { products })
    }

    /// Eight standard products priced from three index series
    pub fn default_products() -> Self {
        use IndexSeries::*;

        Self {
            products: vec![
                LoanProduct::new("conv-30", "30-Year Fixed", Mortgage30Us, -0.125, 360),
                LoanProduct::new("conv-20", "20-Year Fixed", Mortgage30Us, -0.25, 240),
                LoanProduct::new("conv-15", "15-Year Fixed", Mortgage15Us, 0.0, 180),
                LoanProduct::new("conv-10", "10-Year Fixed", Mortgage15Us, -0.125, 120),
                LoanProduct::new("fha-30", "FHA 30-Year Fixed", Mortgage30Us, -0.375, 360),
                LoanProduct::new("va-30", "VA 30-Year Fixed", Mortgage30Us, -0.5, 360),
                LoanProduct::new("jumbo-30", "Jumbo 30-Year Fixed", Mortgage30Us, 0.25, 360),
                LoanProduct::new("arm-7-6", "7/6 ARM", Dgs10, 2.25, 360),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&LoanProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn products(&self) -> &[LoanProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct index series the catalog prices off
    pub fn series(&self) -> Vec<IndexSeries> {
        let mut series: Vec<IndexSeries> = Vec::new();
        for product in &self.products {
            if !series.contains(&product.series) {
                series.push(product.series.clone());
            }
        }
        series
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::default_products()
    }
}
