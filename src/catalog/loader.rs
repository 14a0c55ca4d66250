//! Load the product catalog from products.csv

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::product::{LoanProduct, ProductCatalog};
use crate::error::Result;
use crate::market::IndexSeries;

/// Default path to the catalog file
pub const DEFAULT_CATALOG_PATH: &str = "data/products.csv";

/// Raw CSV row matching products.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    series: String,
    spread: f64,
    term_months: u32,
}

impl CsvRow {
    fn to_product(self) -> LoanProduct {
        LoanProduct {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            series: IndexSeries::from(self.series.as_str()),
            spread: self.spread,
            term_months: self.term_months,
        }
    }
}

fn read_products<R: Read>(mut reader: Reader<R>) -> Result<ProductCatalog> {
    let mut products = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        products.push(row.to_product());
    }
    ProductCatalog::new(products)
}

/// Load a catalog from a CSV file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<ProductCatalog> {
    read_products(Reader::from_path(path)?)
}

/// Load a catalog from any reader
pub fn load_catalog_from_reader<R: Read>(reader: R) -> Result<ProductCatalog> {
    read_products(Reader::from_reader(reader))
}

/// Load the catalog from the default products.csv location
pub fn load_default_catalog() -> Result<ProductCatalog> {
    load_catalog(DEFAULT_CATALOG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_catalog_matches_builtin() {
        let catalog = load_default_catalog().expect("Failed to load catalog");
        assert_eq!(catalog, ProductCatalog::default_products());
    }

    #[test]
    fn test_custom_series_and_negative_spread() {
        let data = "id,name,series,spread,term_months\nsofr-5,5/1 ARM,SOFR,2.75,360\nbuydown,Buydown 30,MORTGAGE30US,-1.0,360\n";
        let catalog = load_catalog_from_reader(data.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("sofr-5").unwrap().series, IndexSeries::Other("SOFR".to_string()));
        assert_eq!(catalog.get("buydown").unwrap().spread, -1.0);
    }

    #[test]
    fn test_rejects_duplicates_and_bad_terms() {
        let dupes = "id,name,series,spread,term_months\na,A,DGS10,0,360\na,A2,DGS10,0,180\n";
        assert!(load_catalog_from_reader(dupes.as_bytes()).is_err());

        let zero = "id,name,series,spread,term_months\na,A,DGS10,0,0\n";
        assert!(load_catalog_from_reader(zero.as_bytes()).is_err());

        let fractional = "id,name,series,spread,term_months\na,A,DGS10,0,359.5\n";
        assert!(load_catalog_from_reader(fractional.as_bytes()).is_err());
    }
}
