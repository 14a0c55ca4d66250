//! Loan product catalog

mod product;
pub mod loader;

pub use product::{LoanProduct, ProductCatalog};
pub use loader::{load_catalog, load_catalog_from_reader, load_default_catalog};
