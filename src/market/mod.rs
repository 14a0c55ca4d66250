//! Benchmark index data: series, observations and the fallback policy

mod series;
mod snapshot;
pub mod loader;

pub use series::{IndexObservation, IndexSeries};
pub use snapshot::{IndexSnapshot, IndexValue};
pub use loader::{load_default_observations, load_observations, load_observations_from_reader};
