//! CSV loader for index observations
//!
//! Expected columns: `series,date,value` with dates as `YYYY-MM-DD`.
//! Rows whose value is `.` (no observation published) are skipped. Two
//! rows for the same series and date are rejected.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;

use super::series::{IndexObservation, IndexSeries};
use super::snapshot::IndexSnapshot;
use crate::error::{RateError, Result};

/// Default path to the observations file
pub const DEFAULT_OBSERVATIONS_PATH: &str = "data/index_observations.csv";

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    series: String,
    date: NaiveDate,
    value: String,
}

/// Load observations from a CSV file
pub fn load_observations<P: AsRef<Path>>(path: P) -> Result<IndexSnapshot> {
    let reader = Reader::from_path(path)?;
    build_snapshot(reader)
}

/// Load observations from any reader (e.g. a request body)
pub fn load_observations_from_reader<R: Read>(reader: R) -> Result<IndexSnapshot> {
    build_snapshot(Reader::from_reader(reader))
}

/// Load observations from the default location
pub fn load_default_observations() -> Result<IndexSnapshot> {
    load_observations(DEFAULT_OBSERVATIONS_PATH)
}

fn build_snapshot<R: Read>(mut reader: Reader<R>) -> Result<IndexSnapshot> {
    let mut history: HashMap<IndexSeries, Vec<(NaiveDate, f64)>> = HashMap::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let raw = row.value.trim();
        if raw == "." || raw.is_empty() {
            continue;
        }

        let value: f64 = raw
            .parse()
            .map_err(|_| RateError::Data(format!("Invalid value for {} on {}: {}", row.series, row.date, raw)))?;
        if !value.is_finite() {
            return Err(RateError::Data(format!("Non-finite value for {} on {}", row.series, row.date)));
        }

        history
            .entry(IndexSeries::from(row.series.as_str()))
            .or_default()
            .push((row.date, value));
    }

    let mut observations = Vec::with_capacity(history.len());
    for (series, mut points) in history {
        points.sort_by_key(|(date, _)| *date);
        if let Some(pair) = points.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(RateError::Data(format!("Duplicate observation for {} on {}", series, pair[0].0)));
        }

        let Some(&(date, value)) = points.last() else {
            continue;
        };
        let previous = points.len().checked_sub(2).map(|i| points[i].1);
        observations.push(IndexObservation {
            series,
            date: Some(date),
            value,
            previous,
        });
    }

    Ok(IndexSnapshot::from_observations(observations))
}
