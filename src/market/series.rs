//! Benchmark index series and observations

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named benchmark rate series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IndexSeries {
    /// 30-year fixed mortgage benchmark (primary series)
    Mortgage30Us,
    /// 15-year fixed mortgage benchmark
    Mortgage15Us,
    /// 10-year treasury constant maturity
    Dgs10,
    /// Any other series code
    Other(String),
}

impl IndexSeries {
    /// Series code as published
    pub fn code(&self) -> &str {
        match self {
            IndexSeries::Mortgage30Us => "MORTGAGE30US",
            IndexSeries::Mortgage15Us => "MORTGAGE15US",
            IndexSeries::Dgs10 => "DGS10",
            IndexSeries::Other(code) => code.as_str(),
        }
    }

    /// The series substituted when this one has no observation
    pub fn fallback(&self) -> Option<IndexSeries> {
        match self {
            IndexSeries::Mortgage15Us | IndexSeries::Dgs10 => Some(IndexSeries::Mortgage30Us),
            IndexSeries::Mortgage30Us | IndexSeries::Other(_) => None,
        }
    }
}

impl From<&str> for IndexSeries {
    fn from(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "MORTGAGE30US" => IndexSeries::Mortgage30Us,
            "MORTGAGE15US" => IndexSeries::Mortgage15Us,
            "DGS10" => IndexSeries::Dgs10,
            other => IndexSeries::Other(other.to_string()),
        }
    }
}

impl From<String> for IndexSeries {
    fn from(code: String) -> Self {
        IndexSeries::from(code.as_str())
    }
}

impl From<IndexSeries> for String {
    fn from(series: IndexSeries) -> Self {
        series.code().to_string()
    }
}

impl fmt::Display for IndexSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Latest value of a series, with the prior period's value when known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexObservation {
    pub series: IndexSeries,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Percent (e.g. 6.75)
    pub value: f64,
    #[serde(default)]
    pub previous: Option<f64>,
}

impl IndexObservation {
    pub fn new(series: IndexSeries, value: f64) -> Self {
        Self {
            series,
            date: None,
            value,
            previous: None,
        }
    }

    pub fn with_previous(mut self, previous: f64) -> Self {
        self.previous = Some(previous);
        self
    }
}
