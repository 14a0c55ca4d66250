//! Point-in-time set of index observations and the missing-data policy

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use super::series::{IndexObservation, IndexSeries};
use crate::error::{RateError, Result};

/// Resolved index value, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum IndexValue {
    /// The requested series was observed
    Observed { value: f64, previous: Option<f64> },
    /// The requested series was missing; `substituted_from` supplied the value
    Fallback {
        value: f64,
        previous: Option<f64>,
        substituted_from: IndexSeries,
        reason: String,
    },
}

impl IndexValue {
    pub fn value(&self) -> f64 {
        match self {
            IndexValue::Observed { value, .. } | IndexValue::Fallback { value, .. } => *value,
        }
    }

    pub fn previous(&self) -> Option<f64> {
        match self {
            IndexValue::Observed { previous, .. } | IndexValue::Fallback { previous, .. } => *previous,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, IndexValue::Fallback { .. })
    }
}

/// Observations keyed by series
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    observations: HashMap<IndexSeries, IndexObservation>,
}

impl IndexSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from observations; later entries for a series replace earlier ones
    pub fn from_observations<I: IntoIterator<Item = IndexObservation>>(observations: I) -> Self {
        let mut snapshot = Self::new();
        for observation in observations {
            snapshot.insert(observation);
        }
        snapshot
    }

    pub fn insert(&mut self, observation: IndexObservation) {
        self.observations.insert(observation.series.clone(), observation);
    }

    pub fn get(&self, series: &IndexSeries) -> Option<&IndexObservation> {
        self.observations.get(series)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Resolve a series, substituting its fallback series when unobserved
    pub fn resolve(&self, series: &IndexSeries) -> Result<IndexValue> {
        if let Some(obs) = self.observations.get(series) {
            return Ok(IndexValue::Observed {
                value: obs.value,
                previous: obs.previous,
            });
        }

        let substitute = series
            .fallback()
            .and_then(|fallback| self.observations.get(&fallback));

        match substitute {
            Some(obs) => {
                warn!("No observation for {}, substituting {} value {:.3}", series, obs.series, obs.value);
                Ok(IndexValue::Fallback {
                    value: obs.value,
                    previous: obs.previous,
                    substituted_from: obs.series.clone(),
                    reason: format!("{} unavailable", series),
                })
            }
            None => Err(RateError::MissingIndex {
                series: series.code().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_series() {
        let snapshot = IndexSnapshot::from_observations([
            IndexObservation::new(IndexSeries::Mortgage30Us, 6.75).with_previous(6.81),
        ]);

        let value = snapshot.resolve(&IndexSeries::Mortgage30Us).unwrap();
        assert_eq!(value, IndexValue::Observed { value: 6.75, previous: Some(6.81) });
        assert!(!value.is_fallback());
    }

    #[test]
    fn test_missing_secondary_falls_back_to_primary() {
        let snapshot = IndexSnapshot::from_observations([IndexObservation::new(IndexSeries::Mortgage30Us, 6.75)]);

        let value = snapshot.resolve(&IndexSeries::Mortgage15Us).unwrap();
        assert!(value.is_fallback());
        assert_eq!(value.value(), 6.75);
        match value {
            IndexValue::Fallback { substituted_from, reason, .. } => {
                assert_eq!(substituted_from, IndexSeries::Mortgage30Us);
                assert!(reason.contains("MORTGAGE15US"));
            }
            other => panic!("Expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_primary_is_an_error() {
        let snapshot = IndexSnapshot::from_observations([IndexObservation::new(IndexSeries::Mortgage15Us, 5.99)]);

        assert!(matches!(
            snapshot.resolve(&IndexSeries::Mortgage30Us),
            Err(RateError::MissingIndex { .. })
        ));
        assert!(matches!(
            snapshot.resolve(&IndexSeries::Dgs10),
            Err(RateError::MissingIndex { .. })
        ));
    }

    #[test]
    fn test_later_observation_replaces_earlier() {
        let snapshot = IndexSnapshot::from_observations([
            IndexObservation::new(IndexSeries::Dgs10, 4.1),
            IndexObservation::new(IndexSeries::Dgs10, 4.2),
        ]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.resolve(&IndexSeries::Dgs10).unwrap().value(), 4.2);
    }
}
