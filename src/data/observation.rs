//! data::observation — long-format observations as returned by sources.

use crate::data::{
    errors::{DataError, DataResult},
    period::Period,
};
use serde::{Deserialize, Serialize};

/// One `(period, series_id, value)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub period: Period,
    pub series_id: String,
    pub value: f64,
}

impl Observation {
    pub fn new(period: Period, series_id: impl Into<String>, value: f64) -> Self {
        Self { period, series_id: series_id.into(), value }
    }
}

/// LongTable — observations of every requested series, stacked.
///
/// Invariants
/// ----------
/// - `series_ids` preserves the order in which series were requested.
/// - Within one series, observations are sorted by period and every period
///   appears once; [`LongTable::push_series`] enforces both.
/// - Every stored value is finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LongTable {
    series_ids: Vec<String>,
    observations: Vec<Observation>,
}

impl LongTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one series, sorting it by period and rejecting duplicate
    /// months or non-finite values.
    pub fn push_series(&mut self, series_id: &str, mut obs: Vec<Observation>) -> DataResult<()> {
        obs.sort_by_key(|o| o.period);
        for pair in obs.windows(2) {
            if pair[0].period == pair[1].period {
                return Err(DataError::DuplicatePeriod {
                    series: series_id.to_string(),
                    period: pair[0].period,
                });
            }
        }
        if let Some(bad) = obs.iter().find(|o| !o.value.is_finite()) {
            return Err(DataError::InvalidValue {
                series: series_id.to_string(),
                period: bad.period,
                value: bad.value,
            });
        }
        self.series_ids.push(series_id.to_string());
        self.observations.extend(obs.into_iter().map(|mut o| {
            o.series_id = series_id.to_string();
            o
        }));
        Ok(())
    }

    pub fn series_ids(&self) -> &[String] {
        &self.series_ids
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Observations belonging to `series_id`, in period order.
    pub fn series<'a>(&'a self, series_id: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations.iter().filter(move |o| o.series_id == series_id)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
