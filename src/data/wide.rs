//! data::wide — pivot long-format observations into a month × series table.
//!
//! Purpose
//! -------
//! Produce the matrix every later stage works on: one row per calendar
//! month, one column per series, columns in the order the series were
//! requested.
//!
//! Key behaviors
//! -------------
//! - Restrict to the common span `[max first period, min last period]` so
//!   that leading/trailing months reported by only one series are dropped.
//! - Require every month inside that span for every series; a hole is an
//!   error (`DataError::MissingObservation`), never an interpolated value.
//!
//! Invariants
//! ----------
//! - `periods` is strictly increasing by exactly one month per row.
//! - `values.nrows() == periods.len()` and
//!   `values.ncols() == series_ids.len()`.

use crate::data::{
    errors::{DataError, DataResult},
    observation::LongTable,
    period::Period,
};
use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;

/// WideTable — one row per month, one column per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideTable {
    periods: Vec<Period>,
    series_ids: Vec<String>,
    values: Array2<f64>,
}

impl WideTable {
    /// Pivot `long` into a wide table with columns ordered as `series_ids`.
    ///
    /// Errors
    /// ------
    /// - `DataError::EmptyRequest` if `series_ids` is empty.
    /// - `DataError::UnknownSeries` if a requested id is absent from `long`.
    /// - `DataError::NoOverlap` if the series share no month.
    /// - `DataError::MissingObservation` for a hole inside the common span.
    pub fn pivot(long: &LongTable, series_ids: &[String]) -> DataResult<Self> {
        if series_ids.is_empty() {
            return Err(DataError::EmptyRequest);
        }

        let mut columns: Vec<Vec<(Period, f64)>> = Vec::with_capacity(series_ids.len());
        for id in series_ids {
            let col: Vec<(Period, f64)> = long.series(id).map(|o| (o.period, o.value)).collect();
            if col.is_empty() {
                return Err(DataError::UnknownSeries {
                    series: id.clone(),
                    detail: "not present in the fetched observations".to_string(),
                });
            }
            columns.push(col);
        }

        let (Some(start), Some(end)) = (
            columns.iter().map(|c| c[0].0).max(),
            columns.iter().map(|c| c[c.len() - 1].0).min(),
        ) else {
            return Err(DataError::EmptyRequest);
        };
        if start > end {
            return Err(DataError::NoOverlap { first_end: end, last_start: start });
        }

        let n_rows = (start.months_until(&end) + 1) as usize;
        let mut periods = Vec::with_capacity(n_rows);
        let mut p = start;
        for _ in 0..n_rows {
            periods.push(p);
            p = p.succ();
        }

        let mut values = Array2::<f64>::zeros((n_rows, series_ids.len()));
        for (j, (id, col)) in series_ids.iter().zip(&columns).enumerate() {
            let in_span: Vec<&(Period, f64)> =
                col.iter().filter(|(q, _)| *q >= start && *q <= end).collect();
            let mut it = in_span.into_iter().peekable();
            for (i, period) in periods.iter().enumerate() {
                match it.peek() {
                    Some((q, v)) if q == period => {
                        values[[i, j]] = *v;
                        it.next();
                    }
                    _ => {
                        return Err(DataError::MissingObservation {
                            series: id.clone(),
                            period: *period,
                        });
                    }
                }
            }
        }

        Ok(Self { periods, series_ids: series_ids.to_vec(), values })
    }

    /// Build directly from aligned columns; used by tests and embedders that
    /// already hold a clean matrix.
    pub fn from_columns(
        start: Period, series_ids: Vec<String>, values: Array2<f64>,
    ) -> DataResult<Self> {
        if series_ids.is_empty() || values.ncols() != series_ids.len() {
            return Err(DataError::EmptyRequest);
        }
        let mut periods = Vec::with_capacity(values.nrows());
        let mut p = start;
        for _ in 0..values.nrows() {
            periods.push(p);
            p = p.succ();
        }
        Ok(Self { periods, series_ids, values })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn series_ids(&self) -> &[String] {
        &self.series_ids
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Column `j` as a view.
    pub fn column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.values.column(j)
    }

    /// Column for `series_id`, if requested.
    pub fn column_by_id(&self, series_id: &str) -> Option<Array1<f64>> {
        self.series_ids
            .iter()
            .position(|s| s == series_id)
            .map(|j| self.values.column(j).to_owned())
    }

    pub fn nrows(&self) -> usize {
        self.periods.len()
    }
}
