//! transform::log_diff — `scale · Δᵈ ln(x)` per column, aligned across
//! columns.
//!
//! Key behaviors
//! -------------
//! - [`transform_series`] takes logarithms, differences `d` times and
//!   multiplies by `scale` (100 turns log changes into percentages).
//! - [`TransformedPair::from_wide`] applies it per column with
//!   `dᵢ = max(orderᵢ, 1)` and drops the first `max(dᵢ)` rows from every
//!   column so rows stay aligned to the same month.
//! - [`log_levels`] gives the undifferenced `scale · ln(x)` matrix used for
//!   the error-correction path.
//!
//! Invariants
//! ----------
//! - Output row count is `n − max(dᵢ)`; output periods are the input
//!   periods with the same leading rows removed.
//! - Column order is preserved.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;

use crate::data::{Period, WideTable};
use crate::transform::errors::{TransformError, TransformResult};

/// Multiplier applied after taking logarithms.
pub const DEFAULT_SCALE: f64 = 100.0;

/// `scale · Δᵈ ln(values)`; length `values.len() − d` (empty if `d ≥ len`).
///
/// Errors
/// ------
/// - `NonPositiveValue` for the first element that is not strictly positive.
pub fn transform_series(
    values: ArrayView1<'_, f64>, d: usize, scale: f64,
) -> TransformResult<Array1<f64>> {
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() || value <= 0.0 {
            return Err(TransformError::NonPositiveValue { index, value });
        }
        out.push(value.ln());
    }
    for _ in 0..d {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    Ok(Array1::from(out) * scale)
}

/// `scale · ln(x)` for every cell of `wide`.
///
/// Errors
/// ------
/// - `NonPositive` naming the series and month of the first bad cell.
pub fn log_levels(wide: &WideTable, scale: f64) -> TransformResult<Array2<f64>> {
    let mut out = Array2::<f64>::zeros(wide.values().dim());
    for (j, id) in wide.series_ids().iter().enumerate() {
        let col = transform_series(wide.column(j), 0, scale)
            .map_err(|e| name_error(e, id, wide.periods()))?;
        out.column_mut(j).assign(&col);
    }
    Ok(out)
}

/// TransformedPair — the aligned, transformed matrix fed to the VECM stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedPair {
    periods: Vec<Period>,
    series_ids: Vec<String>,
    values: Array2<f64>,
    orders: Vec<usize>,
    dropped: usize,
}

impl TransformedPair {
    /// Transform every column of `wide` with [`DEFAULT_SCALE`].
    ///
    /// Parameters
    /// ----------
    /// - `wide`: levels, one column per series.
    /// - `orders`: estimated differencing order per column; each is raised
    ///   to at least 1 before use.
    ///
    /// Errors
    /// ------
    /// - `OrderMismatch` when `orders.len() != wide.series_ids().len()`.
    /// - `NonPositive` for a level ≤ 0.
    /// - `EmptyAfterTransform` when no row survives.
    pub fn from_wide(wide: &WideTable, orders: &[usize]) -> TransformResult<Self> {
        Self::from_wide_scaled(wide, orders, DEFAULT_SCALE)
    }

    /// As [`from_wide`](Self::from_wide) with an explicit multiplier.
    pub fn from_wide_scaled(
        wide: &WideTable, orders: &[usize], scale: f64,
    ) -> TransformResult<Self> {
        let ncols = wide.series_ids().len();
        if orders.len() != ncols {
            return Err(TransformError::OrderMismatch { orders: orders.len(), columns: ncols });
        }

        let used: Vec<usize> = orders.iter().map(|&d| d.max(1)).collect();
        let dropped = used.iter().copied().max().unwrap_or(1);
        let nrows = wide.nrows();
        if dropped >= nrows {
            return Err(TransformError::EmptyAfterTransform { nrows, dropped });
        }
        let keep = nrows - dropped;

        let mut values = Array2::<f64>::zeros((keep, ncols));
        for (j, (id, &d)) in wide.series_ids().iter().zip(&used).enumerate() {
            let col = transform_series(wide.column(j), d, scale)
                .map_err(|e| name_error(e, id, wide.periods()))?;
            // Column j holds n − d values; its last `keep` map to rows `dropped..n`.
            let offset = col.len() - keep;
            values.column_mut(j).assign(&col.slice(ndarray::s![offset..]));
        }

        Ok(TransformedPair {
            periods: wide.periods()[dropped..].to_vec(),
            series_ids: wide.series_ids().to_vec(),
            values,
            orders: used,
            dropped,
        })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn series_ids(&self) -> &[String] {
        &self.series_ids
    }

    /// Transformed matrix, rows aligned with [`periods`](Self::periods).
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Differencing orders actually applied (each ≥ 1).
    pub fn orders(&self) -> &[usize] {
        &self.orders
    }

    /// Number of leading rows removed.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn nrows(&self) -> usize {
        self.values.len_of(Axis(0))
    }
}

fn name_error(err: TransformError, series: &str, periods: &[Period]) -> TransformError {
    match err {
        TransformError::NonPositiveValue { index, value } => match periods.get(index) {
            Some(&period) => {
                TransformError::NonPositive { series: series.to_string(), period, value }
            }
            None => TransformError::NonPositiveValue { index, value },
        },
        other => other,
    }
}
