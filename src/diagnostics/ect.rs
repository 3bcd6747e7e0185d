//! diagnostics::ect — the error-correction-term path.
//!
//! Purpose
//! -------
//! Evaluate the long-run relation `ectₜ = yₜ · β` over the sample together
//! with its mean, so the report can show when the pair sat above or below
//! its equilibrium.
//!
//! Conventions
//! -----------
//! - The pipeline passes the undifferenced `100 · ln(levels)` matrix so the
//!   path is on the same scale as the transformed data.
//! - Periods label the rows of `levels` one to one.

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::Serialize;

use crate::data::Period;
use crate::diagnostics::errors::{DiagnosticsError, DiagnosticsResult};

/// EctPath — `levels · β` per month and its sample mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EctPath {
    periods: Vec<Period>,
    values: Array1<f64>,
    mean: f64,
}

impl EctPath {
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last month and its deviation from the mean.
    pub fn latest_deviation(&self) -> Option<(Period, f64)> {
        let last = self.values.len().checked_sub(1)?;
        Some((self.periods[last], self.values[last] - self.mean))
    }

    /// Fraction of months with the term above its mean.
    pub fn share_above_mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let above = self.values.iter().filter(|&&v| v > self.mean).count();
        above as f64 / self.values.len() as f64
    }
}

/// `levels · β` with one value per row of `levels`.
///
/// Errors
/// ------
/// - `EmptyInput` when `levels` has no rows.
/// - `DimensionMismatch` when β does not match the column count or the
///   periods do not match the row count.
pub fn ect_path(
    levels: ArrayView2<'_, f64>, beta: ArrayView1<'_, f64>, periods: &[Period],
) -> DiagnosticsResult<EctPath> {
    let (n, k) = levels.dim();
    if n == 0 {
        return Err(DiagnosticsError::EmptyInput { what: "levels" });
    }
    if beta.len() != k {
        return Err(DiagnosticsError::DimensionMismatch {
            what: "cointegrating vector",
            expected: k,
            found: beta.len(),
        });
    }
    if periods.len() != n {
        return Err(DiagnosticsError::DimensionMismatch {
            what: "periods",
            expected: n,
            found: periods.len(),
        });
    }
    let values = levels.dot(&beta);
    let mean = values.sum() / n as f64;
    Ok(EctPath { periods: periods.to_vec(), values, mean })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn periods(n: usize) -> Vec<Period> {
        let mut p = Period::new(2010, 11).unwrap();
        (0..n)
            .map(|_| {
                let cur = p;
                p = p.succ();
                cur
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // The path is the row-wise inner product with β; the mean is its
    // arithmetic mean.
    //
    // Given
    // -----
    // - levels [[3, 1], [5, 2], [4, 4]], β = (1, −1).
    //
    // Expect
    // ------
    // - values [2, 3, 0], mean 5/3, latest deviation −5/3 in 2011-01.
    fn ect_path_is_levels_times_beta() {
        // Arrange
        let levels = array![[3.0, 1.0], [5.0, 2.0], [4.0, 4.0]];
        let beta = array![1.0, -1.0];

        // Act
        let path = ect_path(levels.view(), beta.view(), &periods(3)).unwrap();

        // Assert
        assert_eq!(path.values(), &array![2.0, 3.0, 0.0]);
        assert!((path.mean() - 5.0 / 3.0).abs() < 1e-12);
        let (period, dev) = path.latest_deviation().unwrap();
        assert_eq!(period, Period::new(2011, 1).unwrap());
        assert!((dev + 5.0 / 3.0).abs() < 1e-12);
        assert!((path.share_above_mean() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn ect_path_checks_dimensions() {
        let levels = array![[3.0, 1.0], [5.0, 2.0]];
        let beta3 = array![1.0, -1.0, 0.5];
        assert!(matches!(
            ect_path(levels.view(), beta3.view(), &periods(2)),
            Err(DiagnosticsError::DimensionMismatch { what: "cointegrating vector", .. })
        ));
        let beta = array![1.0, -1.0];
        assert!(matches!(
            ect_path(levels.view(), beta.view(), &periods(3)),
            Err(DiagnosticsError::DimensionMismatch { what: "periods", .. })
        ));
    }
}
