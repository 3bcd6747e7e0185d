//! regression::linalg — bridges between `ndarray` storage and `nalgebra`
//! decompositions.
//!
//! Purpose
//! -------
//! The crate stores data as `ndarray` arrays (cheap slicing, serde support)
//! but relies on `nalgebra` for QR, Cholesky, inverses and symmetric
//! eigendecompositions. This module owns the copies between the two so the
//! statistical code never indexes across libraries by hand.
//!
//! Conventions
//! -----------
//! - Copies are element-wise; no layout tricks are attempted.
//! - Decompositions that can fail return `Option`; callers map `None` into
//!   their own error enums.

use nalgebra::{Cholesky, DMatrix};
use ndarray::{Array2, ArrayView2};

/// Copy an `ndarray` matrix into a `nalgebra::DMatrix`.
///
/// The copy walks column by column to match `DMatrix`'s column-major
/// storage.
pub fn to_dmatrix(a: ArrayView2<'_, f64>) -> DMatrix<f64> {
    let (nrows, ncols) = a.dim();
    DMatrix::from_fn(nrows, ncols, |i, j| a[[i, j]])
}

/// Copy a `nalgebra::DMatrix` back into an `ndarray` matrix.
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Lower-triangular Cholesky factor `L` with `a = L Lᵀ`, or `None` when `a`
/// is not positive definite.
pub fn cholesky_lower(a: &Array2<f64>) -> Option<Array2<f64>> {
    Cholesky::new(to_dmatrix(a.view())).map(|c| to_array2(&c.l()))
}

/// Inverse of a square matrix, or `None` when it is singular.
pub fn inverse(a: &Array2<f64>) -> Option<Array2<f64>> {
    to_dmatrix(a.view()).try_inverse().map(|m| to_array2(&m))
}

/// `ln det(a)` for a symmetric positive-definite matrix via Cholesky.
pub fn log_det_spd(a: &Array2<f64>) -> Option<f64> {
    let chol = Cholesky::new(to_dmatrix(a.view()))?;
    let l = chol.l();
    Some((0..l.nrows()).map(|i| l[(i, i)].ln()).sum::<f64>() * 2.0)
}

/// `aᵀ b / n` for two matrices with the same number of rows.
pub fn cross_moment(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    a.t().dot(b) / a.nrows() as f64
}
