//! vecm::design — lagged design matrices shared by lag selection, the
//! Johansen fit and the bootstrap refits.

use ndarray::{Array2, ArrayView2, s};

/// Rows `t = start..n` of `[x_{t−1}, x_{t−2}, …, x_{t−lags}]`, each block
/// holding all columns of `data` (lag-major ordering).
///
/// Requires `start >= lags`.
pub fn lag_matrix(data: ArrayView2<'_, f64>, lags: usize, start: usize) -> Array2<f64> {
    let (n, k) = data.dim();
    let rows = n.saturating_sub(start);
    Array2::from_shape_fn((rows, lags * k), |(r, c)| {
        let lag = c / k + 1;
        data[[start + r - lag, c % k]]
    })
}

/// Prepend a column of ones.
pub fn with_intercept(x: ArrayView2<'_, f64>) -> Array2<f64> {
    Array2::from_shape_fn(
        (x.nrows(), x.ncols() + 1),
        |(i, j)| if j == 0 { 1.0 } else { x[[i, j - 1]] },
    )
}

/// First differences along rows (`n − 1` rows).
pub fn diff_rows(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let n = data.nrows();
    if n < 2 {
        return Array2::zeros((0, data.ncols()));
    }
    &data.slice(s![1.., ..]) - &data.slice(s![..n - 1, ..])
}
