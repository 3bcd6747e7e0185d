//! vecm::johansen — reduced-rank regression behind the Johansen ML
//! estimator.
//!
//! Purpose
//! -------
//! Solve the Johansen eigenproblem for the VECM
//!
//! ```text
//! Δyₜ = α β' yₜ₋₁ + c + Σᵢ₌₁ᵖ Γᵢ Δyₜ₋ᵢ + uₜ
//! ```
//!
//! with the constant `c` unrestricted (outside the cointegrating space).
//!
//! Key behaviors
//! -------------
//! - Concentrate out `[1, Δyₜ₋₁, …, Δyₜ₋ₚ]` from `Z₀ = Δyₜ` and `Z₁ = yₜ₋₁`,
//!   giving residuals R₀, R₁ and moments Sᵢⱼ = Rᵢ'Rⱼ / T.
//! - Solve |λS₁₁ − S₁₀S₀₀⁻¹S₀₁| = 0 through the Cholesky factor S₁₁ = LL'
//!   and a symmetric eigen decomposition of L⁻¹S₁₀S₀₀⁻¹S₀₁L⁻ᵀ, with an
//!   iteration cap. Eigenvectors map back as β = L⁻ᵀv, so β'S₁₁β = I.
//! - Trace and maximum-eigenvalue statistics for every rank hypothesis, with
//!   Osterwald-Lenum critical values for the unrestricted-constant case.
//!
//! Invariants & assumptions
//! ------------------------
//! - Eigenvalues are returned in descending order and must lie in [0, 1);
//!   anything else means the moments are numerically degenerate and is an
//!   error, not a clipped value.
//! - A solver that exhausts its iteration cap yields
//!   `VecmError::EigenNotConverged`; no partial decomposition escapes.
//!
//! Conventions
//! -----------
//! - `lag` counts lagged differences (the VECM lag), not the VAR order.
//! - Effective sample: T = n − lag − 1 for `n` rows of levels.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2, s};
use serde::Serialize;

use crate::regression::fit_multivariate;
use crate::regression::linalg::{cholesky_lower, cross_moment, inverse, to_array2, to_dmatrix};
use crate::vecm::design::{diff_rows, lag_matrix, with_intercept};
use crate::vecm::errors::{VecmError, VecmResult};

/// Tolerance passed to the symmetric eigen solver.
pub const EIGEN_EPS: f64 = 1e-14;

/// Slack for eigenvalues that round slightly below zero.
const EIGEN_NEG_TOL: f64 = 1e-10;

/// Osterwald-Lenum (1992) Table 1, unrestricted constant: trace statistic
/// critical values (90%, 95%, 99%) indexed by `K − r − 1`.
const TRACE_CV: [[f64; 3]; 5] = [
    [2.69, 3.76, 6.65],
    [13.33, 15.41, 20.04],
    [26.79, 29.68, 35.65],
    [43.95, 47.21, 54.46],
    [64.84, 68.52, 76.07],
];

/// As [`TRACE_CV`] for the maximum-eigenvalue statistic.
const MAX_EIGEN_CV: [[f64; 3]; 5] = [
    [2.69, 3.76, 6.65],
    [12.07, 14.07, 18.63],
    [18.60, 20.97, 25.52],
    [24.73, 27.07, 32.24],
    [30.90, 33.46, 38.77],
];

/// Critical values at the 90%, 95% and 99% levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankCritical {
    pub pct90: f64,
    pub pct95: f64,
    pub pct99: f64,
}

/// Trace and maximum-eigenvalue statistics for H₀: rank ≤ r.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankTest {
    pub r: usize,
    pub trace: f64,
    pub trace_critical: Option<RankCritical>,
    pub max_eigen: f64,
    pub max_eigen_critical: Option<RankCritical>,
}

impl RankTest {
    /// `true` when the trace statistic rejects H₀ at 5%.
    pub fn trace_rejects(&self) -> bool {
        self.trace_critical.is_some_and(|cv| self.trace > cv.pct95)
    }
}

/// Critical values for `K − r` common trends, when tabulated.
pub fn rank_critical_values(k_minus_r: usize) -> Option<(RankCritical, RankCritical)> {
    let idx = k_minus_r.checked_sub(1)?;
    let row = |t: &[[f64; 3]; 5]| {
        t.get(idx).map(|v| RankCritical { pct90: v[0], pct95: v[1], pct99: v[2] })
    };
    Some((row(&TRACE_CV)?, row(&MAX_EIGEN_CV)?))
}

/// JohansenDecomposition — eigen solution of the reduced-rank problem.
///
/// Fields
/// ------
/// - `eigenvalues`: λ₁ ≥ … ≥ λ_K, each in [0, 1).
/// - `eigenvectors`: `K × K`, column i is the (S₁₁-orthonormal) vector for
///   λᵢ.
/// - `s00`, `s01`, `s11`: product-moment matrices of the concentrated
///   residuals.
/// - `nobs`: effective sample T.
#[derive(Debug, Clone, PartialEq)]
pub struct JohansenDecomposition {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Array2<f64>,
    pub s00: Array2<f64>,
    pub s01: Array2<f64>,
    pub s11: Array2<f64>,
    pub nobs: usize,
}

impl JohansenDecomposition {
    /// Solve the eigenproblem for `levels` (`n × K`) with `lag` lagged
    /// differences.
    ///
    /// Errors
    /// ------
    /// - `InvalidLag` for `lag == 0`.
    /// - `InsufficientData` when T cannot identify the concentration step.
    /// - `SingularMoment` when S₀₀ or S₁₁ is not positive definite.
    /// - `EigenNotConverged` when the solver exceeds `max_iter`.
    /// - `InvalidEigenvalue` for eigenvalues outside [0, 1).
    pub fn solve(levels: ArrayView2<'_, f64>, lag: usize, max_iter: usize) -> VecmResult<Self> {
        if lag == 0 {
            return Err(VecmError::InvalidLag { lag, reason: "VECM lag must be at least 1" });
        }
        let (n, k) = levels.dim();
        let needed = lag * k + 1 + k + 1;
        let nobs = n.saturating_sub(lag + 1);
        if nobs < needed {
            return Err(VecmError::InsufficientData { nobs, needed });
        }

        let dy = diff_rows(levels);
        let z0 = dy.slice(s![lag.., ..]).to_owned();
        let z1 = levels.slice(s![lag..n - 1, ..]).to_owned();
        let z2 = with_intercept(lag_matrix(dy.view(), lag, lag).view());

        let r0 = fit_multivariate(z0.view(), z2.view())?.residuals;
        let r1 = fit_multivariate(z1.view(), z2.view())?.residuals;
        let s00 = cross_moment(&r0, &r0);
        let s01 = cross_moment(&r0, &r1);
        let s11 = cross_moment(&r1, &r1);

        let (eigenvalues, eigenvectors) = generalized_eigen(&s00, &s01, &s11, max_iter)?;
        Ok(JohansenDecomposition { eigenvalues, eigenvectors, s00, s01, s11, nobs })
    }

    /// Trace and maximum-eigenvalue statistics for r = 0..K−1.
    pub fn rank_tests(&self) -> Vec<RankTest> {
        let k = self.eigenvalues.len();
        let t = self.nobs as f64;
        let terms: Vec<f64> = self.eigenvalues.iter().map(|l| -t * (1.0 - l).ln()).collect();
        (0..k)
            .map(|r| {
                let cv = rank_critical_values(k - r);
                RankTest {
                    r,
                    trace: terms[r..].iter().sum(),
                    trace_critical: cv.map(|c| c.0),
                    max_eigen: terms[r],
                    max_eigen_critical: cv.map(|c| c.1),
                }
            })
            .collect()
    }

    /// Eigenvector for the largest eigenvalue.
    pub fn leading_vector(&self) -> Array1<f64> {
        self.eigenvectors.column(0).to_owned()
    }
}

/// Eigenvalues (descending) and S₁₁-orthonormal eigenvectors of
/// S₁₁⁻¹S₁₀S₀₀⁻¹S₀₁.
pub fn generalized_eigen(
    s00: &Array2<f64>, s01: &Array2<f64>, s11: &Array2<f64>, max_iter: usize,
) -> VecmResult<(Vec<f64>, Array2<f64>)> {
    let l = cholesky_lower(s11).ok_or(VecmError::SingularMoment { which: "S11" })?;
    let l_inv = inverse(&l).ok_or(VecmError::SingularMoment { which: "S11" })?;
    let s00_inv = inverse(s00).ok_or(VecmError::SingularMoment { which: "S00" })?;
    // Positive definiteness of S00 is what the likelihood needs, not just invertibility.
    cholesky_lower(s00).ok_or(VecmError::SingularMoment { which: "S00" })?;

    let m = l_inv.dot(&s01.t()).dot(&s00_inv).dot(s01).dot(&l_inv.t());
    let sym = (&m + &m.t()) * 0.5;
    let (values, vectors) = symmetric_eigen(&sym, max_iter)?;

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let k = values.len();
    let mut sorted_values = Vec::with_capacity(k);
    let mut sorted_vectors = Array2::<f64>::zeros((k, k));
    for (dst, &src) in order.iter().enumerate() {
        let value = values[src];
        if !(value > -EIGEN_NEG_TOL && value < 1.0) {
            return Err(VecmError::InvalidEigenvalue { value });
        }
        sorted_values.push(value.max(0.0));
        sorted_vectors.column_mut(dst).assign(&vectors.column(src));
    }

    let beta = l_inv.t().dot(&sorted_vectors);
    Ok((sorted_values, beta))
}

/// Symmetric eigen decomposition with an iteration cap.
///
/// Errors
/// ------
/// - `EigenNotConverged { max_iter }` when the solver gives up.
pub fn symmetric_eigen(a: &Array2<f64>, max_iter: usize) -> VecmResult<(Vec<f64>, Array2<f64>)> {
    let max_iter = max_iter.max(1);
    let m: DMatrix<f64> = to_dmatrix(a.view());
    let eig = m
        .try_symmetric_eigen(EIGEN_EPS, max_iter)
        .ok_or(VecmError::EigenNotConverged { max_iter })?;
    Ok((eig.eigenvalues.iter().copied().collect(), to_array2(&eig.eigenvectors)))
}
