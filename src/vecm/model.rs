//! vecm::model — the fitted rank-one VECM and its VAR representation.
//!
//! Purpose
//! -------
//! Own every quantity downstream diagnostics need from the Johansen fit:
//! loading α, cointegrating vector β (β₀ = 1), constant, short-run matrices
//! Γᵢ, residuals, residual covariance, eigenvalues, log-likelihood and the
//! rank tests.
//!
//! Key behaviors
//! -------------
//! - [`VecmModel::fit`] solves the Johansen problem, normalises the leading
//!   eigenvector, and re-estimates α, c and Γᵢ by OLS of Δyₜ on
//!   `[β'yₜ₋₁, 1, Δyₜ₋₁, …, Δyₜ₋ₚ]`.
//! - [`VecmModel::to_var`] maps the model to levels-VAR matrices
//!   A₁ = I + αβ' + Γ₁, Aᵢ = Γᵢ − Γᵢ₋₁, A_{p+1} = −Γₚ.
//!
//! Invariants & assumptions
//! ------------------------
//! - The model is immutable once built; fields are read through accessors.
//! - Rank is fixed at one.
//! - Σ = U'U / T (ML scaling, no degrees-of-freedom correction).

use ndarray::{Array1, Array2, ArrayView2, s};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::regression::fit_multivariate;
use crate::regression::linalg::{cross_moment, log_det_spd};
use crate::vecm::design::{diff_rows, lag_matrix};
use crate::vecm::errors::{VecmError, VecmResult};
use crate::vecm::johansen::{JohansenDecomposition, RankTest};

/// Relative size below which β₀ counts as zero.
const NORMALIZATION_TOL: f64 = 1e-10;

/// Estimation options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VecmOptions {
    /// Iteration cap of the symmetric eigen solver.
    pub max_eigen_iter: usize,
}

impl Default for VecmOptions {
    fn default() -> Self {
        VecmOptions { max_eigen_iter: 1000 }
    }
}

/// VecmModel — a fitted VECM with cointegration rank one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VecmModel {
    lag: usize,
    alpha: Array1<f64>,
    beta: Array1<f64>,
    constant: Array1<f64>,
    gamma: Vec<Array2<f64>>,
    #[serde(skip)]
    residuals: Array2<f64>,
    sigma: Array2<f64>,
    eigenvalues: Vec<f64>,
    log_likelihood: f64,
    rank_tests: Vec<RankTest>,
    nobs: usize,
}

impl VecmModel {
    /// Fit by Johansen maximum likelihood.
    ///
    /// Parameters
    /// ----------
    /// - `levels`: `n × K` system variables, rows in time order.
    /// - `lag`: number of lagged differences p ≥ 1.
    /// - `opts`: solver options.
    ///
    /// Returns
    /// -------
    /// `VecmResult<VecmModel>`; never a partially estimated model.
    ///
    /// Errors
    /// ------
    /// - Everything [`JohansenDecomposition::solve`] reports.
    /// - `NormalizationFailed` when β₀ is numerically zero.
    /// - `SingularMoment` for a residual covariance that is not positive
    ///   definite.
    /// - `Regression` if the final OLS step fails.
    pub fn fit(levels: ArrayView2<'_, f64>, lag: usize, opts: &VecmOptions) -> VecmResult<Self> {
        let decomposition = JohansenDecomposition::solve(levels, lag, opts.max_eigen_iter)?;
        let raw = decomposition.leading_vector();
        let scale = raw.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if raw[0].abs() <= NORMALIZATION_TOL * scale.max(1.0) {
            return Err(VecmError::NormalizationFailed { value: raw[0] });
        }
        let beta = &raw / raw[0];

        let (n, k) = levels.dim();
        let dy = diff_rows(levels);
        let z0 = dy.slice(s![lag.., ..]);
        let ect = levels.slice(s![lag..n - 1, ..]).dot(&beta);
        let lags = lag_matrix(dy.view(), lag, lag);
        let rows = z0.nrows();

        // Regressors: [ECT, 1, Δyₜ₋₁ … Δyₜ₋ₚ].
        let x = Array2::from_shape_fn((rows, 2 + lags.ncols()), |(i, j)| match j {
            0 => ect[i],
            1 => 1.0,
            _ => lags[[i, j - 2]],
        });
        let fit = fit_multivariate(z0, x.view())?;
        let coef = &fit.coefficients;

        let alpha = coef.row(0).to_owned();
        let constant = coef.row(1).to_owned();
        let gamma: Vec<Array2<f64>> = (0..lag)
            .map(|i| coef.slice(s![2 + i * k..2 + (i + 1) * k, ..]).t().to_owned())
            .collect();

        let sigma = cross_moment(&fit.residuals, &fit.residuals);
        let ln_det = log_det_spd(&sigma).ok_or(VecmError::SingularMoment { which: "Sigma" })?;
        let t = rows as f64;
        let log_likelihood =
            -0.5 * t * (k as f64 * (1.0 + (2.0 * std::f64::consts::PI).ln()) + ln_det);

        debug!(
            lag,
            nobs = rows,
            lambda1 = decomposition.eigenvalues[0],
            log_likelihood,
            "Johansen VECM fitted"
        );

        Ok(VecmModel {
            lag,
            alpha,
            beta,
            constant,
            gamma,
            residuals: fit.residuals,
            sigma,
            rank_tests: decomposition.rank_tests(),
            eigenvalues: decomposition.eigenvalues,
            log_likelihood,
            nobs: rows,
        })
    }

    /// Levels-VAR coefficient matrices A₁ … A_{p+1}.
    pub fn to_var(&self) -> Vec<Array2<f64>> {
        let k = self.dim();
        let p = self.lag;
        let pi = outer(&self.alpha, &self.beta);
        let mut a = Vec::with_capacity(p + 1);
        a.push(Array2::<f64>::eye(k) + &pi + &self.gamma[0]);
        for i in 1..p {
            a.push(&self.gamma[i] - &self.gamma[i - 1]);
        }
        a.push(-&self.gamma[p - 1]);
        a
    }

    /// Long-run impact matrix Π = αβ'.
    pub fn pi(&self) -> Array2<f64> {
        outer(&self.alpha, &self.beta)
    }

    /// Number of lagged differences.
    pub fn lag(&self) -> usize {
        self.lag
    }

    pub fn rank(&self) -> usize {
        1
    }

    /// Number of system variables K.
    pub fn dim(&self) -> usize {
        self.alpha.len()
    }

    /// Loading (speed-of-adjustment) vector α.
    pub fn alpha(&self) -> &Array1<f64> {
        &self.alpha
    }

    /// Cointegrating vector β with β₀ = 1.
    pub fn beta(&self) -> &Array1<f64> {
        &self.beta
    }

    pub fn constant(&self) -> &Array1<f64> {
        &self.constant
    }

    /// Short-run matrices Γ₁ … Γₚ, entry `[equation, variable]`.
    pub fn gamma(&self) -> &[Array2<f64>] {
        &self.gamma
    }

    /// Residuals, one row per effective observation, one column per equation.
    pub fn residuals(&self) -> &Array2<f64> {
        &self.residuals
    }

    /// Residual covariance Σ = U'U / T.
    pub fn sigma(&self) -> &Array2<f64> {
        &self.sigma
    }

    /// Johansen eigenvalues, descending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn rank_tests(&self) -> &[RankTest] {
        &self.rank_tests
    }

    /// Effective sample size T.
    pub fn nobs(&self) -> usize {
        self.nobs
    }
}

fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of the cointegrating vector for y₂ = y₁ + stationary noise.
    // - Normalisation β₀ = 1, sign pattern, and α pointing toward equilibrium.
    // - Shapes of residuals and Σ, and the VAR mapping identity
    //   Σᵢ Aᵢ = I + αβ'.
    // -------------------------------------------------------------------------

    /// y₁ a random walk, y₂ = y₁ + N(0, 0.5²) noise.
    fn cointegrated_pair(seed: u64, n: usize) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let shock = Normal::new(0.0, 1.0).unwrap();
        let noise = Normal::new(0.0, 0.5).unwrap();
        let mut y = Array2::<f64>::zeros((n, 2));
        let mut level = 100.0;
        for t in 0..n {
            level += shock.sample(&mut rng);
            y[[t, 0]] = level;
            y[[t, 1]] = level + noise.sample(&mut rng);
        }
        y
    }

    #[test]
    // Purpose
    // -------
    // The Johansen fit should find β ≈ (1, −1) when y₂ − y₁ is stationary.
    //
    // Given
    // -----
    // - 300 observations of the pair above, lag = 1.
    //
    // Expect
    // ------
    // - β₀ = 1 exactly, β₁ within 0.1 of −1 (opposite signs).
    // - λ₁ clearly larger than λ₂.
    // - The second equation corrects toward equilibrium: a positive
    //   deviation y₁ − y₂ pulls y₂ up, so α₁ > 0 with β = (1, −1).
    fn fit_recovers_cointegrating_vector() {
        // Arrange
        let y = cointegrated_pair(17, 300);

        // Act
        let model = VecmModel::fit(y.view(), 1, &VecmOptions::default()).unwrap();

        // Assert
        assert_eq!(model.beta()[0], 1.0);
        assert!((model.beta()[1] + 1.0).abs() < 0.1, "beta = {:?}", model.beta());
        assert!(model.eigenvalues()[0] > model.eigenvalues()[1]);
        assert!(model.alpha()[1] > 0.0, "alpha = {:?}", model.alpha());
        assert!(model.rank_tests()[0].trace_rejects());
    }

    #[test]
    // Purpose
    // -------
    // Shapes and the long-run identity of the VAR representation.
    //
    // Given
    // -----
    // - 200 observations, lag = 2.
    //
    // Expect
    // ------
    // - residuals: (200 − 3) × 2; Σ: 2 × 2 symmetric.
    // - three VAR matrices summing to I + αβ'.
    fn fit_shapes_and_var_identity() {
        // Arrange
        let y = cointegrated_pair(29, 200);

        // Act
        let model = VecmModel::fit(y.view(), 2, &VecmOptions::default()).unwrap();
        let a = model.to_var();

        // Assert
        assert_eq!(model.residuals().dim(), (197, 2));
        assert_eq!(model.nobs(), 197);
        assert_eq!(model.gamma().len(), 2);
        assert!((model.sigma()[[0, 1]] - model.sigma()[[1, 0]]).abs() < 1e-12);
        assert_eq!(a.len(), 3);
        let sum = a.iter().fold(Array2::<f64>::zeros((2, 2)), |acc, m| acc + m);
        let expected = Array2::<f64>::eye(2) + model.pi();
        for (x, e) in sum.iter().zip(expected.iter()) {
            assert!((x - e).abs() < 1e-10);
        }
        assert!(model.log_likelihood().is_finite());
    }

    #[test]
    fn fit_propagates_insufficient_data() {
        let y = cointegrated_pair(3, 6);
        assert!(matches!(
            VecmModel::fit(y.view(), 2, &VecmOptions::default()),
            Err(VecmError::InsufficientData { .. })
        ));
    }
}
