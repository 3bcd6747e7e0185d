//! statistical_tests::adf — augmented Dickey–Fuller test with drift.
//!
//! Purpose
//! -------
//! Test a series for a unit root using the test regression with drift
//!
//! ```text
//! Δzₜ = a + b·zₜ₋₁ + Σᵢ₌₁ᵏ cᵢ·Δzₜ₋ᵢ + εₜ
//! ```
//!
//! and report the τ₂ statistic (t ratio of b) together with φ₁ (joint F test
//! of a = b = 0) and their Dickey–Fuller critical values.
//!
//! Key behaviors
//! -------------
//! - The number of lagged differences k is selected in `1..=max_lag` by BIC,
//!   with every candidate fitted on the same sample (the one left over after
//!   `max_lag` lags). The chosen model is then refitted on the longest
//!   sample available for k.
//! - When no `max_lag` is supplied, Schwert's rule ⌊12·(n/100)^¼⌋ is used.
//! - Critical values come from the Dickey–Fuller tables, with the row chosen
//!   by the length n of the differenced series.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is finite and non-constant (validated).
//! - The regressions are plain OLS via [`OlsFit`](crate::regression::OlsFit);
//!   a rank-deficient design surfaces as `TestError::Regression`.
//!
//! Conventions
//! -----------
//! - Unit root is rejected when τ₂ lies *below* the critical value.
//! - Critical-value triples are ordered (1%, 5%, 10%).

use ndarray::{Array1, Array2, Axis, s};
use serde::Serialize;

use crate::regression::{OlsFit, fit_multivariate};
use crate::statistical_tests::errors::{TestError, TestResult};
use crate::statistical_tests::ndiffs::difference;
use crate::statistical_tests::validation::validate_series;

/// Name of the lagged-level regressor in the ADF regression.
pub const Z_LAG_TERM: &str = "z.lag.1";

/// Sample-size rows of the Dickey–Fuller tables (upper bounds, exclusive).
const SIZE_ROWS: [usize; 5] = [25, 50, 100, 250, 500];

/// τ₂ (intercept, no trend) critical values at (1%, 5%, 10%).
const TAU2_TABLE: [[f64; 3]; 6] = [
    [-3.75, -3.00, -2.63],
    [-3.58, -2.93, -2.60],
    [-3.51, -2.89, -2.58],
    [-3.46, -2.88, -2.57],
    [-3.44, -2.87, -2.57],
    [-3.43, -2.86, -2.57],
];

/// φ₁ critical values at (1%, 5%, 10%).
const PHI1_TABLE: [[f64; 3]; 6] = [
    [7.88, 5.18, 4.12],
    [7.06, 4.86, 3.94],
    [6.70, 4.71, 3.86],
    [6.52, 4.63, 3.81],
    [6.47, 4.61, 3.79],
    [6.43, 4.59, 3.78],
];

/// Critical values at the conventional significance levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl CriticalValues {
    fn from_row(row: [f64; 3]) -> Self {
        CriticalValues { one_pct: row[0], five_pct: row[1], ten_pct: row[2] }
    }
}

/// Dickey–Fuller τ₂ and φ₁ critical values for a sample of size `n`.
pub fn adf_critical_values(n: usize) -> (CriticalValues, CriticalValues) {
    let row = SIZE_ROWS.iter().position(|&bound| n < bound).unwrap_or(SIZE_ROWS.len());
    (CriticalValues::from_row(TAU2_TABLE[row]), CriticalValues::from_row(PHI1_TABLE[row]))
}

/// Schwert's default lag bound ⌊12·(n/100)^¼⌋.
pub fn schwert_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

/// AdfOutcome — result of an ADF test with drift.
///
/// Fields
/// ------
/// - `lag`: number of lagged differences k in the final regression.
/// - `tau`: τ₂, the t ratio of the lagged level.
/// - `phi1`: F statistic for a = b = 0.
/// - `tau_critical`, `phi1_critical`: table values for `n`.
/// - `n`: length of the differenced series (table row selector).
/// - `bic_path`: `(k, BIC)` for every candidate on the common sample.
/// - `regression`: the final auxiliary regression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfOutcome {
    pub lag: usize,
    pub tau: f64,
    pub phi1: f64,
    pub tau_critical: CriticalValues,
    pub phi1_critical: CriticalValues,
    pub n: usize,
    pub bic_path: Vec<(usize, f64)>,
    pub regression: OlsFit,
}

impl AdfOutcome {
    /// Run the ADF test with drift and BIC lag selection.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `&[f64]`
    ///   Finite, non-constant series (levels).
    /// - `max_lag`: `Option<usize>`
    ///   Largest number of lagged differences considered; `None` uses
    ///   [`schwert_max_lag`]. Values of 0 are raised to 1.
    ///
    /// Returns
    /// -------
    /// `TestResult<AdfOutcome>` with the selected lag, τ₂, φ₁, critical
    /// values, the BIC path and the final regression.
    ///
    /// Errors
    /// ------
    /// - Validation errors for short, non-finite or constant input.
    /// - `InvalidLag` when the common sample cannot identify the largest
    ///   candidate model.
    /// - `Regression` when an auxiliary fit fails (e.g. rank deficiency).
    pub fn adf_drift(data: &[f64], max_lag: Option<usize>) -> TestResult<Self> {
        validate_series(data, 4)?;
        let dz = difference(data);
        let n = dz.len();
        let max_lag = max_lag.unwrap_or_else(|| schwert_max_lag(data.len())).max(1);

        // Largest candidate has max_lag + 2 coefficients on n - max_lag rows;
        // keep at least one residual degree of freedom.
        if max_lag + (max_lag + 2) >= n {
            return Err(TestError::InvalidLag { lag: max_lag, n });
        }

        let mut bic_path = Vec::with_capacity(max_lag);
        for k in 1..=max_lag {
            let (y, x) = adf_design(data, &dz, k, max_lag);
            let fit = fit_adf(&y, &x, k)?;
            bic_path.push((k, fit.information_criterion((fit.nobs as f64).ln())));
        }
        let lag = bic_path
            .iter()
            .fold((1, f64::INFINITY), |best, &(k, bic)| if bic < best.1 { (k, bic) } else { best })
            .0;

        let (y, x) = adf_design(data, &dz, lag, lag);
        let regression = fit_adf(&y, &x, lag)?;
        let z_idx = regression.term_index(Z_LAG_TERM).unwrap_or(1);
        let tau = regression.t_values[z_idx];

        // Restricted model for φ₁: lagged differences only, no intercept.
        let restricted = x.slice(s![.., 1..]).to_owned();
        let y2 = y.view().insert_axis(Axis(1));
        let rss_r = fit_multivariate(y2, restricted.view())?.rss()[0];
        let phi1 = ((rss_r - regression.rss) / 2.0) / (regression.rss / regression.df_resid as f64);

        let (tau_critical, phi1_critical) = adf_critical_values(n);
        Ok(AdfOutcome { lag, tau, phi1, tau_critical, phi1_critical, n, bic_path, regression })
    }

    /// `true` when τ₂ rejects the unit root at 5%.
    pub fn rejects_unit_root(&self) -> bool {
        self.tau < self.tau_critical.five_pct
    }
}

/// CointegrationOutcome — Engle–Granger two-step result.
///
/// The first step regresses the dependent series on the regressor (with an
/// intercept); the second runs [`AdfOutcome::adf_drift`] on the residuals.
/// `cointegrated` is `true` iff τ₂ lies below its 5% critical value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CointegrationOutcome {
    pub dependent: String,
    pub regressor: String,
    pub regression: OlsFit,
    pub adf: AdfOutcome,
    pub cointegrated: bool,
}

impl CointegrationOutcome {
    /// Engle–Granger test of `dependent` on `regressor`.
    ///
    /// Errors
    /// ------
    /// - `Regression` for length mismatch or a degenerate first step.
    /// - Anything [`AdfOutcome::adf_drift`] reports for the residuals.
    pub fn engle_granger(
        dependent: (&str, &[f64]), regressor: (&str, &[f64]), max_lag: Option<usize>,
    ) -> TestResult<Self> {
        let (dep_name, y) = dependent;
        let (reg_name, x) = regressor;
        let y = Array1::from(y.to_vec());
        let x = Array2::from_shape_fn((x.len(), 1), |(i, _)| x[i]);

        let regression = OlsFit::fit(y.view(), x.view(), &[reg_name])?;
        let residuals = regression.residuals.to_vec();
        let adf = AdfOutcome::adf_drift(&residuals, max_lag)?;
        let cointegrated = adf.rejects_unit_root();

        Ok(CointegrationOutcome {
            dependent: dep_name.to_string(),
            regressor: reg_name.to_string(),
            regression,
            adf,
            cointegrated,
        })
    }
}

fn adf_names(k: usize) -> Vec<String> {
    let mut names = vec![Z_LAG_TERM.to_string()];
    names.extend((1..=k).map(|i| format!("z.diff.lag{i}")));
    names
}

fn fit_adf(y: &Array1<f64>, x: &Array2<f64>, k: usize) -> TestResult<OlsFit> {
    let names = adf_names(k);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    Ok(OlsFit::fit(y.view(), x.view(), &refs)?)
}

/// Response Δzₜ and regressors [zₜ₋₁, Δzₜ₋₁, …, Δzₜ₋ₖ] for t ≥ `start`,
/// indexed on the differenced series.
fn adf_design(levels: &[f64], dz: &[f64], k: usize, start: usize) -> (Array1<f64>, Array2<f64>) {
    let rows = dz.len() - start;
    let y = Array1::from_shape_fn(rows, |r| dz[start + r]);
    let x = Array2::from_shape_fn((rows, k + 1), |(r, c)| {
        let t = start + r;
        if c == 0 { levels[t] } else { dz[t - c] }
    });
    (y, x)
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
    // - Critical-value row selection and Schwert's default lag.
    // - Rejection for a stationary AR(1), non-rejection for a random walk.
    // - Consistency of τ₂ with a direct regression at the selected lag.
    // - Engle–Granger on a cointegrated pair.
    // - Errors for short input.
    //
    // They intentionally DO NOT cover:
    // - Response-surface p-values; the crate reports table values only.
    // -------------------------------------------------------------------------

    fn shocks(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    fn ar1(phi: f64, eps: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(eps.len());
        let mut prev = 0.0;
        for e in eps {
            prev = phi * prev + e;
            out.push(prev);
        }
        out
    }

    #[test]
    fn critical_values_pick_row_by_sample_size() {
        let (tau, phi) = adf_critical_values(24);
        assert_eq!(tau.five_pct, -3.00);
        assert_eq!(phi.one_pct, 7.88);

        let (tau, _) = adf_critical_values(250);
        assert_eq!(tau.one_pct, -3.44);

        let (tau, phi) = adf_critical_values(10_000);
        assert_eq!(tau.ten_pct, -2.57);
        assert_eq!(phi.five_pct, 4.59);

        assert_eq!(schwert_max_lag(100), 12);
        assert_eq!(schwert_max_lag(300), 15);
    }

    #[test]
    // Purpose
    // -------
    // A strongly mean-reverting AR(1) rejects the unit root; its random-walk
    // counterpart does not.
    //
    // Given
    // -----
    // - 250 seeded N(0, 1) shocks.
    // - zₜ = 0.3·zₜ₋₁ + εₜ and wₜ = wₜ₋₁ + εₜ, max_lag = 4.
    //
    // Expect
    // ------
    // - AR(1): τ₂ below the 1% critical value.
    // - Walk: τ₂ above the 1% critical value.
    fn adf_drift_separates_stationary_from_unit_root() {
        // Arrange
        let eps = shocks(3, 250);
        let stationary = ar1(0.3, &eps);
        let walk = ar1(1.0, &eps);

        // Act
        let st = AdfOutcome::adf_drift(&stationary, Some(4)).unwrap();
        let rw = AdfOutcome::adf_drift(&walk, Some(4)).unwrap();

        // Assert
        assert!(st.tau < st.tau_critical.one_pct, "stationary τ = {}", st.tau);
        assert!(st.rejects_unit_root());
        assert!(rw.tau > rw.tau_critical.one_pct, "walk τ = {}", rw.tau);
        assert_eq!(st.bic_path.len(), 4);
        assert!((1..=4).contains(&st.lag));
    }

    #[test]
    // Purpose
    // -------
    // τ₂ must equal the t ratio of zₜ₋₁ in a direct regression at the
    // selected lag on the longest sample, and φ₁ must be non-negative.
    //
    // Given
    // -----
    // - A seeded AR(1) with φ = 0.6, n = 120, max_lag = 3.
    //
    // Expect
    // ------
    // - |τ₂ − t(zₜ₋₁)| < 1e-10; regression nobs = n − 1 − lag.
    fn adf_drift_tau_matches_direct_regression() {
        // Arrange
        let data = ar1(0.6, &shocks(5, 120));

        // Act
        let outcome = AdfOutcome::adf_drift(&data, Some(3)).unwrap();
        let dz = difference(&data);
        let (y, x) = adf_design(&data, &dz, outcome.lag, outcome.lag);
        let direct = fit_adf(&y, &x, outcome.lag).unwrap();

        // Assert
        assert!((outcome.tau - direct.t_values[1]).abs() < 1e-10);
        assert_eq!(outcome.regression.nobs, 119 - outcome.lag);
        assert!(outcome.phi1 >= 0.0);
        assert_eq!(outcome.n, 119);
    }

    #[test]
    // Purpose
    // -------
    // Engle–Granger finds cointegration when y = 2 + 0.5·x + stationary noise
    // with x a random walk.
    //
    // Given
    // -----
    // - x: cumulated seeded shocks (n = 200); u: AR(1) with φ = 0.2.
    //
    // Expect
    // ------
    // - Slope within 0.05 of 0.5; `cointegrated == true`.
    fn engle_granger_detects_cointegrated_pair() {
        // Arrange
        let x = ar1(1.0, &shocks(21, 200));
        let u = ar1(0.2, &shocks(22, 200));
        let y: Vec<f64> = x.iter().zip(&u).map(|(xi, ui)| 2.0 + 0.5 * xi + 0.3 * ui).collect();

        // Act
        let outcome =
            CointegrationOutcome::engle_granger(("B", &y[..]), ("A", &x[..]), Some(4)).unwrap();

        // Assert
        let slope = outcome.regression.coefficients[1];
        assert!((slope - 0.5).abs() < 0.05, "slope = {slope}");
        assert!(outcome.cointegrated);
        assert_eq!(outcome.dependent, "B");
        assert_eq!(outcome.regression.terms[1], "A");
    }

    #[test]
    fn adf_drift_rejects_too_short_sample() {
        let data = [1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        assert!(matches!(
            AdfOutcome::adf_drift(&data, Some(3)),
            Err(TestError::InvalidLag { lag: 3, .. })
        ));
    }
}
