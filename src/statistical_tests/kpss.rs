//! statistical_tests::kpss — KPSS test of level stationarity.
//!
//! Purpose
//! -------
//! Implement the Kwiatkowski–Phillips–Schmidt–Shin (1992) statistic for the
//! null hypothesis that a series is stationary around a constant level. The
//! differencing-order search in [`ndiffs`](super::ndiffs) is built on it.
//!
//! Key behaviors
//! -------------
//! - Demean the series, accumulate partial sums Sₜ = Σₛ≤ₜ eₛ and form
//!   η = n⁻² Σ Sₜ² / σ̂²(l).
//! - Estimate the long-run variance σ̂²(l) with Bartlett weights
//!   wₛ = 1 − s/(l + 1), s = 1..=l.
//! - Map η to a p-value by linear interpolation on the level-stationarity
//!   critical-value table, clamped to [0.01, 0.10] outside it.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input must be finite and non-constant; a constant series has σ̂² = 0
//!   and is rejected up front with `TestError::ConstantSeries`.
//! - The truncation lag must satisfy `l < n`.
//!
//! Conventions
//! -----------
//! - Large η rejects stationarity. A p-value of 0.01 means "at least as
//!   extreme as the 1% critical value", not an exact tail probability.
//! - The default truncation lag used by the differencing search is
//!   ⌊3√n / 13⌋ ([`short_lag`]).
//!
//! Testing notes
//! -------------
//! - Unit tests cover the interpolation table, a hand-computed statistic on
//!   a short series, and the qualitative stationary vs. random-walk split on
//!   seeded simulated data.

use serde::Serialize;

use crate::statistical_tests::errors::{TestError, TestResult};
use crate::statistical_tests::validation::validate_series;

/// Smallest sample the statistic is computed on.
pub const KPSS_MIN_OBS: usize = 3;

/// Upper-tail critical values for the level-stationarity statistic, as
/// `(significance, critical value)` in increasing order of the statistic.
pub const KPSS_LEVEL_CRITICAL_VALUES: [(f64, f64); 4] =
    [(0.10, 0.347), (0.05, 0.463), (0.025, 0.574), (0.01, 0.739)];

/// KpssOutcome — result of one KPSS level-stationarity test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpssOutcome {
    statistic: f64,
    p_value: f64,
    lags: usize,
    nobs: usize,
}

impl KpssOutcome {
    /// Run the KPSS level-stationarity test.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `&[f64]`
    ///   Finite, non-constant series of length n ≥ [`KPSS_MIN_OBS`].
    /// - `lags`: `usize`
    ///   Bartlett truncation lag l, with l < n.
    ///
    /// Returns
    /// -------
    /// `TestResult<KpssOutcome>` with the statistic η, the interpolated
    /// p-value, the lag used and the sample size.
    ///
    /// Errors
    /// ------
    /// - `InsufficientData`, `InvalidData`, `ConstantSeries` from input
    ///   validation.
    /// - `InvalidLag` when `lags >= n`.
    pub fn kpss_level(data: &[f64], lags: usize) -> TestResult<Self> {
        validate_series(data, KPSS_MIN_OBS)?;
        let n = data.len();
        if lags >= n {
            return Err(TestError::InvalidLag { lag: lags, n });
        }

        let mean = data.iter().sum::<f64>() / n as f64;
        let resid: Vec<f64> = data.iter().map(|x| x - mean).collect();

        let mut partial = 0.0;
        let mut sum_sq_partial = 0.0;
        for e in &resid {
            partial += e;
            sum_sq_partial += partial * partial;
        }

        let lrv = long_run_variance(&resid, lags);
        let statistic = sum_sq_partial / (n as f64 * n as f64) / lrv;

        Ok(KpssOutcome { statistic, p_value: kpss_p_value(statistic), lags, nobs: n })
    }

    /// KPSS statistic η.
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    /// Interpolated p-value in [0.01, 0.10].
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Bartlett truncation lag.
    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// `true` when stationarity is rejected at level `alpha`.
    pub fn rejects(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Truncation lag ⌊3√n / 13⌋.
pub fn short_lag(n: usize) -> usize {
    (3.0 * (n as f64).sqrt() / 13.0).floor() as usize
}

/// Linear interpolation of the p-value on [`KPSS_LEVEL_CRITICAL_VALUES`].
pub fn kpss_p_value(statistic: f64) -> f64 {
    let table = &KPSS_LEVEL_CRITICAL_VALUES;
    let (first_p, first_cv) = table[0];
    let (last_p, last_cv) = table[table.len() - 1];
    if statistic <= first_cv {
        return first_p;
    }
    if statistic >= last_cv {
        return last_p;
    }
    for pair in table.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if statistic <= c1 {
            return p0 + (statistic - c0) * (p1 - p0) / (c1 - c0);
        }
    }
    last_p
}

#[inline]
fn long_run_variance(resid: &[f64], lags: usize) -> f64 {
    let n = resid.len() as f64;
    let gamma0 = resid.iter().map(|e| e * e).sum::<f64>() / n;
    let mut acc = gamma0;
    for s in 1..=lags {
        let weight = 1.0 - s as f64 / (lags as f64 + 1.0);
        let gamma_s = resid[s..].iter().zip(resid).map(|(a, b)| a * b).sum::<f64>() / n;
        acc += 2.0 * weight * gamma_s;
    }
    acc
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
    // - The p-value interpolation and its clamping.
    // - A hand-computed statistic for a 4-point series with l = 0.
    // - Stationary white noise vs. a random walk on seeded draws.
    // - Lag validation and constant-input rejection.
    //
    // They intentionally DO NOT cover:
    // - Size/power of the test, which is a simulation-study concern.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Check the interpolation at table knots, between knots and outside.
    //
    // Given
    // -----
    // - Statistics 0.1, 0.347, 0.405, 0.739 and 2.0.
    //
    // Expect
    // ------
    // - 0.10, 0.10, 0.075, 0.01 and 0.01 respectively.
    fn kpss_p_value_interpolates_and_clamps() {
        // Arrange & Act & Assert
        assert_eq!(kpss_p_value(0.1), 0.10);
        assert!((kpss_p_value(0.347) - 0.10).abs() < 1e-12);
        // midway between 0.347 and 0.463
        assert!((kpss_p_value(0.405) - 0.075).abs() < 1e-12);
        assert!((kpss_p_value(0.739) - 0.01).abs() < 1e-12);
        assert_eq!(kpss_p_value(2.0), 0.01);
    }

    #[test]
    // Purpose
    // -------
    // Verify the statistic against a hand calculation.
    //
    // Given
    // -----
    // - x = [1, 2, 3, 4], l = 0: e = [-1.5, -0.5, 0.5, 1.5],
    //   S = [-1.5, -2, -1.5, 0], ΣS² = 8.5, σ̂² = 5/4.
    //
    // Expect
    // ------
    // - η = 8.5 / 16 / 1.25 = 0.425.
    fn kpss_level_matches_hand_computation() {
        // Arrange
        let data = [1.0, 2.0, 3.0, 4.0];

        // Act
        let outcome = KpssOutcome::kpss_level(&data, 0).unwrap();

        // Assert
        assert!((outcome.statistic() - 0.425).abs() < 1e-12);
        assert_eq!(outcome.nobs(), 4);
        assert_eq!(outcome.lags(), 0);
    }

    #[test]
    // Purpose
    // -------
    // White noise should not be rejected; a random walk should be.
    //
    // Given
    // -----
    // - 400 seeded N(0, 1) draws and their cumulative sum.
    // - l = ⌊3√400/13⌋ = 4.
    //
    // Expect
    // ------
    // - Noise: η below the 1% critical value.
    // - Walk: η above the 5% critical value, so the test rejects at 5%.
    fn kpss_level_separates_noise_from_random_walk() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let noise: Vec<f64> = (0..400).map(|_| normal.sample(&mut rng)).collect();
        let walk: Vec<f64> = noise
            .iter()
            .scan(0.0, |acc, e| {
                *acc += e;
                Some(*acc)
            })
            .collect();
        let lags = short_lag(400);

        // Act
        let noise_outcome = KpssOutcome::kpss_level(&noise, lags).unwrap();
        let walk_outcome = KpssOutcome::kpss_level(&walk, lags).unwrap();

        // Assert
        assert_eq!(lags, 4);
        assert!(noise_outcome.statistic() < 0.739, "noise η = {}", noise_outcome.statistic());
        assert!(walk_outcome.statistic() > 0.463, "walk η = {}", walk_outcome.statistic());
        assert!(walk_outcome.rejects(0.05));
    }

    #[test]
    fn kpss_level_rejects_bad_lag_and_constant_input() {
        assert_eq!(
            KpssOutcome::kpss_level(&[1.0, 2.0, 4.0], 3),
            Err(TestError::InvalidLag { lag: 3, n: 3 })
        );
        assert_eq!(KpssOutcome::kpss_level(&[2.0; 8], 1), Err(TestError::ConstantSeries));
    }
}
