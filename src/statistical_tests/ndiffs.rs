//! statistical_tests::ndiffs — KPSS-driven search for the differencing order.
//!
//! Purpose
//! -------
//! Estimate the minimum number of first differences a series needs before
//! the KPSS test no longer rejects level stationarity.
//!
//! Key behaviors
//! -------------
//! - Start at d = 0 and test the raw series. While the test rejects at
//!   `alpha` and `d < max_d`, difference once more and re-test.
//! - A series that becomes exactly constant after differencing is treated
//!   as stationary at that order (no test is run on it).
//! - Each test is recorded as a [`KpssStep`] so the report can show the
//!   search path.
//!
//! Invariants & assumptions
//! ------------------------
//! - A constant *input* series is an error (`TestError::ConstantSeries`),
//!   never "0 differences".
//! - The truncation lag at every step is ⌊3√m / 13⌋ for the current length
//!   m of the differenced series.
//! - When the search stops at `max_d` while still rejecting, the order is
//!   `max_d` and a warning is logged.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::statistical_tests::errors::TestResult;
use crate::statistical_tests::kpss::{KPSS_MIN_OBS, KpssOutcome, short_lag};
use crate::statistical_tests::validation::{is_constant, validate_alpha, validate_series};

/// Options for [`ndiffs`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NdiffsOptions {
    /// Significance level of each KPSS test.
    pub alpha: f64,
    /// Largest order considered.
    pub max_d: usize,
}

impl Default for NdiffsOptions {
    fn default() -> Self {
        NdiffsOptions { alpha: 0.05, max_d: 2 }
    }
}

/// One step of the search: the order tested and the outcome, or `None` when
/// the differenced series was constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpssStep {
    pub d: usize,
    pub outcome: Option<KpssOutcome>,
}

/// StationarityOutcome — selected order plus the search path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityOutcome {
    pub order: usize,
    pub steps: Vec<KpssStep>,
    /// `true` when the search stopped at `max_d` with the last test still
    /// rejecting.
    pub max_d_reached: bool,
}

/// Minimum number of differences required for level stationarity.
///
/// Parameters
/// ----------
/// - `data`: finite, non-constant series.
/// - `opts`: significance level and the order cap.
///
/// Errors
/// ------
/// - `InvalidAlpha` for `alpha ∉ (0, 1)`.
/// - `ConstantSeries`, `InvalidData`, `InsufficientData` from validation of
///   the input or of a differenced series that became too short.
pub fn ndiffs(data: &[f64], opts: &NdiffsOptions) -> TestResult<StationarityOutcome> {
    validate_alpha(opts.alpha)?;
    validate_series(data, KPSS_MIN_OBS)?;

    let mut series = data.to_vec();
    let mut d = 0;
    let mut steps = Vec::new();

    let first = KpssOutcome::kpss_level(&series, short_lag(series.len()))?;
    debug!(d, statistic = first.statistic(), p_value = first.p_value(), "KPSS step");
    let mut rejecting = first.rejects(opts.alpha);
    steps.push(KpssStep { d, outcome: Some(first) });

    while rejecting && d < opts.max_d {
        d += 1;
        series = difference(&series);
        if is_constant(&series) {
            debug!(d, "series constant after differencing");
            steps.push(KpssStep { d, outcome: None });
            return Ok(StationarityOutcome { order: d, steps, max_d_reached: false });
        }
        let outcome = KpssOutcome::kpss_level(&series, short_lag(series.len()))?;
        debug!(d, statistic = outcome.statistic(), p_value = outcome.p_value(), "KPSS step");
        rejecting = outcome.rejects(opts.alpha);
        steps.push(KpssStep { d, outcome: Some(outcome) });
    }

    let max_d_reached = rejecting && d == opts.max_d;
    if max_d_reached {
        warn!(max_d = opts.max_d, "KPSS still rejects at the maximum differencing order");
    }
    Ok(StationarityOutcome { order: d, steps, max_d_reached })
}

/// First difference `xₜ − xₜ₋₁`; one element shorter than the input.
pub fn difference(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistical_tests::errors::TestError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Order 0 for a stationary series, order 1 for its cumulative sum.
    // - A seeded random walk rejected in levels.
    // - The constant-after-differencing shortcut (a linear trend).
    // - Constant input and invalid alpha rejected as errors.
    // -------------------------------------------------------------------------

    fn cumsum(xs: &[f64]) -> Vec<f64> {
        xs.iter()
            .scan(0.0, |acc, e| {
                *acc += e;
                Some(*acc)
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // An integrated series needs one difference; its increments need none.
    //
    // Given
    // -----
    // - Increments uₜ = 1 + sin(t), t = 0..300 (stationary, bounded partial
    //   sums after demeaning) and their cumulative sum (a drifting level).
    //
    // Expect
    // ------
    // - ndiffs(level) = 1 with two recorded steps.
    // - ndiffs(increments) = 0 with one recorded step.
    fn ndiffs_integrated_series_needs_one_difference() {
        // Arrange
        let increments: Vec<f64> = (0..300).map(|t| 1.0 + (t as f64).sin()).collect();
        let level = cumsum(&increments);
        let opts = NdiffsOptions::default();

        // Act
        let level_outcome = ndiffs(&level, &opts).unwrap();
        let increments_outcome = ndiffs(&increments, &opts).unwrap();

        // Assert
        assert_eq!(level_outcome.order, 1);
        assert_eq!(level_outcome.steps.len(), 2);
        assert!(!level_outcome.max_d_reached);
        assert_eq!(increments_outcome.order, 0);
        assert_eq!(increments_outcome.steps.len(), 1);
    }

    #[test]
    // Purpose
    // -------
    // A seeded Gaussian random walk is flagged as non-stationary in levels.
    //
    // Given
    // -----
    // - 300 seeded N(0, 1) increments, cumulated.
    //
    // Expect
    // ------
    // - order ≥ 1 and the first step rejects at 5%.
    fn ndiffs_random_walk_is_differenced() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(11);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let noise: Vec<f64> = (0..300).map(|_| normal.sample(&mut rng)).collect();
        let walk = cumsum(&noise);

        // Act
        let outcome = ndiffs(&walk, &NdiffsOptions::default()).unwrap();

        // Assert
        assert!(outcome.order >= 1);
        let first = outcome.steps[0].outcome.unwrap();
        assert!(first.rejects(0.05), "level KPSS p-value = {}", first.p_value());
    }

    #[test]
    // Purpose
    // -------
    // A deterministic linear trend differences to a constant, which counts
    // as stationary at d = 1.
    //
    // Given
    // -----
    // - x = 0, 2, 4, …, 2·99.
    //
    // Expect
    // ------
    // - order 1, the last step carries no KPSS outcome.
    fn ndiffs_constant_after_differencing_stops_search() {
        // Arrange
        let data: Vec<f64> = (0..100).map(|t| 2.0 * t as f64).collect();

        // Act
        let outcome = ndiffs(&data, &NdiffsOptions::default()).unwrap();

        // Assert
        assert_eq!(outcome.order, 1);
        assert_eq!(outcome.steps.last().map(|s| s.outcome), Some(None));
    }

    #[test]
    fn ndiffs_rejects_constant_input_and_bad_alpha() {
        assert_eq!(ndiffs(&[3.0; 50], &NdiffsOptions::default()), Err(TestError::ConstantSeries));
        let opts = NdiffsOptions { alpha: 1.5, max_d: 2 };
        assert_eq!(ndiffs(&[1.0, 2.0, 0.0], &opts), Err(TestError::InvalidAlpha(1.5)));
    }

    #[test]
    fn difference_shortens_by_one() {
        assert_eq!(difference(&[1.0, 4.0, 9.0]), vec![3.0, 5.0]);
        assert!(difference(&[1.0]).is_empty());
    }
}
