//! diagnostics::bootstrap — residual-bootstrap bands for impulse responses.
//!
//! Purpose
//! -------
//! Quantify sampling uncertainty of the orthogonalised responses without
//! distributional assumptions on the innovations.
//!
//! Key behaviors
//! -------------
//! - Residuals of the fitted model are centred and resampled by row with
//!   replacement, so contemporaneous correlation between equations is kept.
//! - Each replication rebuilds a levels path from the model's VAR
//!   representation, starting from the observed first `p + 1` rows, refits
//!   the VECM at the same lag and recomputes Θ₀ … Θ_H.
//! - Bands are pointwise percentiles (linear interpolation between order
//!   statistics) at `(1 − level)/2` and `(1 + level)/2`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A seeded `StdRng` makes the bands reproducible for a given seed.
//! - Replications whose refit fails are skipped and counted; the call only
//!   fails if none succeeds.

use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, s};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::diagnostics::errors::{DiagnosticsError, DiagnosticsResult};
use crate::diagnostics::irf::orthogonal_responses;
use crate::vecm::{VecmModel, VecmOptions};

/// Bootstrap settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapOptions {
    /// Number of replications.
    pub runs: usize,
    /// Seed of the resampling generator.
    pub seed: u64,
    /// Coverage of the pointwise band, in (0, 1).
    pub level: f64,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        BootstrapOptions { runs: 100, seed: 42, level: 0.95 }
    }
}

impl BootstrapOptions {
    /// Errors
    /// ------
    /// - `InvalidOption` for fewer than two runs or a level outside (0, 1).
    pub fn validate(&self) -> DiagnosticsResult<()> {
        if self.runs < 2 {
            let value = self.runs as f64;
            return Err(DiagnosticsError::InvalidOption { name: "bootstrap runs", value });
        }
        if !(self.level > 0.0 && self.level < 1.0) {
            let value = self.level;
            return Err(DiagnosticsError::InvalidOption { name: "bootstrap level", value });
        }
        Ok(())
    }
}

/// IrfBands — pointwise percentile bands, indexed like the responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrfBands {
    pub level: f64,
    pub runs: usize,
    pub failed: usize,
    pub lower: Array3<f64>,
    pub upper: Array3<f64>,
}

/// Residual-bootstrap percentile bands for the orthogonalised responses.
///
/// Parameters
/// ----------
/// - `model`: the fitted VECM.
/// - `levels`: the `n × K` matrix the model was fitted on.
/// - `horizon`: last response step.
/// - `opts`: runs, seed and coverage.
/// - `vecm_opts`: options for the refits.
///
/// Errors
/// ------
/// - `InvalidOption` / `InvalidHorizon` for bad settings.
/// - `DimensionMismatch` when `levels` is not the estimation sample.
/// - `BootstrapFailed` when no replication could be refitted.
pub fn bootstrap_bands(
    model: &VecmModel, levels: ArrayView2<'_, f64>, horizon: usize, opts: &BootstrapOptions,
    vecm_opts: &VecmOptions,
) -> DiagnosticsResult<IrfBands> {
    opts.validate()?;
    if horizon == 0 {
        return Err(DiagnosticsError::InvalidHorizon { horizon });
    }
    let a = model.to_var();
    let presample = a.len();
    let (n, k) = levels.dim();
    if n != model.nobs() + presample || k != model.dim() {
        return Err(DiagnosticsError::DimensionMismatch {
            what: "levels rows",
            expected: model.nobs() + presample,
            found: n,
        });
    }
    let resid = model.residuals();
    let mean = resid.mean_axis(Axis(0)).ok_or(DiagnosticsError::EmptyInput { what: "residuals" })?;
    let centred = resid - &mean;

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut draws: Vec<Array3<f64>> = Vec::with_capacity(opts.runs);
    let mut failed = 0usize;
    for run in 0..opts.runs {
        let sim = simulate(levels, &a, model.constant(), &centred, &mut rng);
        let refit = VecmModel::fit(sim.view(), model.lag(), vecm_opts)
            .map_err(DiagnosticsError::from)
            .and_then(|m| orthogonal_responses(&m, horizon));
        match refit {
            Ok(responses) => draws.push(responses),
            Err(err) => {
                failed += 1;
                debug!(run, %err, "bootstrap replication skipped");
            }
        }
    }
    if draws.is_empty() {
        return Err(DiagnosticsError::BootstrapFailed { runs: opts.runs });
    }
    if failed > 0 {
        warn!(failed, runs = opts.runs, "some bootstrap replications failed and were skipped");
    }

    let lo_p = (1.0 - opts.level) / 2.0;
    let hi_p = (1.0 + opts.level) / 2.0;
    let shape = (k, k, horizon + 1);
    let mut lower = Array3::<f64>::zeros(shape);
    let mut upper = Array3::<f64>::zeros(shape);
    let mut cell = Vec::with_capacity(draws.len());
    for ((i, j, h), lo) in lower.indexed_iter_mut() {
        cell.clear();
        cell.extend(draws.iter().map(|d| d[[i, j, h]]));
        cell.sort_by(|x, y| x.total_cmp(y));
        *lo = quantile_sorted(&cell, lo_p);
        upper[[i, j, h]] = quantile_sorted(&cell, hi_p);
    }
    info!(runs = opts.runs, failed, level = opts.level, "bootstrap bands computed");

    Ok(IrfBands { level: opts.level, runs: opts.runs, failed, lower, upper })
}

/// One bootstrap levels path: the first `a.len()` rows are observed, the
/// rest follow yₜ = c + Σⱼ Aⱼ yₜ₋ⱼ + u*ₜ.
fn simulate<R: Rng>(
    levels: ArrayView2<'_, f64>, a: &[Array2<f64>], constant: &Array1<f64>, resid: &Array2<f64>,
    rng: &mut R,
) -> Array2<f64> {
    let (n, k) = levels.dim();
    let presample = a.len();
    let draws = resid.nrows();
    let mut y = Array2::<f64>::zeros((n, k));
    y.slice_mut(s![..presample, ..]).assign(&levels.slice(s![..presample, ..]));
    for t in presample..n {
        let mut row = constant + &resid.row(rng.random_range(0..draws));
        for (j, aj) in a.iter().enumerate() {
            row += &aj.dot(&y.row(t - 1 - j));
        }
        y.row_mut(t).assign(&row);
    }
    y
}

/// Quantile of sorted data with linear interpolation between order
/// statistics; `sorted` must be non-empty.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    if lo + 1 >= n {
        return sorted[n - 1];
    }
    sorted[lo] + (h - lo as f64) * (sorted[lo + 1] - sorted[lo])
}
