//! diagnostics::fevd — forecast-error variance decomposition.
//!
//! Share of the h-step forecast-error variance of variable i due to
//! orthogonal shock j:
//!
//! ```text
//! ωᵢⱼ(h) = Σₛ₌₀ʰ⁻¹ Θₛ[i, j]² / Σₛ₌₀ʰ⁻¹ Σₘ Θₛ[i, m]²
//! ```
//!
//! Shares are stored `[variable, step, shock]` with step index 0 holding
//! h = 1; each `(variable, step)` row sums to one.

use ndarray::{Array2, Array3, ArrayView1, s};
use serde::Serialize;

use crate::diagnostics::errors::{DiagnosticsError, DiagnosticsResult};
use crate::diagnostics::irf::orthogonal_coefficients;
use crate::vecm::VecmModel;

/// Fevd — variance shares for h = 1..=H.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fevd {
    horizon: usize,
    shares: Array3<f64>,
}

impl Fevd {
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Shares indexed `[variable, step − 1, shock]`.
    pub fn shares(&self) -> &Array3<f64> {
        &self.shares
    }

    /// Share of `variable`'s `step`-ahead error variance due to `shock`.
    ///
    /// `step` is 1-based; `None` for `step == 0` or any index out of range.
    pub fn share(&self, variable: usize, step: usize, shock: usize) -> Option<f64> {
        self.shares.get([variable, step.checked_sub(1)?, shock]).copied()
    }

    /// Shares of every shock for `variable` at `step` (1-based), or `None`
    /// when `step` is 0, past the horizon, or `variable` is out of range.
    pub fn row(&self, variable: usize, step: usize) -> Option<ArrayView1<'_, f64>> {
        let (k, h, _) = self.shares.dim();
        let index = step.checked_sub(1)?;
        (variable < k && index < h).then(|| self.shares.slice(s![variable, index, ..]))
    }
}

/// Variance decomposition up to `horizon` steps.
///
/// Errors
/// ------
/// - `InvalidHorizon` for `horizon == 0`.
/// - `SingularCovariance` when Σ has no Cholesky factor.
pub fn fevd(model: &VecmModel, horizon: usize) -> DiagnosticsResult<Fevd> {
    if horizon == 0 {
        return Err(DiagnosticsError::InvalidHorizon { horizon });
    }
    let theta = orthogonal_coefficients(model, horizon - 1)?;
    let k = model.dim();
    let mut shares = Array3::<f64>::zeros((k, horizon, k));
    let mut cumulative = Array2::<f64>::zeros((k, k));
    for (h, th) in theta.iter().enumerate() {
        cumulative += &th.mapv(|v| v * v);
        for i in 0..k {
            let total: f64 = cumulative.row(i).sum();
            for j in 0..k {
                shares[[i, h, j]] = cumulative[[i, j]] / total;
            }
        }
    }
    Ok(Fevd { horizon, shares })
}
