//! vecm::lag_select — information-criterion lag selection for a VAR in
//! levels.
//!
//! Purpose
//! -------
//! Choose the autoregressive order of the levels VAR that underlies the
//! VECM. Every candidate `p = 1..=lag_max` is fitted with a constant on the
//! same effective sample `T = n − lag_max`, so the criteria are comparable.
//!
//! Key behaviors
//! -------------
//! - Σ̂(p) = E'E / T from the OLS residuals of each candidate.
//! - With `m(p) = p·K² + K` free coefficients and `n*(p) = p·K + 1`
//!   regressors per equation:
//!
//!   ```text
//!   AIC(p) = ln|Σ̂| + 2·m / T
//!   HQ(p)  = ln|Σ̂| + 2·ln(ln T)·m / T
//!   SC(p)  = ln|Σ̂| + ln T·m / T
//!   FPE(p) = ((T + n*) / (T − n*))^K · |Σ̂|
//!   ```
//!
//! - Each criterion's minimiser is reported; [`InformationCriterion`]
//!   chooses which one drives the VECM (HQ by default).
//!
//! Invariants & assumptions
//! ------------------------
//! - `lag_max ≥ 1` and `T > n*(lag_max)`; otherwise the selection fails
//!   before any fit is attempted.
//! - Ties resolve to the smallest p.
//!
//! Downstream usage
//! ----------------
//! - The pipeline converts the selected VAR order with
//!   [`vecm_lag_from_var`] before calling
//!   [`VecmModel::fit`](super::VecmModel::fit).

use std::str::FromStr;

use ndarray::{ArrayView2, s};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::regression::fit_multivariate;
use crate::regression::linalg::{cross_moment, log_det_spd};
use crate::vecm::design::{lag_matrix, with_intercept};
use crate::vecm::errors::{VecmError, VecmResult};

/// Which criterion picks the VAR order.
///
/// Implements `FromStr` with case-insensitive names (`"aic"`, `"hq"`,
/// `"sc"`, `"fpe"`); unknown names return `VecmError::UnknownCriterion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    Aic,
    #[default]
    Hq,
    Sc,
    Fpe,
}

impl FromStr for InformationCriterion {
    type Err = VecmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aic" => Ok(InformationCriterion::Aic),
            "hq" => Ok(InformationCriterion::Hq),
            "sc" | "bic" => Ok(InformationCriterion::Sc),
            "fpe" => Ok(InformationCriterion::Fpe),
            _ => Err(VecmError::UnknownCriterion { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InformationCriterion::Aic => "AIC",
            InformationCriterion::Hq => "HQ",
            InformationCriterion::Sc => "SC",
            InformationCriterion::Fpe => "FPE",
        };
        f.write_str(name)
    }
}

/// Criterion values for one candidate order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriteriaRow {
    pub p: usize,
    pub aic: f64,
    pub hq: f64,
    pub sc: f64,
    pub fpe: f64,
}

impl CriteriaRow {
    pub fn value(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Hq => self.hq,
            InformationCriterion::Sc => self.sc,
            InformationCriterion::Fpe => self.fpe,
        }
    }
}

/// LagSelection — criteria table and per-criterion minimisers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagSelection {
    pub lag_max: usize,
    pub sample: usize,
    pub rows: Vec<CriteriaRow>,
    pub aic: usize,
    pub hq: usize,
    pub sc: usize,
    pub fpe: usize,
}

impl LagSelection {
    /// Order chosen by `criterion`.
    pub fn selected(&self, criterion: InformationCriterion) -> usize {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Hq => self.hq,
            InformationCriterion::Sc => self.sc,
            InformationCriterion::Fpe => self.fpe,
        }
    }
}

/// Evaluate AIC, HQ, SC and FPE for VAR(p) in levels, p = 1..=lag_max.
///
/// Parameters
/// ----------
/// - `levels`: `n × K` matrix, rows in time order.
/// - `lag_max`: largest candidate order, ≥ 1.
///
/// Errors
/// ------
/// - `InvalidLag` when `lag_max == 0`.
/// - `InsufficientData` when `n − lag_max ≤ lag_max·K + 1`.
/// - `SingularMoment` when a residual covariance is not positive definite.
/// - `Regression` for a rank-deficient design.
pub fn select_lag_order(levels: ArrayView2<'_, f64>, lag_max: usize) -> VecmResult<LagSelection> {
    if lag_max == 0 {
        return Err(VecmError::InvalidLag { lag: 0, reason: "lag_max must be at least 1" });
    }
    let (n, k) = levels.dim();
    let needed = lag_max * k + 2;
    if n < lag_max + needed {
        return Err(VecmError::InsufficientData { nobs: n.saturating_sub(lag_max), needed });
    }
    let sample = n - lag_max;
    let t = sample as f64;
    let y = levels.slice(s![lag_max.., ..]);
    let all_lags = lag_matrix(levels, lag_max, lag_max);

    let mut rows = Vec::with_capacity(lag_max);
    for p in 1..=lag_max {
        let x = with_intercept(all_lags.slice(s![.., ..p * k]));
        let fit = fit_multivariate(y, x.view())?;
        let sigma = cross_moment(&fit.residuals, &fit.residuals);
        let ln_det = log_det_spd(&sigma)
            .ok_or(VecmError::SingularMoment { which: "VAR residual covariance" })?;

        let m = (p * k * k + k) as f64;
        let n_star = (p * k + 1) as f64;
        let row = CriteriaRow {
            p,
            aic: ln_det + 2.0 * m / t,
            hq: ln_det + 2.0 * t.ln().ln() * m / t,
            sc: ln_det + t.ln() * m / t,
            fpe: ((t + n_star) / (t - n_star)).powi(k as i32) * ln_det.exp(),
        };
        debug!(p, aic = row.aic, hq = row.hq, sc = row.sc, fpe = row.fpe, "VAR lag candidate");
        rows.push(row);
    }

    let argmin = |criterion: InformationCriterion| {
        rows.iter()
            .fold((1, f64::INFINITY), |best, r| {
                let v = r.value(criterion);
                if v < best.1 { (r.p, v) } else { best }
            })
            .0
    };
    let (aic, hq, sc, fpe) = (
        argmin(InformationCriterion::Aic),
        argmin(InformationCriterion::Hq),
        argmin(InformationCriterion::Sc),
        argmin(InformationCriterion::Fpe),
    );

    Ok(LagSelection { lag_max, sample, rows, aic, hq, sc, fpe })
}

/// VECM lag from a levels-VAR order: `max(p_var − 1, 1)`.
pub fn vecm_lag_from_var(p_var: usize) -> usize {
    p_var.saturating_sub(1).max(1)
}
