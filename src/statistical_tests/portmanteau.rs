//! statistical_tests::portmanteau — robust automatic portmanteau test for
//! residual whiteness.
//!
//! Purpose
//! -------
//! Check that the per-equation residuals of a fitted VECM carry no leftover
//! serial correlation, using the heteroskedasticity-robust automatic test of
//! Escanciano & Lobato (2009, J. Econometrics 150, 209–225).
//!
//! Key behaviors
//! -------------
//! - ρ̃ⱼ² = γ̂ⱼ² / τ̂ⱼ with γ̂ⱼ the lag-j autocovariance and τ̂ⱼ its
//!   heteroskedasticity proxy, both with a 1/(n − j) denominator.
//! - Qₚ* = n·Σⱼ₌₁ᵖ ρ̃ⱼ²; the lag p̃ maximises Qₚ* − π(p, n, q) over
//!   1 ≤ p ≤ d, where π is p·ln n (BIC) when √n·maxⱼ|ρ̃ⱼ| ≤ √(q·ln n) and 2p
//!   (AIC) otherwise. Ties keep the smallest p.
//! - The statistic at p̃ is referred to χ²(1).
//! - [`residual_whiteness`] runs the test column by column on a residual
//!   matrix and labels each outcome.
//!
//! Invariants & assumptions
//! ------------------------
//! - 1 ≤ d < n and q > 0 (validated); τ̂ⱼ = 0 surfaces as
//!   `TestError::ZeroTau(j)`.
//!
//! Testing notes
//! -------------
//! - Helpers are tested on short synthetic series: monotonicity of Qₚ*,
//!   maximality of p̃, the AIC/BIC switch, and the zero-τ̂ error.

use ndarray::ArrayView2;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::statistical_tests::errors::{TestError, TestResult};
use crate::statistical_tests::validation::validate_portmanteau_input;

/// Penalty switch constant recommended by Escanciano & Lobato.
pub const DEFAULT_Q: f64 = 2.4;

/// Default upper lag bound for monthly residuals.
pub const DEFAULT_MAX_LAG: usize = 12;

/// PortmanteauOutcome — selected lag, robust Box–Pierce statistic at that
/// lag, and its χ²(1) p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortmanteauOutcome {
    p_tilde: usize,
    stat: f64,
    p_value: f64,
}

impl PortmanteauOutcome {
    /// Run the Escanciano–Lobato test on `data`.
    ///
    /// Parameters
    /// ----------
    /// - `data`: residual series, length n ≥ 2 (re-centred internally).
    /// - `q`: penalty switch constant, q > 0.
    /// - `d`: upper lag bound, 1 ≤ d < n.
    ///
    /// Errors
    /// ------
    /// - Validation errors (`InsufficientData`, `InvalidData`,
    ///   `InvalidQValue`, `InvalidLag`).
    /// - `ZeroTau(j)` when the variance proxy at lag j vanishes.
    pub fn escanciano_lobato(data: &[f64], q: f64, d: usize) -> TestResult<Self> {
        validate_portmanteau_input(data, q, d)?;
        let n = data.len() as f64;
        let centred: Vec<f64> = {
            let mean = data.iter().sum::<f64>() / n;
            data.iter().map(|x| x - mean).collect()
        };

        let rho_sq = robust_autocorrelations(&centred, d)?;
        let p_tilde = select_lag(&rho_sq, n, q);
        let stat = robust_box_pierce(&rho_sq, n, p_tilde);

        let chi2 =
            ChiSquared::new(1.0).map_err(|e| TestError::Distribution { text: e.to_string() })?;
        Ok(PortmanteauOutcome { p_tilde, stat, p_value: 1.0 - chi2.cdf(stat) })
    }

    /// Selected lag p̃.
    pub fn p_tilde(&self) -> usize {
        self.p_tilde
    }

    /// Robust Box–Pierce statistic Qₚ̃*.
    pub fn stat(&self) -> f64 {
        self.stat
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Outcome of the whiteness check for one labelled residual series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhitenessCheck {
    pub series: String,
    pub outcome: PortmanteauOutcome,
}

/// Run [`PortmanteauOutcome::escanciano_lobato`] on every column of
/// `residuals` (rows = time), with `d = min(max_lag, n − 1)`.
///
/// Errors
/// ------
/// - `LabelMismatch` when `names` does not match the column count.
/// - Anything the per-column test reports.
pub fn residual_whiteness(
    residuals: ArrayView2<'_, f64>, names: &[String], q: f64, max_lag: usize,
) -> TestResult<Vec<WhitenessCheck>> {
    if names.len() != residuals.ncols() {
        return Err(TestError::LabelMismatch { labels: names.len(), columns: residuals.ncols() });
    }
    let n = residuals.nrows();
    let d = max_lag.min(n.saturating_sub(1));
    residuals
        .columns()
        .into_iter()
        .zip(names)
        .map(|(col, name)| {
            let data = col.to_vec();
            let outcome = PortmanteauOutcome::escanciano_lobato(&data, q, d)?;
            Ok(WhitenessCheck { series: name.clone(), outcome })
        })
        .collect()
}

// ---------- helpers ----------

/// γ̂ⱼ on centred data.
#[inline]
fn autocovariance(centred: &[f64], j: usize) -> f64 {
    let pairs = centred.len() - j;
    centred[j..].iter().zip(centred).map(|(a, b)| a * b).sum::<f64>() / pairs as f64
}

/// τ̂ⱼ on centred data.
#[inline]
fn variance_proxy(centred: &[f64], j: usize) -> f64 {
    let pairs = centred.len() - j;
    centred[j..].iter().zip(centred).map(|(a, b)| (a * a) * (b * b)).sum::<f64>() / pairs as f64
}

/// ρ̃ⱼ² for j = 1..=d, stored at index j - 1.
fn robust_autocorrelations(centred: &[f64], d: usize) -> TestResult<Vec<f64>> {
    (1..=d)
        .map(|j| {
            let tau = variance_proxy(centred, j);
            if tau == 0.0 {
                return Err(TestError::ZeroTau(j));
            }
            Ok(autocovariance(centred, j).powi(2) / tau)
        })
        .collect()
}

#[inline]
fn robust_box_pierce(rho_sq: &[f64], n: f64, p: usize) -> f64 {
    n * rho_sq[..p].iter().sum::<f64>()
}

#[inline]
fn penalty(p: usize, n: f64, q: f64, max_abs_rho: f64) -> f64 {
    let ln_n = n.ln();
    if n.sqrt() * max_abs_rho <= (q * ln_n).sqrt() { p as f64 * ln_n } else { 2.0 * p as f64 }
}

/// Smallest p in 1..=d maximising Qₚ* − π(p, n, q).
fn select_lag(rho_sq: &[f64], n: f64, q: f64) -> usize {
    let max_abs_rho = rho_sq.iter().map(|r| r.sqrt()).fold(0.0, f64::max);
    let mut best = (1, f64::NEG_INFINITY);
    for p in 1..=rho_sq.len() {
        let value = robust_box_pierce(rho_sq, n, p) - penalty(p, n, q, max_abs_rho);
        if value > best.1 {
            best = (p, value);
        }
    }
    best.0
}
