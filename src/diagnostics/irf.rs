//! diagnostics::irf — orthogonalised impulse responses of a fitted VECM.
//!
//! Purpose
//! -------
//! Trace how a one-standard-deviation orthogonal shock to each variable
//! propagates through the system over `0..=H` steps.
//!
//! Key behaviors
//! -------------
//! - MA coefficients of the levels VAR: Φ₀ = I, Φₕ = Σⱼ Φₕ₋ⱼ Aⱼ (j ≤ p + 1).
//! - Orthogonalised responses Θₕ = Φₕ P with P the lower Cholesky factor of
//!   Σ, so the first variable is ordered first.
//! - Results are stored as `Array3` indexed `[impulse, response, step]`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Θ₀ = P: at step 0 a shock to the second variable does not move the
//!   first.
//! - Responses are in the units of the system variables (log-change × 100).
//!
//! Downstream usage
//! ----------------
//! - [`fevd`](super::fevd::fevd) reuses [`orthogonal_coefficients`].
//! - [`bootstrap_bands`](super::bootstrap::bootstrap_bands) attaches
//!   percentile bands via [`ImpulseResponse::with_bands`].

use ndarray::{Array2, Array3, ArrayView1, s};
use serde::Serialize;

use crate::diagnostics::bootstrap::IrfBands;
use crate::diagnostics::errors::{DiagnosticsError, DiagnosticsResult};
use crate::regression::linalg::cholesky_lower;
use crate::vecm::VecmModel;

/// ImpulseResponse — Θₕ for h = 0..=H with optional bootstrap bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpulseResponse {
    horizon: usize,
    responses: Array3<f64>,
    bands: Option<IrfBands>,
}

impl ImpulseResponse {
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Responses indexed `[impulse, response, step]`.
    pub fn responses(&self) -> &Array3<f64> {
        &self.responses
    }

    /// Path of `response` after a shock to `impulse`, steps `0..=H`.
    pub fn path(&self, impulse: usize, response: usize) -> ArrayView1<'_, f64> {
        self.responses.slice(s![impulse, response, ..])
    }

    pub fn bands(&self) -> Option<&IrfBands> {
        self.bands.as_ref()
    }

    /// Attach bootstrap bands computed for the same horizon.
    pub fn with_bands(mut self, bands: IrfBands) -> Self {
        self.bands = Some(bands);
        self
    }
}

/// Orthogonalised impulse responses up to `horizon` steps.
///
/// Errors
/// ------
/// - `InvalidHorizon` for `horizon == 0`.
/// - `SingularCovariance` when Σ has no Cholesky factor.
pub fn impulse_response(model: &VecmModel, horizon: usize) -> DiagnosticsResult<ImpulseResponse> {
    if horizon == 0 {
        return Err(DiagnosticsError::InvalidHorizon { horizon });
    }
    let responses = orthogonal_responses(model, horizon)?;
    Ok(ImpulseResponse { horizon, responses, bands: None })
}

/// Θ₀ … Θ_H packed as `[impulse, response, step]`.
pub(crate) fn orthogonal_responses(
    model: &VecmModel, horizon: usize,
) -> DiagnosticsResult<Array3<f64>> {
    let theta = orthogonal_coefficients(model, horizon)?;
    let k = model.dim();
    Ok(Array3::from_shape_fn((k, k, horizon + 1), |(impulse, response, h)| {
        theta[h][[response, impulse]]
    }))
}

/// Θₕ = Φₕ P for h = 0..=horizon; entry `[response, impulse]`.
pub(crate) fn orthogonal_coefficients(
    model: &VecmModel, horizon: usize,
) -> DiagnosticsResult<Vec<Array2<f64>>> {
    let p = cholesky_lower(model.sigma()).ok_or(DiagnosticsError::SingularCovariance)?;
    Ok(ma_coefficients(&model.to_var(), horizon).iter().map(|phi| phi.dot(&p)).collect())
}

/// Φ₀ … Φ_horizon of a VAR with coefficient matrices `a` (A₁ first).
pub(crate) fn ma_coefficients(a: &[Array2<f64>], horizon: usize) -> Vec<Array2<f64>> {
    let k = a.first().map_or(0, |m| m.nrows());
    let mut phi: Vec<Array2<f64>> = Vec::with_capacity(horizon + 1);
    phi.push(Array2::eye(k));
    for h in 1..=horizon {
        let mut next = Array2::<f64>::zeros((k, k));
        for (j, aj) in a.iter().enumerate().take(h) {
            next += &phi[h - 1 - j].dot(aj);
        }
        phi.push(next);
    }
    phi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::fixtures::fitted_pair;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The MA recursion on VARs with closed-form Φₕ.
    // - The recursive identification at step 0 (Θ₀ = P).
    // - Shapes and the zero-horizon guard.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Φₕ for a diagonal VAR(1) is Aʰ; for a scalar VAR(2) the recursion
    // follows φₕ = a₁φₕ₋₁ + a₂φₕ₋₂.
    //
    // Given
    // -----
    // - A = 0.5·I; and scalar a₁ = 0.5, a₂ = 0.2.
    //
    // Expect
    // ------
    // - Φ₃ = 0.125·I; scalar φ = [1, 0.5, 0.45, 0.325].
    fn ma_coefficients_follow_recursion() {
        // Arrange
        let a1 = vec![array![[0.5, 0.0], [0.0, 0.5]]];
        let a2 = vec![array![[0.5]], array![[0.2]]];

        // Act
        let phi1 = ma_coefficients(&a1, 3);
        let phi2 = ma_coefficients(&a2, 3);

        // Assert
        assert_eq!(phi1.len(), 4);
        assert!((phi1[3][[0, 0]] - 0.125).abs() < 1e-12);
        assert!(phi1[3][[0, 1]].abs() < 1e-12);
        let expected = [1.0, 0.5, 0.45, 0.325];
        for (h, e) in expected.iter().enumerate() {
            assert!((phi2[h][[0, 0]] - e).abs() < 1e-12, "h = {h}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Step 0 of the orthogonalised responses is the Cholesky factor of Σ.
    //
    // Given
    // -----
    // - A VECM fitted to a simulated cointegrated pair, H = 6.
    //
    // Expect
    // ------
    // - Shape (2, 2, 7).
    // - A shock to variable 1 leaves variable 0 unchanged at step 0.
    // - Own impact responses equal the diagonal of P.
    fn impulse_response_step_zero_is_cholesky_factor() {
        // Arrange
        let model = fitted_pair(5, 250, 1);
        let p = cholesky_lower(model.sigma()).unwrap();

        // Act
        let irf = impulse_response(&model, 6).unwrap();

        // Assert
        assert_eq!(irf.responses().dim(), (2, 2, 7));
        assert_eq!(irf.horizon(), 6);
        assert!(irf.path(1, 0)[0].abs() < 1e-12);
        assert!((irf.path(0, 0)[0] - p[[0, 0]]).abs() < 1e-12);
        assert!((irf.path(1, 1)[0] - p[[1, 1]]).abs() < 1e-12);
        assert!((irf.path(0, 1)[0] - p[[1, 0]]).abs() < 1e-12);
        assert!(irf.bands().is_none());
    }

    #[test]
    fn impulse_response_rejects_zero_horizon() {
        let model = fitted_pair(5, 120, 1);
        assert_eq!(
            impulse_response(&model, 0),
            Err(DiagnosticsError::InvalidHorizon { horizon: 0 })
        );
    }
}
