//! diagnostics — what the fitted VECM says about the pair's dynamics.
//!
//! Purpose
//! -------
//! Turn a [`VecmModel`](crate::vecm::VecmModel) into the artifacts the
//! report presents: impulse responses, variance decompositions, the
//! error-correction-term path, bootstrap bands and residual checks.
//!
//! Key behaviors
//! -------------
//! - [`impulse_response`] — orthogonalised (Cholesky) responses, steps
//!   `0..=H`, `[impulse, response, step]`.
//! - [`fevd`] — variance shares, steps `1..=H`, `[variable, step, shock]`.
//! - [`ect_path`] — `levels · β` and its mean.
//! - [`bootstrap_bands`] — seeded residual bootstrap with percentile bands.
//! - [`residual_checks`] — Escanciano–Lobato test per equation.
//!
//! Conventions
//! -----------
//! - The variable order of the model is the Cholesky order: the first
//!   series reacts to the second only with a lag.
//!
//! Testing notes
//! -------------
//! - Tests share the seeded fixtures in `fixtures` (test builds only).

pub mod bootstrap;
pub mod ect;
pub mod errors;
pub mod fevd;
pub mod irf;
pub mod whiteness;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bootstrap::{BootstrapOptions, IrfBands, bootstrap_bands};
pub use self::ect::{EctPath, ect_path};
pub use self::errors::{DiagnosticsError, DiagnosticsResult};
pub use self::fevd::{Fevd, fevd};
pub use self::irf::{ImpulseResponse, impulse_response};
pub use self::whiteness::residual_checks;

#[cfg(test)]
pub(crate) mod fixtures {
    use ndarray::Array2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    use crate::vecm::{VecmModel, VecmOptions};

    /// y₁ a random walk, y₂ = y₁ + N(0, 0.5²) noise.
    pub(crate) fn cointegrated_pair(seed: u64, n: usize) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let shock = Normal::new(0.0, 1.0).unwrap();
        let noise = Normal::new(0.0, 0.5).unwrap();
        let mut y = Array2::<f64>::zeros((n, 2));
        let mut level = 50.0;
        for t in 0..n {
            level += shock.sample(&mut rng);
            y[[t, 0]] = level;
            y[[t, 1]] = level + noise.sample(&mut rng);
        }
        y
    }

    pub(crate) fn fitted_pair(seed: u64, n: usize, lag: usize) -> VecmModel {
        VecmModel::fit(cointegrated_pair(seed, n).view(), lag, &VecmOptions::default()).unwrap()
    }
}
