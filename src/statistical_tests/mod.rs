//! statistical_tests — stationarity, unit-root, cointegration and residual
//! diagnostics.
//!
//! Purpose
//! -------
//! Collect the hypothesis tests the analysis pipeline runs on raw series,
//! cointegrating residuals and VECM residuals, together with their shared
//! validation and error handling.
//!
//! Key behaviors
//! -------------
//! - [`KpssOutcome::kpss_level`] and [`ndiffs`] decide how many differences
//!   each series needs.
//! - [`AdfOutcome::adf_drift`] tests for a unit root with drift and BIC lag
//!   selection; [`CointegrationOutcome::engle_granger`] wraps it into the
//!   two-step cointegration test.
//! - [`PortmanteauOutcome::escanciano_lobato`] and [`residual_whiteness`]
//!   check fitted residuals for leftover serial correlation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated once at each public entry point
//!   ([`validation`]); failures are [`TestError`] values, never panics.
//! - A constant input series is an error, not a stationary series.
//!
//! Conventions
//! -----------
//! - Critical values are tabulated constants; p-values are reported only
//!   where the reference distribution is known (KPSS interpolation, χ²).
//!
//! Downstream usage
//! ----------------
//! - Typical imports:
//!
//!   ```rust
//!   use macro_vecm::statistical_tests::prelude::*;
//!
//!   let outcome = ndiffs(&[1.0, 3.0, 2.0, 5.0, 4.0, 6.0], &NdiffsOptions::default())?;
//!   assert!(outcome.order <= 2);
//!   # Ok::<(), TestError>(())
//!   ```
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests on short hand-checked series and on
//!   seeded simulated data; the pipeline integration test exercises the
//!   whole chain.

pub mod adf;
pub mod errors;
pub mod kpss;
pub mod ndiffs;
pub mod portmanteau;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adf::{AdfOutcome, CointegrationOutcome, CriticalValues};
pub use self::errors::{TestError, TestResult};
pub use self::kpss::KpssOutcome;
pub use self::ndiffs::{KpssStep, NdiffsOptions, StationarityOutcome, ndiffs};
pub use self::portmanteau::{PortmanteauOutcome, WhitenessCheck, residual_whiteness};
pub use self::validation::validate_series;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::adf::{AdfOutcome, CointegrationOutcome};
    pub use super::errors::{TestError, TestResult};
    pub use super::kpss::KpssOutcome;
    pub use super::ndiffs::{NdiffsOptions, ndiffs};
    pub use super::portmanteau::PortmanteauOutcome;
}
