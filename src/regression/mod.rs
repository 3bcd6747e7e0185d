//! regression — least squares and the linear-algebra bridge it rests on.
//!
//! Purpose
//! -------
//! Centralise every least-squares computation (cointegrating regression,
//! ADF auxiliaries, VAR lag selection, Johansen concentration) in one QR
//! based engine with explicit rank checks.
//!
//! Key behaviors
//! -------------
//! - [`fit_multivariate`] for shared-design, multi-response fits.
//! - [`OlsFit`] for a single response with an `lm`-style summary.
//! - [`linalg`] helpers to move between `ndarray` and `nalgebra`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rank-deficient or under-determined designs are errors
//!   ([`RegressionError`]), never silently regularised.

pub mod errors;
pub mod linalg;
pub mod ols;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{RegressionError, RegressionResult};
pub use self::ols::{MultiOls, OlsFit, fit_multivariate, gaussian_loglik};
