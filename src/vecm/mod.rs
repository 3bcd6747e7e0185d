//! vecm — lag selection and Johansen estimation of a rank-one VECM.
//!
//! Purpose
//! -------
//! Provide the estimation core of the analysis: choose the autoregressive
//! order with an information criterion, then fit
//!
//! ```text
//! Δyₜ = α β' yₜ₋₁ + c + Σᵢ₌₁ᵖ Γᵢ Δyₜ₋ᵢ + uₜ
//! ```
//!
//! by maximum likelihood with rank one and an unrestricted constant.
//!
//! Key behaviors
//! -------------
//! - [`select_lag_order`] evaluates AIC/HQ/SC/FPE for VAR(1..=lag_max);
//!   [`vecm_lag_from_var`] turns the chosen order into the VECM lag.
//! - [`VecmModel::fit`] runs the Johansen reduced-rank regression
//!   ([`JohansenDecomposition`]) and re-estimates the short-run terms.
//! - [`VecmModel::to_var`] gives the levels-VAR matrices used by the
//!   impulse-response and variance-decomposition code.
//!
//! Invariants & assumptions
//! ------------------------
//! - Estimation is closed form; the only iterative step is the symmetric
//!   eigen solver, whose iteration cap turns non-convergence into
//!   [`VecmError::EigenNotConverged`].
//! - Fitted models are immutable.
//!
//! Testing notes
//! -------------
//! - Unit tests use seeded simulated systems with known order or known
//!   cointegrating vector.

pub mod design;
pub mod errors;
pub mod johansen;
pub mod lag_select;
pub mod model;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{VecmError, VecmResult};
pub use self::johansen::{JohansenDecomposition, RankCritical, RankTest};
pub use self::lag_select::{
    CriteriaRow, InformationCriterion, LagSelection, select_lag_order, vecm_lag_from_var,
};
pub use self::model::{VecmModel, VecmOptions};

pub mod prelude {
    pub use super::errors::{VecmError, VecmResult};
    pub use super::lag_select::{InformationCriterion, select_lag_order, vecm_lag_from_var};
    pub use super::model::{VecmModel, VecmOptions};
}
