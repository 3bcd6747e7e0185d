//! transform — stationarity-inducing transformation of the level series.
//!
//! Purpose
//! -------
//! Turn the wide table of levels into growth rates suitable for the VECM
//! stage: `100 · Δᵈ ln(x)` per series, where `d` is the estimated
//! differencing order raised to at least one.
//!
//! Invariants & assumptions
//! ------------------------
//! - Levels must be strictly positive; a non-positive value is reported
//!   with its series and month.
//! - All columns are cut to the same rows, so the result has exactly
//!   `n − max(dᵢ)` rows.

pub mod errors;
pub mod log_diff;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{TransformError, TransformResult};
pub use self::log_diff::{DEFAULT_SCALE, TransformedPair, log_levels, transform_series};
