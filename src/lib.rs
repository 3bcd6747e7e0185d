//! macro_vecm — lead-lag analysis of two monthly macro series.
//!
//! Purpose
//! -------
//! Fetch two monthly series (by default disposable personal income `DSPI`
//! and personal saving `PMSAVE` from FRED), establish their order of
//! integration, test for cointegration, fit a rank-one vector error
//! correction model and report impulse responses, variance decompositions
//! and the error-correction-term path.
//!
//! Key behaviors
//! -------------
//! - [`pipeline::run_analysis`] runs the whole analysis against any
//!   [`data::SeriesSource`] and returns an immutable
//!   [`pipeline::AnalysisReport`].
//! - [`report::write_report`] renders it as Markdown and JSON.
//! - Each stage is also usable on its own through its module.
//!
//! Invariants & assumptions
//! ------------------------
//! - Single-threaded and synchronous; the only blocking call is the HTTP
//!   fetch.
//! - Every failure is a typed error naming the stage; nothing is retried
//!   and no partially estimated model is ever returned.
//!
//! Conventions
//! -----------
//! - Series A is the regressor of the cointegrating regression and comes
//!   first in the Cholesky ordering; series B is the dependent variable.
//! - Transformed data are `100 · Δᵈ ln(x)` (percent log changes).
//!
//! Downstream usage
//! ----------------
//! - The `macro-vecm` binary wires configuration, logging, the data source
//!   and the report writer around [`pipeline::run_analysis`].

pub mod data;
pub mod diagnostics;
pub mod logging;
pub mod pipeline;
pub mod regression;
pub mod report;
pub mod statistical_tests;
pub mod transform;
pub mod vecm;
