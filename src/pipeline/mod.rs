//! pipeline — configuration, stage sequencing and stage-tagged errors.
//!
//! Purpose
//! -------
//! Glue the subtrees into the one-shot analysis: [`AnalysisConfig`] says
//! what to analyse, [`run_analysis`] does it, [`PipelineError`] says where
//! it stopped.
//!
//! Downstream usage
//! ----------------
//! - The binary builds a source with [`SourceConfig::build`], calls
//!   [`run_analysis`] and hands the [`AnalysisReport`] to
//!   [`crate::report`].
//! - Tests drive the same function through
//!   [`InMemorySource`](crate::data::InMemorySource).

pub mod config;
pub mod errors;
pub mod run;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::config::{AnalysisConfig, SourceConfig, WhitenessConfig};
pub use self::errors::{ConfigError, PipelineError, PipelineResult, Stage, StageError};
pub use self::run::{AnalysisReport, SeriesStationarity, run_analysis};
