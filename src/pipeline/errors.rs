//! pipeline::errors — which stage failed, and why.
//!
//! Purpose
//! -------
//! The analysis is one sequential run; when it halts, the user needs the
//! failing stage (and, for per-series stages, the series) together with
//! the underlying error from the subtree that raised it.
//!
//! Key behaviors
//! -------------
//! - [`PipelineError`] pairs a [`Stage`] with a [`StageError`] that wraps
//!   the subtree error unchanged.
//! - `std::error::Error::source` exposes the wrapped error so `anyhow`
//!   chains print the full cause.

use crate::data::DataError;
use crate::diagnostics::DiagnosticsError;
use crate::report::ReportError;
use crate::statistical_tests::TestError;
use crate::transform::TransformError;
use crate::vecm::VecmError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Acquisition,
    Reshaping,
    Stationarity { series: String },
    Transformation,
    Cointegration,
    LagSelection,
    Estimation,
    Diagnostics,
    Reporting,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Configuration => f.write_str("configuration"),
            Stage::Acquisition => f.write_str("data acquisition"),
            Stage::Reshaping => f.write_str("reshaping"),
            Stage::Stationarity { series } => write!(f, "stationarity check ({series})"),
            Stage::Transformation => f.write_str("transformation"),
            Stage::Cointegration => f.write_str("cointegration test"),
            Stage::LagSelection => f.write_str("lag selection"),
            Stage::Estimation => f.write_str("VECM estimation"),
            Stage::Diagnostics => f.write_str("diagnostics"),
            Stage::Reporting => f.write_str("reporting"),
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Invalid { field: &'static str, reason: String },
    Read { path: String, text: String },
    Parse { text: String },
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { field, reason } => {
                write!(f, "Config Error: invalid '{field}': {reason}")
            }
            ConfigError::Read { path, text } => {
                write!(f, "Config Error: cannot read '{path}': {text}")
            }
            ConfigError::Parse { text } => write!(f, "Config Error: {text}"),
        }
    }
}

/// The error of the subtree that failed.
#[derive(Debug, Clone, PartialEq)]
pub enum StageError {
    Config(ConfigError),
    Data(DataError),
    Test(TestError),
    Transform(TransformError),
    Vecm(VecmError),
    Diagnostics(DiagnosticsError),
    Report(ReportError),
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::Config(err) => err.fmt(f),
            StageError::Data(err) => err.fmt(f),
            StageError::Test(err) => err.fmt(f),
            StageError::Transform(err) => err.fmt(f),
            StageError::Vecm(err) => err.fmt(f),
            StageError::Diagnostics(err) => err.fmt(f),
            StageError::Report(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for StageError {}

macro_rules! stage_error_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(impl From<$ty> for StageError {
            fn from(err: $ty) -> Self {
                StageError::$variant(err)
            }
        })*
    };
}

stage_error_from!(
    Config => ConfigError,
    Data => DataError,
    Test => TestError,
    Transform => TransformError,
    Vecm => VecmError,
    Diagnostics => DiagnosticsError,
    Report => ReportError,
);

/// PipelineError — a failed stage and its cause.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineError {
    pub stage: Stage,
    pub source: StageError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        PipelineError { stage, source: source.into() }
    }

    /// Closure for `map_err` that tags an error with `stage`.
    pub fn at<E: Into<StageError>>(stage: Stage) -> impl FnOnce(E) -> PipelineError {
        move |err| PipelineError::new(stage, err)
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.source)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
