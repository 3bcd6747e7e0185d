//! diagnostics::errors — failures of the post-estimation diagnostics.
//!
//! Purpose
//! -------
//! Cover the ways impulse responses, variance decompositions, the ECT path,
//! the bootstrap and the residual checks can fail, and wrap errors from the
//! estimation and test subtrees they call into.

use crate::statistical_tests::TestError;
use crate::vecm::VecmError;

pub type DiagnosticsResult<T> = Result<T, DiagnosticsError>;

/// DiagnosticsError — error conditions for the diagnostics subtree.
///
/// Variants
/// --------
/// - `InvalidHorizon { horizon }`
///   A zero horizon.
/// - `SingularCovariance`
///   The residual covariance has no Cholesky factor.
/// - `DimensionMismatch { what, expected, found }`
///   Inputs whose shapes disagree (β vs levels, periods vs rows, …).
/// - `EmptyInput { what }`
///   No rows to work with.
/// - `InvalidOption { name, value }`
///   A bootstrap option outside its domain.
/// - `BootstrapFailed { runs }`
///   Not a single bootstrap replication produced a model.
/// - `Vecm(err)` / `Test(err)`
///   Errors from re-estimation or from the portmanteau test.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticsError {
    InvalidHorizon { horizon: usize },
    SingularCovariance,
    DimensionMismatch { what: &'static str, expected: usize, found: usize },
    EmptyInput { what: &'static str },
    InvalidOption { name: &'static str, value: f64 },
    BootstrapFailed { runs: usize },
    Vecm(VecmError),
    Test(TestError),
}

impl std::error::Error for DiagnosticsError {}

impl std::fmt::Display for DiagnosticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticsError::InvalidHorizon { horizon } => {
                write!(f, "Diagnostics Error: horizon must be at least 1, got {horizon}")
            }
            DiagnosticsError::SingularCovariance => {
                write!(f, "Diagnostics Error: residual covariance is not positive definite")
            }
            DiagnosticsError::DimensionMismatch { what, expected, found } => write!(
                f,
                "Diagnostics Error: {what} has length {found}, expected {expected}"
            ),
            DiagnosticsError::EmptyInput { what } => {
                write!(f, "Diagnostics Error: {what} is empty")
            }
            DiagnosticsError::InvalidOption { name, value } => {
                write!(f, "Diagnostics Error: invalid value {value} for {name}")
            }
            DiagnosticsError::BootstrapFailed { runs } => write!(
                f,
                "Diagnostics Error: none of the {runs} bootstrap replications could be estimated"
            ),
            DiagnosticsError::Vecm(err) => write!(f, "Diagnostics Error: {err}"),
            DiagnosticsError::Test(err) => write!(f, "Diagnostics Error: {err}"),
        }
    }
}

impl From<VecmError> for DiagnosticsError {
    fn from(err: VecmError) -> Self {
        DiagnosticsError::Vecm(err)
    }
}

impl From<TestError> for DiagnosticsError {
    fn from(err: TestError) -> Self {
        DiagnosticsError::Test(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_payloads() {
        let msg =
            DiagnosticsError::DimensionMismatch { what: "beta", expected: 2, found: 3 }.to_string();
        assert!(msg.contains("beta") && msg.contains('2') && msg.contains('3'));
        assert!(DiagnosticsError::BootstrapFailed { runs: 50 }.to_string().contains("50"));
    }

    #[test]
    fn wrapped_errors_keep_inner_message() {
        let err: DiagnosticsError = VecmError::EigenNotConverged { max_iter: 7 }.into();
        assert!(err.to_string().contains('7'));
        let err: DiagnosticsError = TestError::ConstantSeries.into();
        assert!(matches!(err, DiagnosticsError::Test(TestError::ConstantSeries)));
    }
}
