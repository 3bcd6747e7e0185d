//! vecm::errors — failures of lag selection and Johansen estimation.
//!
//! Purpose
//! -------
//! Make every way the VECM stage can fail explicit: too little data for the
//! requested lags, singular moment matrices, an eigen solver that runs out
//! of iterations, or a cointegrating vector that cannot be normalised.
//! None of these ever produce a partially filled model.

use crate::regression::RegressionError;

pub type VecmResult<T> = Result<T, VecmError>;

/// VecmError — error conditions for the VECM subtree.
///
/// Variants
/// --------
/// - `InsufficientData { nobs, needed }`
///   The effective sample cannot identify the requested model.
/// - `InvalidLag { lag, reason }`
///   Zero lags, or a lag incompatible with the data.
/// - `DimensionMismatch { expected, found }`
///   Matrices or labels with incompatible shapes.
/// - `SingularMoment { which }`
///   A moment matrix (`S00`, `S11`, residual covariance, …) is not
///   positive definite.
/// - `EigenNotConverged { max_iter }`
///   The symmetric eigen solver did not converge within the cap.
/// - `InvalidEigenvalue { value }`
///   An eigenvalue outside [0, 1), which the reduced-rank problem cannot
///   produce with well-conditioned moments.
/// - `NormalizationFailed { value }`
///   The first element of β is (numerically) zero.
/// - `UnknownCriterion { name }`
///   Unrecognised information-criterion name.
/// - `Regression(err)`
///   An auxiliary least-squares fit failed.
#[derive(Debug, Clone, PartialEq)]
pub enum VecmError {
    InsufficientData { nobs: usize, needed: usize },
    InvalidLag { lag: usize, reason: &'static str },
    DimensionMismatch { expected: usize, found: usize },
    SingularMoment { which: &'static str },
    EigenNotConverged { max_iter: usize },
    InvalidEigenvalue { value: f64 },
    NormalizationFailed { value: f64 },
    UnknownCriterion { name: String },
    Regression(RegressionError),
}

impl std::error::Error for VecmError {}

impl std::fmt::Display for VecmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VecmError::InsufficientData { nobs, needed } => {
                write!(f, "VECM Error: {nobs} usable observations, at least {needed} required")
            }
            VecmError::InvalidLag { lag, reason } => {
                write!(f, "VECM Error: invalid lag {lag}: {reason}")
            }
            VecmError::DimensionMismatch { expected, found } => {
                write!(f, "VECM Error: dimension mismatch (expected {expected}, found {found})")
            }
            VecmError::SingularMoment { which } => {
                write!(f, "VECM Error: moment matrix {which} is singular or not positive definite")
            }
            VecmError::EigenNotConverged { max_iter } => write!(
                f,
                "VECM Error: eigen decomposition did not converge within {max_iter} iterations"
            ),
            VecmError::InvalidEigenvalue { value } => {
                write!(f, "VECM Error: eigenvalue {value} outside [0, 1)")
            }
            VecmError::NormalizationFailed { value } => write!(
                f,
                "VECM Error: cannot normalise cointegrating vector, first element is {value}"
            ),
            VecmError::UnknownCriterion { name } => write!(
                f,
                "VECM Error: unknown information criterion '{name}'. Valid options are case \
                 insensitive 'aic', 'hq', 'sc' or 'fpe'."
            ),
            VecmError::Regression(err) => write!(f, "VECM Error: {err}"),
        }
    }
}

impl From<RegressionError> for VecmError {
    fn from(err: RegressionError) -> Self {
        VecmError::Regression(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eigen_not_converged_reports_cap() {
        let msg = VecmError::EigenNotConverged { max_iter: 500 }.to_string();
        assert!(msg.contains("500"));
    }

    #[test]
    fn regression_errors_convert() {
        let err: VecmError = RegressionError::ConstantResponse.into();
        assert!(matches!(err, VecmError::Regression(RegressionError::ConstantResponse)));
    }
}
