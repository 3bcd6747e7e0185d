//! regression::errors — failures of least-squares fits.
//!
//! Rank deficiency and too-short samples are surfaced explicitly so that a
//! collinear cointegrating regression or an over-parameterised VAR never
//! yields silently meaningless coefficients.

pub type RegressionResult<T> = Result<T, RegressionError>;

#[derive(Debug, Clone, PartialEq)]
pub enum RegressionError {
    /// Fewer observations than (or as many as) regressors.
    InsufficientData { nobs: usize, ncoef: usize },
    /// The design matrix does not have full column rank.
    RankDeficient { rank: usize, ncoef: usize },
    /// Row counts (or name counts) of the inputs disagree.
    DimensionMismatch { expected: usize, found: usize },
    /// An input cell is NaN or ±∞.
    NonFinite { row: usize, col: usize, value: f64 },
    /// The response has zero variance, so R² and F are undefined.
    ConstantResponse,
    /// A reference distribution could not be built (e.g. zero degrees of freedom).
    Distribution { text: String },
}

impl std::error::Error for RegressionError {}

impl std::fmt::Display for RegressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegressionError::InsufficientData { nobs, ncoef } => write!(
                f,
                "Regression Error: {nobs} observations cannot identify {ncoef} coefficients"
            ),
            RegressionError::RankDeficient { rank, ncoef } => write!(
                f,
                "Regression Error: design matrix is rank deficient (rank {rank} < {ncoef} columns)"
            ),
            RegressionError::DimensionMismatch { expected, found } => {
                write!(
                    f,
                    "Regression Error: dimension mismatch (expected {expected}, found {found})"
                )
            }
            RegressionError::NonFinite { row, col, value } => {
                write!(f, "Regression Error: non-finite value {value} at row {row}, column {col}")
            }
            RegressionError::ConstantResponse => {
                write!(f, "Regression Error: response has zero variance")
            }
            RegressionError::Distribution { text } => {
                write!(f, "Regression Error: reference distribution unavailable: {text}")
            }
        }
    }
}
