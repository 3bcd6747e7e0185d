//! transform::errors — failures of the log-difference transformation.

use crate::data::Period;

pub type TransformResult<T> = Result<T, TransformError>;

/// TransformError — reasons a series cannot be log-differenced.
///
/// Variants
/// --------
/// - `NonPositive { series, period, value }`
///   A level ≤ 0 (or NaN) in a named series; logarithms are undefined.
/// - `NonPositiveValue { index, value }`
///   The same condition for an unnamed slice (see
///   [`transform_series`](super::transform_series)).
/// - `OrderMismatch { orders, columns }`
///   One differencing order is required per column.
/// - `EmptyAfterTransform { nrows, dropped }`
///   Differencing consumed every row.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    NonPositive { series: String, period: Period, value: f64 },
    NonPositiveValue { index: usize, value: f64 },
    OrderMismatch { orders: usize, columns: usize },
    EmptyAfterTransform { nrows: usize, dropped: usize },
}

impl std::error::Error for TransformError {}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::NonPositive { series, period, value } => write!(
                f,
                "Transform Error: {series} has non-positive value {value} at {period}; cannot \
                 take logarithms"
            ),
            TransformError::NonPositiveValue { index, value } => {
                write!(f, "Transform Error: non-positive value {value} at index {index}")
            }
            TransformError::OrderMismatch { orders, columns } => write!(
                f,
                "Transform Error: {orders} differencing orders supplied for {columns} columns"
            ),
            TransformError::EmptyAfterTransform { nrows, dropped } => write!(
                f,
                "Transform Error: dropping {dropped} leading rows leaves nothing of {nrows}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_message_names_series_and_period() {
        let err = TransformError::NonPositive {
            series: "PMSAVE".to_string(),
            period: Period::new(2005, 7).unwrap(),
            value: -12.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("PMSAVE"));
        assert!(msg.contains("2005-07"));
        assert!(msg.contains("-12.5"));
    }
}
