//! statistical_tests::validation — input guards shared by the tests.
//!
//! Every public test entry point calls one of these helpers first so that
//! short, non-finite, or degenerate inputs surface as [`TestError`] values
//! instead of panics or silently meaningless statistics.

use crate::statistical_tests::errors::{TestError, TestResult};

/// Check that `data` has at least `min_len` finite, non-constant values.
///
/// Errors
/// ------
/// - `InsufficientData` when `data.len() < min_len`.
/// - `InvalidData` for the first NaN or ±∞ element.
/// - `ConstantSeries` when every element equals the first one.
pub fn validate_series(data: &[f64], min_len: usize) -> TestResult<()> {
    if data.len() < min_len {
        return Err(TestError::InsufficientData { needed: min_len, found: data.len() });
    }

    if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(TestError::InvalidData { index, value });
    }

    if is_constant(data) {
        return Err(TestError::ConstantSeries);
    }

    Ok(())
}

/// Portmanteau-specific guards: the series checks above (without the
/// constancy check, which surfaces later as `ZeroTau`), `q > 0` and
/// `1 ≤ d < n`.
pub fn validate_portmanteau_input(data: &[f64], q: f64, d: usize) -> TestResult<()> {
    if data.len() < 2 {
        return Err(TestError::InsufficientData { needed: 2, found: data.len() });
    }
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(TestError::InvalidData { index, value });
    }
    if q.is_nan() || q <= 0.0 {
        return Err(TestError::InvalidQValue(q));
    }
    if d == 0 || d >= data.len() {
        return Err(TestError::InvalidLag { lag: d, n: data.len() });
    }
    Ok(())
}

/// Significance levels must lie strictly inside (0, 1).
pub fn validate_alpha(alpha: f64) -> TestResult<()> {
    if alpha > 0.0 && alpha < 1.0 { Ok(()) } else { Err(TestError::InvalidAlpha(alpha)) }
}

/// `true` when all elements are exactly equal (or the slice is empty).
pub(crate) fn is_constant(data: &[f64]) -> bool {
    match data.first() {
        Some(&first) => data.iter().all(|&v| v == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Successful validation of well-formed series.
    // - Each error branch of `validate_series`, `validate_portmanteau_input`
    //   and `validate_alpha`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that a finite, varying series of sufficient length passes.
    //
    // Given
    // -----
    // - A series of length 4 and `min_len = 3`.
    //
    // Expect
    // ------
    // - `validate_series` returns `Ok(())`.
    fn validate_series_accepts_valid_input() {
        // Arrange
        let data = [1.0, 2.0, 0.5, 3.0];

        // Act
        let result = validate_series(&data, 3);

        // Assert
        assert!(result.is_ok(), "Expected Ok(()) for valid input, got {result:?}");
    }

    #[test]
    fn validate_series_rejects_short_input() {
        let result = validate_series(&[1.0, 2.0], 3);
        assert_eq!(result, Err(TestError::InsufficientData { needed: 3, found: 2 }));
    }

    #[test]
    // Purpose
    // -------
    // Ensure that the first non-finite value is reported with its index.
    //
    // Given
    // -----
    // - A series with NaN at index 2 and +∞ at index 3.
    //
    // Expect
    // ------
    // - `InvalidData { index: 2, .. }`.
    fn validate_series_reports_first_non_finite_value() {
        // Arrange
        let data = [1.0, 2.0, f64::NAN, f64::INFINITY];

        // Act
        let result = validate_series(&data, 2);

        // Assert
        match result {
            Err(TestError::InvalidData { index, value }) => {
                assert_eq!(index, 2);
                assert!(value.is_nan());
            }
            other => panic!("expected InvalidData at index 2, got {other:?}"),
        }
    }

    #[test]
    fn validate_series_rejects_constant_input() {
        let result = validate_series(&[4.2; 10], 3);
        assert_eq!(result, Err(TestError::ConstantSeries));
    }

    #[test]
    // Purpose
    // -------
    // Cover the portmanteau guard branches for `q` and `d`.
    //
    // Given
    // -----
    // - A finite series of length 3.
    //
    // Expect
    // ------
    // - q = 0 ⇒ `InvalidQValue`; d = 0 or d = n ⇒ `InvalidLag`; a valid
    //   triple passes.
    fn validate_portmanteau_input_checks_q_and_d() {
        // Arrange
        let data = [0.1, -0.2, 0.3];

        // Act & Assert
        assert_eq!(validate_portmanteau_input(&data, 0.0, 1), Err(TestError::InvalidQValue(0.0)));
        assert_eq!(
            validate_portmanteau_input(&data, 2.4, 0),
            Err(TestError::InvalidLag { lag: 0, n: 3 })
        );
        assert_eq!(
            validate_portmanteau_input(&data, 2.4, 3),
            Err(TestError::InvalidLag { lag: 3, n: 3 })
        );
        assert!(validate_portmanteau_input(&data, 2.4, 2).is_ok());
    }

    #[test]
    fn validate_alpha_requires_open_unit_interval() {
        assert!(validate_alpha(0.05).is_ok());
        assert_eq!(validate_alpha(0.0), Err(TestError::InvalidAlpha(0.0)));
        assert_eq!(validate_alpha(1.0), Err(TestError::InvalidAlpha(1.0)));
    }
}
