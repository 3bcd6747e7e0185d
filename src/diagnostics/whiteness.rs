//! diagnostics::whiteness — serial-correlation checks on VECM residuals.
//!
//! Runs the Escanciano–Lobato automatic portmanteau test on each equation's
//! residuals. The test is robust to conditional heteroskedasticity, which
//! monthly income and saving innovations typically show.

use crate::diagnostics::errors::DiagnosticsResult;
use crate::statistical_tests::{WhitenessCheck, residual_whiteness};
use crate::vecm::VecmModel;

/// One [`WhitenessCheck`] per equation, labelled with `series_ids`.
///
/// Errors
/// ------
/// - `Test(LabelMismatch)` when the labels do not match the equations.
/// - `Test(..)` for anything the portmanteau test reports.
pub fn residual_checks(
    model: &VecmModel, series_ids: &[String], q: f64, max_lag: usize,
) -> DiagnosticsResult<Vec<WhitenessCheck>> {
    Ok(residual_whiteness(model.residuals().view(), series_ids, q, max_lag)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::fixtures::fitted_pair;
    use crate::diagnostics::DiagnosticsError;
    use crate::statistical_tests::TestError;

    #[test]
    fn residual_checks_cover_every_equation() {
        let model = fitted_pair(13, 250, 1);
        let names = vec!["A".to_string(), "B".to_string()];
        let checks = residual_checks(&model, &names, 2.4, 12).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[1].series, "B");
        assert!(checks.iter().all(|c| (0.0..=1.0).contains(&c.outcome.p_value())));
    }

    #[test]
    fn residual_checks_reject_wrong_labels() {
        let model = fitted_pair(13, 120, 1);
        let names = vec!["A".to_string()];
        assert!(matches!(
            residual_checks(&model, &names, 2.4, 12),
            Err(DiagnosticsError::Test(TestError::LabelMismatch { labels: 1, columns: 2 }))
        ));
    }
}
