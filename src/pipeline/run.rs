//! pipeline::run — the analysis from series ids to report artifacts.
//!
//! Purpose
//! -------
//! Execute the stages in order and collect every intermediate artifact in
//! one [`AnalysisReport`]:
//!
//! 1. fetch both series (`SeriesSource::fetch`)
//! 2. pivot to a wide monthly table
//! 3. KPSS-based differencing order of each `100 · ln` series
//! 4. `100 · Δᵈ ln(x)` with `d = max(order, 1)`
//! 5. Engle–Granger: OLS of B on A, ADF (drift, BIC) on the residuals
//! 6. VAR lag selection, VECM lag `max(p − 1, 1)`, Johansen fit with r = 1
//! 7. impulse responses, FEVD, ECT path, residual checks, optional
//!    bootstrap bands
//!
//! Invariants & assumptions
//! ------------------------
//! - Any failure halts the run with a [`PipelineError`] naming the stage;
//!   no stage ever sees a partially built input.
//! - A non-cointegrated Engle–Granger verdict is a warning and a report
//!   note, never an error.
//! - Apart from the source's fetch/cache side effects the run is a pure
//!   function of `(source, config)`.

use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::{SeriesSource, WideTable};
use crate::diagnostics::{
    DiagnosticsError, EctPath, Fevd, ImpulseResponse, bootstrap_bands, ect_path, fevd,
    impulse_response, residual_checks,
};
use crate::pipeline::config::AnalysisConfig;
use crate::pipeline::errors::{PipelineError, PipelineResult, Stage};
use crate::statistical_tests::{
    CointegrationOutcome, StationarityOutcome, TestError, WhitenessCheck, ndiffs,
};
use crate::transform::{DEFAULT_SCALE, TransformedPair, log_levels};
use crate::vecm::{
    InformationCriterion, LagSelection, VecmModel, select_lag_order, vecm_lag_from_var,
};

/// Differencing order found for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStationarity {
    pub series: String,
    pub outcome: StationarityOutcome,
}

/// AnalysisReport — every artifact of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    pub wide: WideTable,
    pub stationarity: Vec<SeriesStationarity>,
    pub transformed: TransformedPair,
    pub cointegration: CointegrationOutcome,
    pub lag_selection: LagSelection,
    pub criterion: InformationCriterion,
    pub var_order: usize,
    pub model: VecmModel,
    pub irf: ImpulseResponse,
    pub fevd: Fevd,
    pub ect: EctPath,
    pub whiteness: Vec<WhitenessCheck>,
    /// Warnings worth showing next to the results.
    pub notes: Vec<String>,
}

/// Run the whole analysis.
///
/// Parameters
/// ----------
/// - `source`: provider of monthly observations.
/// - `config`: validated here before anything is fetched.
///
/// Errors
/// ------
/// - [`PipelineError`] tagged with the failing [`Stage`].
pub fn run_analysis(
    source: &dyn SeriesSource, config: &AnalysisConfig,
) -> PipelineResult<AnalysisReport> {
    config.validate().map_err(PipelineError::at(Stage::Configuration))?;
    let ids = config.series_ids();
    let mut notes = Vec::new();

    // 1–2. Acquisition and reshaping.
    let long =
        source.fetch(&ids, config.start_date).map_err(PipelineError::at(Stage::Acquisition))?;
    let wide = WideTable::pivot(&long, &ids).map_err(PipelineError::at(Stage::Reshaping))?;
    if let (Some(first), Some(last)) = (wide.periods().first(), wide.periods().last()) {
        info!(rows = wide.nrows(), %first, %last, "wide table built");
    }

    // 3. Stationarity of the log levels.
    let logs = log_levels(&wide, DEFAULT_SCALE).map_err(PipelineError::at(Stage::Transformation))?;
    let stationarity = stationarity_orders(&logs, &ids, config)?;
    for s in stationarity.iter().filter(|s| s.outcome.max_d_reached) {
        notes.push(format!(
            "{}: KPSS still rejects after {} differences; the cap was used.",
            s.series, s.outcome.order
        ));
    }

    // 4. Transformation.
    let orders: Vec<usize> = stationarity.iter().map(|s| s.outcome.order).collect();
    let transformed = TransformedPair::from_wide(&wide, &orders)
        .map_err(PipelineError::at(Stage::Transformation))?;
    info!(
        rows = transformed.nrows(),
        dropped = transformed.dropped(),
        orders = ?transformed.orders(),
        "series transformed"
    );

    // 5. Engle–Granger, B on A.
    let cointegration = cointegration_test(&transformed, &ids, config)?;
    if !cointegration.cointegrated {
        warn!(
            tau = cointegration.adf.tau,
            critical = cointegration.adf.tau_critical.five_pct,
            "residuals not stationary at 5%; fitting the rank-one VECM anyway"
        );
        notes.push(format!(
            "Engle–Granger does not reject a unit root in the residuals (τ = {:.3}, 5% critical \
             value {:.2}); the rank-one VECM is estimated regardless.",
            cointegration.adf.tau, cointegration.adf.tau_critical.five_pct
        ));
    }

    // 6. Lag selection and estimation.
    let system = transformed.values().view();
    let lag_selection =
        select_lag_order(system, config.lag_max).map_err(PipelineError::at(Stage::LagSelection))?;
    let var_order = lag_selection.selected(config.criterion);
    let lag = vecm_lag_from_var(var_order);
    info!(
        criterion = %config.criterion,
        var_order,
        aic = lag_selection.aic,
        hq = lag_selection.hq,
        sc = lag_selection.sc,
        fpe = lag_selection.fpe,
        vecm_lag = lag,
        "lag order selected"
    );
    let model =
        VecmModel::fit(system, lag, &config.vecm).map_err(PipelineError::at(Stage::Estimation))?;
    info!(
        alpha = ?model.alpha().to_vec(),
        beta = ?model.beta().to_vec(),
        nobs = model.nobs(),
        "VECM estimated"
    );

    // 7. Diagnostics.
    let diag = PipelineError::at::<DiagnosticsError>;
    let mut irf = impulse_response(&model, config.irf_horizon).map_err(diag(Stage::Diagnostics))?;
    if let Some(opts) = &config.bootstrap {
        let bands = bootstrap_bands(&model, system, config.irf_horizon, opts, &config.vecm)
            .map_err(diag(Stage::Diagnostics))?;
        if bands.failed > 0 {
            notes.push(format!(
                "{} of {} bootstrap replications could not be re-estimated and were skipped.",
                bands.failed, bands.runs
            ));
        }
        irf = irf.with_bands(bands);
    }
    let fevd = fevd(&model, config.fevd_horizon).map_err(diag(Stage::Diagnostics))?;
    let ect = ect_path(logs.view(), model.beta().view(), wide.periods())
        .map_err(diag(Stage::Diagnostics))?;
    let whiteness = residual_checks(&model, &ids, config.whiteness.q, config.whiteness.max_lag)
        .map_err(diag(Stage::Diagnostics))?;
    for check in whiteness.iter().filter(|c| c.outcome.p_value() < 0.05) {
        notes.push(format!(
            "Residuals of the {} equation show serial correlation (Escanciano–Lobato p = {:.3}).",
            check.series,
            check.outcome.p_value()
        ));
    }
    debug!(ect_mean = ect.mean(), "diagnostics computed");
    info!(notes = notes.len(), "analysis finished");

    Ok(AnalysisReport {
        config: config.clone(),
        wide,
        stationarity,
        transformed,
        cointegration,
        lag_selection,
        criterion: config.criterion,
        var_order,
        model,
        irf,
        fevd,
        ect,
        whiteness,
        notes,
    })
}

fn stationarity_orders(
    logs: &Array2<f64>, ids: &[String], config: &AnalysisConfig,
) -> PipelineResult<Vec<SeriesStationarity>> {
    ids.iter()
        .enumerate()
        .map(|(j, id)| {
            let column = logs.column(j).to_vec();
            let outcome = ndiffs(&column, &config.ndiffs)
                .map_err(PipelineError::at(Stage::Stationarity { series: id.clone() }))?;
            info!(series = %id, order = outcome.order, "differencing order estimated");
            Ok(SeriesStationarity { series: id.clone(), outcome })
        })
        .collect()
}

fn cointegration_test(
    pair: &TransformedPair, ids: &[String], config: &AnalysisConfig,
) -> PipelineResult<CointegrationOutcome> {
    let a = pair.values().column(0).to_vec();
    let b = pair.values().column(1).to_vec();
    let outcome = CointegrationOutcome::engle_granger(
        (ids[1].as_str(), b.as_slice()),
        (ids[0].as_str(), a.as_slice()),
        config.adf_max_lag,
    )
    .map_err(PipelineError::at::<TestError>(Stage::Cointegration))?;
    info!(
        dependent = %outcome.dependent,
        regressor = %outcome.regressor,
        tau = outcome.adf.tau,
        lag = outcome.adf.lag,
        cointegrated = outcome.cointegrated,
        "Engle–Granger test done"
    );
    Ok(outcome)
}
