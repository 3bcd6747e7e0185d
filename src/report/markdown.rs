//! report::markdown — the human-readable report.
//!
//! Purpose
//! -------
//! Render an [`AnalysisReport`] as one Markdown document: prose that states
//! each result, tables for the regression, unit-root, lag-selection and
//! VECM output, and text charts for the raw series, impulse responses and
//! the error-correction term.
//!
//! Conventions
//! -----------
//! - Sections follow the pipeline order.
//! - Numbers are printed with four decimals; p-values below 0.001 are shown
//!   as `< 0.001`.
//! - FEVD tables show a fixed set of steps (1, 2, 6, 12, 24 and H) rather
//!   than every step; a variable × shock grid of share sparklines covers
//!   the whole horizon.

use crate::pipeline::AnalysisReport;
use crate::report::chart::{CHART_HEIGHT, CHART_WIDTH, line_chart, scaled_sparkline, sparkline};
use crate::vecm::RankCritical;

const FEVD_STEPS: [usize; 5] = [1, 2, 6, 12, 24];

/// Render the full report.
pub fn render_markdown(report: &AnalysisReport) -> String {
    let mut out = String::new();
    header(&mut out, report);
    data_section(&mut out, report);
    stationarity_section(&mut out, report);
    cointegration_section(&mut out, report);
    lag_section(&mut out, report);
    vecm_section(&mut out, report);
    irf_section(&mut out, report);
    fevd_section(&mut out, report);
    ect_section(&mut out, report);
    whiteness_section(&mut out, report);
    notes_section(&mut out, report);
    out
}

fn num(v: f64) -> String {
    format!("{v:.4}")
}

fn pval(p: f64) -> String {
    if p < 0.001 { "< 0.001".to_string() } else { format!("{p:.3}") }
}

fn table_header(out: &mut String, columns: &[&str]) {
    out.push_str(&format!("| {} |\n", columns.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(columns.len())));
}

fn table_row(out: &mut String, cells: &[String]) {
    out.push_str(&format!("| {} |\n", cells.join(" | ")));
}

fn fenced(out: &mut String, body: &str) {
    out.push_str("```text\n");
    out.push_str(body);
    out.push_str("```\n\n");
}

fn header(out: &mut String, report: &AnalysisReport) {
    let config = &report.config;
    out.push_str(&format!(
        "# Lead-lag analysis: {} and {}\n\n",
        config.series_a, config.series_b
    ));
    let periods = report.wide.periods();
    if let (Some(first), Some(last)) = (periods.first(), periods.last()) {
        out.push_str(&format!(
            "Monthly data from {first} to {last} ({} months), requested from {}. \
             {} is the regressor of the cointegrating regression and is ordered first \
             in the impulse-response identification; {} is the dependent variable.\n\n",
            report.wide.nrows(),
            config.start_date,
            config.series_a,
            config.series_b
        ));
    }
}

fn data_section(out: &mut String, report: &AnalysisReport) {
    out.push_str("## Data\n\n");
    for (j, id) in report.wide.series_ids().iter().enumerate() {
        let values = report.wide.column(j).to_vec();
        out.push_str(&format!("### {id} (levels)\n\n"));
        fenced(out, &line_chart(&values, CHART_WIDTH, CHART_HEIGHT, None));
    }
}

fn stationarity_section(out: &mut String, report: &AnalysisReport) {
    out.push_str("## Unit roots\n\n");
    out.push_str(&format!(
        "KPSS level-stationarity tests on `100 · ln(x)`, differencing until the test no \
         longer rejects at α = {} (at most {} differences).\n\n",
        report.config.ndiffs.alpha, report.config.ndiffs.max_d
    ));
    table_header(out, &["Series", "d", "KPSS η (d = 0)", "p-value (d = 0)", "Path"]);
    for s in &report.stationarity {
        let first = s.outcome.steps.first().and_then(|step| step.outcome);
        let path: Vec<String> = s
            .outcome
            .steps
            .iter()
            .map(|step| match step.outcome {
                Some(o) => format!("d={}: η={:.3}", step.d, o.statistic()),
                None => format!("d={}: constant", step.d),
            })
            .collect();
        table_row(
            out,
            &[
                s.series.clone(),
                s.outcome.order.to_string(),
                first.map_or("-".to_string(), |o| num(o.statistic())),
                first.map_or("-".to_string(), |o| pval(o.p_value())),
                path.join("; "),
            ],
        );
    }
    let t = &report.transformed;
    out.push_str(&format!(
        "\nBoth series enter the analysis as `100 · Δᵈ ln(x)` with d = {:?} (at least one \
         difference each); the first {} month(s) are dropped, leaving {} rows from {}.\n\n",
        t.orders(),
        t.dropped(),
        t.nrows(),
        t.periods().first().map_or("-".to_string(), |p| p.to_string())
    ));
}

fn cointegration_section(out: &mut String, report: &AnalysisReport) {
    let c = &report.cointegration;
    let reg = &c.regression;
    out.push_str("## Cointegration (Engle–Granger)\n\n");
    out.push_str(&format!("Regression of {} on {}:\n\n", c.dependent, c.regressor));
    table_header(out, &["Term", "Estimate", "Std. error", "t", "p-value"]);
    for (i, term) in reg.terms.iter().enumerate() {
        table_row(
            out,
            &[
                term.clone(),
                num(reg.coefficients[i]),
                num(reg.std_errors[i]),
                format!("{:.3}", reg.t_values[i]),
                pval(reg.p_values[i]),
            ],
        );
    }
    out.push_str(&format!(
        "\nResidual standard error {} on {} degrees of freedom; R² = {:.4}, adjusted R² = {:.4}",
        num(reg.sigma),
        reg.df_resid,
        reg.r_squared,
        reg.adj_r_squared
    ));
    if let (Some(f), Some(p)) = (reg.f_statistic, reg.f_p_value) {
        out.push_str(&format!("; F = {f:.3} (p {}).", pval(p)));
    }
    out.push_str("\n\n");

    let adf = &c.adf;
    out.push_str(&format!(
        "ADF test with drift on the residuals, {} lagged difference(s) chosen by BIC:\n\n",
        adf.lag
    ));
    table_header(out, &["Statistic", "Value", "1%", "5%", "10%"]);
    table_row(
        out,
        &[
            "τ₂".to_string(),
            format!("{:.3}", adf.tau),
            format!("{:.2}", adf.tau_critical.one_pct),
            format!("{:.2}", adf.tau_critical.five_pct),
            format!("{:.2}", adf.tau_critical.ten_pct),
        ],
    );
    table_row(
        out,
        &[
            "φ₁".to_string(),
            format!("{:.3}", adf.phi1),
            format!("{:.2}", adf.phi1_critical.one_pct),
            format!("{:.2}", adf.phi1_critical.five_pct),
            format!("{:.2}", adf.phi1_critical.ten_pct),
        ],
    );
    let verdict = if c.cointegrated {
        "The residuals are stationary at the 5% level: the series are cointegrated."
    } else {
        "A unit root in the residuals cannot be rejected at 5%: no evidence of cointegration."
    };
    out.push_str(&format!("\n{verdict}\n\n"));
}

fn lag_section(out: &mut String, report: &AnalysisReport) {
    let sel = &report.lag_selection;
    out.push_str("## Lag selection\n\n");
    out.push_str(&format!(
        "VAR with constant, p = 1..{} on a common sample of {} months. Minimisers: AIC {}, \
         HQ {}, SC {}, FPE {}. The {} choice p = {} gives a VECM with {} lagged \
         difference(s).\n\n",
        sel.lag_max,
        sel.sample,
        sel.aic,
        sel.hq,
        sel.sc,
        sel.fpe,
        report.criterion,
        report.var_order,
        report.model.lag()
    ));
    table_header(out, &["p", "AIC", "HQ", "SC", "FPE"]);
    for row in &sel.rows {
        let mark =
            |best: usize, text: String| if best == row.p { format!("**{text}**") } else { text };
        table_row(
            out,
            &[
                row.p.to_string(),
                mark(sel.aic, format!("{:.4}", row.aic)),
                mark(sel.hq, format!("{:.4}", row.hq)),
                mark(sel.sc, format!("{:.4}", row.sc)),
                mark(sel.fpe, format!("{:.4e}", row.fpe)),
            ],
        );
    }
    out.push('\n');
}

fn vecm_section(out: &mut String, report: &AnalysisReport) {
    let m = &report.model;
    let ids = report.wide.series_ids();
    out.push_str("## VECM\n\n");
    out.push_str(&format!(
        "Johansen maximum likelihood, rank 1, unrestricted constant, {} lagged difference(s), \
         {} effective observations; log-likelihood {:.3}.\n\n",
        m.lag(),
        m.nobs(),
        m.log_likelihood()
    ));
    table_header(out, &["Equation", "α (loading)", "β (cointegrating)", "Constant"]);
    for (i, id) in ids.iter().enumerate() {
        table_row(
            out,
            &[format!("Δ{id}"), num(m.alpha()[i]), num(m.beta()[i]), num(m.constant()[i])],
        );
    }
    out.push('\n');

    for (l, gamma) in m.gamma().iter().enumerate() {
        out.push_str(&format!("Γ{} (rows: equations, columns: lagged Δ):\n\n", l + 1));
        let mut columns = vec!["Equation".to_string()];
        columns.extend(ids.iter().map(|id| format!("Δ{id}ₜ₋{}", l + 1)));
        let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        table_header(out, &refs);
        for (i, id) in ids.iter().enumerate() {
            let mut cells = vec![format!("Δ{id}")];
            cells.extend(gamma.row(i).iter().map(|&v| num(v)));
            table_row(out, &cells);
        }
        out.push('\n');
    }

    out.push_str("Johansen rank tests:\n\n");
    table_header(out, &["H₀", "Eigenvalue", "Trace", "5% cv", "λmax", "5% cv"]);
    for test in m.rank_tests() {
        let cv =
            |c: Option<RankCritical>| c.map_or("-".to_string(), |c| format!("{:.2}", c.pct95));
        table_row(
            out,
            &[
                format!("r ≤ {}", test.r),
                num(m.eigenvalues()[test.r]),
                format!("{:.3}", test.trace),
                cv(test.trace_critical),
                format!("{:.3}", test.max_eigen),
                cv(test.max_eigen_critical),
            ],
        );
    }
    out.push('\n');
}

fn irf_section(out: &mut String, report: &AnalysisReport) {
    let irf = &report.irf;
    let ids = report.wide.series_ids();
    out.push_str("## Impulse responses\n\n");
    out.push_str(&format!(
        "Orthogonalised (Cholesky, {} first) responses to a one-standard-deviation shock, \
         steps 0..{}.",
        ids.first().map_or("", String::as_str),
        irf.horizon()
    ));
    if let Some(b) = irf.bands() {
        out.push_str(&format!(
            " Brackets give {:.0}% residual-bootstrap bands from {} replications.",
            b.level * 100.0,
            b.runs
        ));
    }
    out.push_str("\n\n");
    let mut columns = vec!["Impulse → response".to_string(), "Path".to_string()];
    columns.extend((0..=irf.horizon()).map(|h| format!("h={h}")));
    let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    table_header(out, &refs);
    for (imp, imp_id) in ids.iter().enumerate() {
        for (resp, resp_id) in ids.iter().enumerate() {
            let path = irf.path(imp, resp).to_vec();
            let mut cells = vec![format!("{imp_id} → {resp_id}"), sparkline(&path)];
            for (h, v) in path.iter().enumerate() {
                let cell = match irf.bands() {
                    Some(b) => format!(
                        "{v:.3} [{:.3}, {:.3}]",
                        b.lower[[imp, resp, h]],
                        b.upper[[imp, resp, h]]
                    ),
                    None => format!("{v:.3}"),
                };
                cells.push(cell);
            }
            table_row(out, &cells);
        }
    }
    out.push('\n');
}

fn fevd_section(out: &mut String, report: &AnalysisReport) {
    let fevd = &report.fevd;
    let ids = report.wide.series_ids();
    let h_max = fevd.horizon();
    let mut steps: Vec<usize> = FEVD_STEPS.iter().copied().filter(|&s| s < h_max).collect();
    steps.push(h_max);

    out.push_str("## Forecast-error variance decomposition\n\n");
    for (v, id) in ids.iter().enumerate() {
        out.push_str(&format!("### {id}\n\n"));
        let mut columns = vec!["Step".to_string()];
        columns.extend(ids.iter().map(|s| format!("{s} shock")));
        let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        table_header(out, &refs);
        for &step in &steps {
            let mut cells = vec![step.to_string()];
            if let Some(row) = fevd.row(v, step) {
                cells.extend(row.iter().map(|share| format!("{:.1}%", share * 100.0)));
            }
            table_row(out, &cells);
        }
        out.push('\n');
    }

    // Grid: one share path per (variable, shock), steps 1..=H on a 0–100% scale.
    out.push_str(&format!("### Share paths, steps 1..{h_max} (▁ = 0%, █ = 100%)\n\n"));
    let mut columns = vec!["Variable".to_string()];
    columns.extend(ids.iter().map(|s| format!("{s} shock")));
    let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    table_header(out, &refs);
    for (v, id) in ids.iter().enumerate() {
        let mut cells = vec![id.clone()];
        for shock in 0..ids.len() {
            let path: Vec<f64> =
                (1..=h_max).filter_map(|step| fevd.share(v, step, shock)).collect();
            cells.push(format!("`{}`", scaled_sparkline(&path, 0.0, 1.0)));
        }
        table_row(out, &cells);
    }
    out.push('\n');
}

fn ect_section(out: &mut String, report: &AnalysisReport) {
    let ect = &report.ect;
    out.push_str("## Error-correction term\n\n");
    out.push_str(&format!(
        "`100 · ln(levels) · β` with β = {:?}; the dashed line marks the sample mean {:.3}.\n\n",
        report.model.beta().iter().map(|b| (b * 1e4).round() / 1e4).collect::<Vec<_>>(),
        ect.mean()
    ));
    let values = ect.values().to_vec();
    fenced(out, &line_chart(&values, CHART_WIDTH, CHART_HEIGHT, Some(ect.mean())));
    if let Some((period, deviation)) = ect.latest_deviation() {
        out.push_str(&format!(
            "In {period} the term sits {:.3} {} its mean; it was above the mean in {:.0}% of \
             months.\n\n",
            deviation.abs(),
            if deviation >= 0.0 { "above" } else { "below" },
            ect.share_above_mean() * 100.0
        ));
    }
}

fn whiteness_section(out: &mut String, report: &AnalysisReport) {
    out.push_str("## Residual checks\n\n");
    out.push_str(
        "Escanciano–Lobato automatic portmanteau test (robust to conditional \
         heteroskedasticity) on each VECM equation.\n\n",
    );
    table_header(out, &["Equation", "Selected lag", "Q*", "p-value"]);
    for check in &report.whiteness {
        table_row(
            out,
            &[
                format!("Δ{}", check.series),
                check.outcome.p_tilde().to_string(),
                format!("{:.3}", check.outcome.stat()),
                pval(check.outcome.p_value()),
            ],
        );
    }
    out.push('\n');
}

fn notes_section(out: &mut String, report: &AnalysisReport) {
    if report.notes.is_empty() {
        return;
    }
    out.push_str("## Notes\n\n");
    for note in &report.notes {
        out.push_str(&format!("- {note}\n"));
    }
    out.push('\n');
}
