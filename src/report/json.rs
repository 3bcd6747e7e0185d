//! report::json — machine-readable dump of every artifact.
//!
//! The document is the serde serialisation of
//! [`AnalysisReport`](crate::pipeline::AnalysisReport) plus a schema version.
//! Residual vectors and the fitted values of auxiliary regressions are
//! skipped to keep the file small; everything shown in the Markdown report
//! is present.

use serde::Serialize;

use crate::pipeline::AnalysisReport;
use crate::report::errors::ReportResult;

/// Bumped whenever a field is renamed or removed.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    schema_version: u32,
    crate_version: &'static str,
    report: &'a AnalysisReport,
}

/// Pretty-printed JSON of `report`.
pub fn render_json(report: &AnalysisReport) -> ReportResult<String> {
    let envelope = Envelope {
        schema_version: SCHEMA_VERSION,
        crate_version: env!("CARGO_PKG_VERSION"),
        report,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}
