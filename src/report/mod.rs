//! report — rendering and writing the analysis output.
//!
//! Purpose
//! -------
//! Turn an [`AnalysisReport`] into the two output files: `report.md` for
//! people and `report.json` for scripts.
//!
//! Key behaviors
//! -------------
//! - [`render_markdown`] and [`render_json`] are pure.
//! - [`write_report`] creates the output directory and writes both files.
//!
//! Testing notes
//! -------------
//! - Chart placement is unit-tested in `chart`; the integration test checks
//!   that a full run renders every section and valid JSON.

pub mod chart;
pub mod errors;
pub mod json;
pub mod markdown;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::pipeline::AnalysisReport;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{ReportError, ReportResult};
pub use self::json::render_json;
pub use self::markdown::render_markdown;

/// Paths of the files written by [`write_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

/// Write `report.md` and `report.json` into `out_dir`, creating it if
/// needed.
///
/// Errors
/// ------
/// - `Io` for directory creation or write failures.
/// - `Json` if serialisation fails.
pub fn write_report(report: &AnalysisReport, out_dir: &Path) -> ReportResult<ReportPaths> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |e: std::io::Error| ReportError::Io { path, text: e.to_string() }
    };
    std::fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;

    let paths =
        ReportPaths { markdown: out_dir.join("report.md"), json: out_dir.join("report.json") };
    std::fs::write(&paths.markdown, render_markdown(report)).map_err(io_err(&paths.markdown))?;
    std::fs::write(&paths.json, render_json(report)?).map_err(io_err(&paths.json))?;
    info!(markdown = %paths.markdown.display(), json = %paths.json.display(), "report written");
    Ok(paths)
}
