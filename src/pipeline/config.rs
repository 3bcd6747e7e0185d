//! pipeline::config — the analysis configuration and its validation.
//!
//! Purpose
//! -------
//! Collect every knob of the run in one serde-friendly struct that can be
//! read from TOML, overridden from the command line and validated before
//! any data is fetched.
//!
//! Key behaviors
//! -------------
//! - Core options: `series_a`, `series_b`, `start_date`, `lag_max`,
//!   `irf_horizon`, `fevd_horizon`.
//! - Estimation options: lag criterion, `ndiffs` settings, ADF lag cap,
//!   eigen-solver cap, portmanteau settings, optional bootstrap.
//! - Sub-blocks `[source]` and `[logging]` configure where data comes from
//!   and how the binary logs.
//! - Every field has a default, so an empty TOML file is a valid
//!   configuration reproducing the reference DSPI/PMSAVE run.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`AnalysisConfig::validate`] is called by
//!   [`run_analysis`](super::run_analysis) before the first stage.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::source::FRED_GRAPH_CSV_URL;
use crate::data::{CachedSource, CsvDirSource, DataResult, FredSource, SeriesSource};
use crate::diagnostics::BootstrapOptions;
use crate::logging::LogConfig;
use crate::pipeline::errors::ConfigError;
use crate::statistical_tests::NdiffsOptions;
use crate::statistical_tests::portmanteau::{DEFAULT_MAX_LAG, DEFAULT_Q};
use crate::vecm::{InformationCriterion, VecmOptions};

/// Where observations come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Directory of the read-through CSV cache; no cache when `None`.
    pub cache_dir: Option<PathBuf>,
    /// Read only from `cache_dir`, never touch the network.
    pub offline: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            base_url: FRED_GRAPH_CSV_URL.to_string(),
            timeout_secs: 30,
            cache_dir: None,
            offline: false,
        }
    }
}

impl SourceConfig {
    /// Build the configured source: offline CSV directory, FRED behind the
    /// cache, or plain FRED.
    ///
    /// Errors
    /// ------
    /// - `Network` when the HTTP client cannot be constructed.
    pub fn build(&self) -> DataResult<Box<dyn SeriesSource>> {
        match (&self.cache_dir, self.offline) {
            (Some(dir), true) => Ok(Box::new(CsvDirSource::new(dir))),
            (Some(dir), false) => Ok(Box::new(CachedSource::new(self.fred()?, dir))),
            (None, _) => Ok(Box::new(self.fred()?)),
        }
    }

    fn fred(&self) -> DataResult<FredSource> {
        FredSource::new(self.base_url.clone(), Duration::from_secs(self.timeout_secs))
    }
}

/// Escanciano–Lobato settings for the residual checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WhitenessConfig {
    pub q: f64,
    pub max_lag: usize,
}

impl Default for WhitenessConfig {
    fn default() -> Self {
        WhitenessConfig { q: DEFAULT_Q, max_lag: DEFAULT_MAX_LAG }
    }
}

/// AnalysisConfig — everything one run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Regressor of the cointegrating regression; first in the Cholesky
    /// ordering.
    pub series_a: String,
    /// Dependent variable of the cointegrating regression.
    pub series_b: String,
    pub start_date: NaiveDate,
    pub lag_max: usize,
    pub irf_horizon: usize,
    pub fevd_horizon: usize,
    pub criterion: InformationCriterion,
    pub ndiffs: NdiffsOptions,
    /// ADF lag cap; Schwert's rule when `None`.
    pub adf_max_lag: Option<usize>,
    pub vecm: VecmOptions,
    pub whiteness: WhitenessConfig,
    pub bootstrap: Option<BootstrapOptions>,
    pub source: SourceConfig,
    pub logging: LogConfig,
    pub out_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            series_a: "DSPI".to_string(),
            series_b: "PMSAVE".to_string(),
            start_date: NaiveDate::from_ymd_opt(1959, 1, 1).unwrap_or(NaiveDate::MIN),
            lag_max: 12,
            irf_horizon: 6,
            fevd_horizon: 30,
            criterion: InformationCriterion::default(),
            ndiffs: NdiffsOptions::default(),
            adf_max_lag: None,
            vecm: VecmOptions::default(),
            whiteness: WhitenessConfig::default(),
            bootstrap: None,
            source: SourceConfig::default(),
            logging: LogConfig::default(),
            out_dir: PathBuf::from("report"),
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse { text: e.to_string() })
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            text: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// The two series in request order (A first).
    pub fn series_ids(&self) -> Vec<String> {
        vec![self.series_a.clone(), self.series_b.clone()]
    }

    /// Reject configurations no run could succeed with.
    ///
    /// Errors
    /// ------
    /// - `Invalid` naming the first offending field: empty or identical
    ///   series ids, zero `lag_max` or horizons, `ndiffs.alpha` outside
    ///   (0, 1), a non-positive portmanteau `q`, invalid bootstrap options,
    ///   or `offline` without a cache directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(ConfigError::Invalid { field, reason: reason.to_string() })
        };
        if self.series_a.trim().is_empty() || self.series_b.trim().is_empty() {
            return invalid("series_a/series_b", "series ids must not be empty");
        }
        if self.series_a == self.series_b {
            return invalid("series_b", "must differ from series_a");
        }
        if self.lag_max == 0 {
            return invalid("lag_max", "must be at least 1");
        }
        if self.irf_horizon == 0 {
            return invalid("irf_horizon", "must be at least 1");
        }
        if self.fevd_horizon == 0 {
            return invalid("fevd_horizon", "must be at least 1");
        }
        if !(self.ndiffs.alpha > 0.0 && self.ndiffs.alpha < 1.0) {
            return invalid("ndiffs.alpha", "must lie in (0, 1)");
        }
        if self.whiteness.q <= 0.0 || !self.whiteness.q.is_finite() {
            return invalid("whiteness.q", "must be positive");
        }
        if let Some(bootstrap) = &self.bootstrap {
            if let Err(err) = bootstrap.validate() {
                return invalid("bootstrap", &err.to_string());
            }
        }
        if self.source.offline && self.source.cache_dir.is_none() {
            return invalid("source.offline", "requires source.cache_dir");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Defaults reproducing the reference run and TOML parsing with partial
    //   input.
    // - Each validation rule.
    // - Source selection from the `[source]` block.
    // -------------------------------------------------------------------------

    #[test]
    fn defaults_describe_reference_run() {
        let config = AnalysisConfig::default();
        assert_eq!(config.series_ids(), vec!["DSPI".to_string(), "PMSAVE".to_string()]);
        assert_eq!((config.lag_max, config.irf_horizon, config.fevd_horizon), (12, 6, 30));
        assert_eq!(config.criterion, InformationCriterion::Hq);
        assert!(config.validate().is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Partial TOML fills the rest from defaults, nested blocks included.
    //
    // Given
    // -----
    // - A document overriding the series, start date, criterion and the
    //   bootstrap and source blocks.
    //
    // Expect
    // ------
    // - Overridden values are applied; untouched values keep defaults.
    fn toml_overrides_merge_with_defaults() {
        // Arrange
        let text = r#"
            series_a = "INDPRO"
            series_b = "PAYEMS"
            start_date = "1990-01-01"
            criterion = "aic"

            [bootstrap]
            runs = 250

            [source]
            cache_dir = "cache"
            offline = true
        "#;

        // Act
        let config = AnalysisConfig::from_toml_str(text).unwrap();

        // Assert
        assert_eq!(config.series_a, "INDPRO");
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert_eq!(config.criterion, InformationCriterion::Aic);
        let bootstrap = config.bootstrap.unwrap();
        assert_eq!(bootstrap.runs, 250);
        assert_eq!(bootstrap.level, 0.95);
        assert!(config.source.offline);
        assert_eq!(config.fevd_horizon, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("lagmax = 3"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn validate_rejects_each_bad_field() {
        let base = AnalysisConfig::default();
        let cases: Vec<(AnalysisConfig, &str)> = vec![
            (AnalysisConfig { series_b: "DSPI".into(), ..base.clone() }, "series_b"),
            (AnalysisConfig { lag_max: 0, ..base.clone() }, "lag_max"),
            (AnalysisConfig { irf_horizon: 0, ..base.clone() }, "irf_horizon"),
            (AnalysisConfig { fevd_horizon: 0, ..base.clone() }, "fevd_horizon"),
            (
                AnalysisConfig {
                    ndiffs: NdiffsOptions { alpha: 1.5, ..NdiffsOptions::default() },
                    ..base.clone()
                },
                "ndiffs.alpha",
            ),
            (
                AnalysisConfig {
                    bootstrap: Some(BootstrapOptions { runs: 0, ..BootstrapOptions::default() }),
                    ..base.clone()
                },
                "bootstrap",
            ),
            (
                AnalysisConfig {
                    source: SourceConfig { offline: true, ..SourceConfig::default() },
                    ..base.clone()
                },
                "source.offline",
            ),
        ];
        for (config, expected) in cases {
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected invalid {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn source_block_selects_offline_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = SourceConfig {
            cache_dir: Some(dir.path().to_path_buf()),
            offline: true,
            ..SourceConfig::default()
        };
        let source = config.build().unwrap();
        assert_eq!(source.name(), "csv-dir");
    }
}
