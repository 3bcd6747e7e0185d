//! macro-vecm — command-line entry point.
//!
//! Reads an optional TOML configuration, applies command-line overrides,
//! installs logging, runs the analysis and writes `report.md` and
//! `report.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::error;

use macro_vecm::logging::{LogFormat, init_logging};
use macro_vecm::pipeline::{AnalysisConfig, run_analysis};
use macro_vecm::report::write_report;
use macro_vecm::vecm::InformationCriterion;

#[derive(Debug, Parser)]
#[command(name = "macro-vecm", version, about = "Lead-lag analysis of two monthly macro series")]
struct Cli {
    /// TOML configuration file; command-line flags override its values.
    #[arg(short, long, env = "MACRO_VECM_CONFIG")]
    config: Option<PathBuf>,

    /// Regressor series (FRED id).
    #[arg(long)]
    series_a: Option<String>,

    /// Dependent series (FRED id).
    #[arg(long)]
    series_b: Option<String>,

    /// First month to use, YYYY-MM-DD.
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Largest VAR order considered in lag selection.
    #[arg(long)]
    lag_max: Option<usize>,

    #[arg(long)]
    irf_horizon: Option<usize>,

    #[arg(long)]
    fevd_horizon: Option<usize>,

    /// Lag-selection criterion: aic, hq, sc or fpe.
    #[arg(long)]
    criterion: Option<InformationCriterion>,

    /// Directory of the read-through CSV cache.
    #[arg(long, env = "MACRO_VECM_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Use only the cache directory, no network access.
    #[arg(long)]
    offline: bool,

    /// Bootstrap replications for impulse-response bands (0 disables).
    #[arg(long)]
    bootstrap_runs: Option<usize>,

    /// Seed of the bootstrap generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving report.md and report.json.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: pretty or json.
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn into_config(self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        if let Some(v) = self.series_a {
            config.series_a = v;
        }
        if let Some(v) = self.series_b {
            config.series_b = v;
        }
        if let Some(v) = self.start_date {
            config.start_date = v;
        }
        if let Some(v) = self.lag_max {
            config.lag_max = v;
        }
        if let Some(v) = self.irf_horizon {
            config.irf_horizon = v;
        }
        if let Some(v) = self.fevd_horizon {
            config.fevd_horizon = v;
        }
        if let Some(v) = self.criterion {
            config.criterion = v;
        }
        if let Some(v) = self.cache_dir {
            config.source.cache_dir = Some(v);
        }
        if self.offline {
            config.source.offline = true;
        }
        match self.bootstrap_runs {
            Some(0) => config.bootstrap = None,
            Some(runs) => config.bootstrap.get_or_insert_with(Default::default).runs = runs,
            None => {}
        }
        if let (Some(seed), Some(bootstrap)) = (self.seed, config.bootstrap.as_mut()) {
            bootstrap.seed = seed;
        }
        if let Some(v) = self.out_dir {
            config.out_dir = v;
        }
        if let Some(v) = self.log_level {
            config.logging.level = v;
        }
        if let Some(v) = self.log_format {
            config.logging.format = v;
        }
        Ok(config)
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;
    init_logging(&config.logging).context("initialising logging")?;

    let source = config.source.build().context("building the data source")?;
    let report = run_analysis(source.as_ref(), &config).context("analysis halted")?;
    let paths = write_report(&report, &config.out_dir).context("writing the report")?;

    println!("{}", paths.markdown.display());
    println!("{}", paths.json.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
