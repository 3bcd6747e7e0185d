//! logging — installation of the global `tracing` subscriber.
//!
//! Purpose
//! -------
//! Give the binary one call that turns the `logging` block of the
//! configuration into a subscriber: human-readable lines on stderr for
//! interactive runs, JSON lines for scripted ones.
//!
//! Key behaviors
//! -------------
//! - `RUST_LOG` overrides the configured level (standard `EnvFilter`
//!   directives, e.g. `macro_vecm::vecm=debug`).
//! - [`init_logging`] installs the subscriber at most once per process; a
//!   second call returns [`LogError::AlreadyInitialized`].
//!
//! Conventions
//! -----------
//! - Library code only emits events; it never installs a subscriber.
//! - Field names used across stages: `series`, `stage`, `lag`, `nobs`.

use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogError::InvalidFormat(s.to_string())),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset (`error` … `trace`, or full
    /// `EnvFilter` directives).
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { level: "info".to_string(), format: LogFormat::Pretty }
    }
}

pub type LogResult<T> = Result<T, LogError>;

/// LogError — failures while installing the subscriber.
#[derive(Debug)]
pub enum LogError {
    AlreadyInitialized,
    InvalidLevel(String),
    InvalidFormat(String),
    SetSubscriber(String),
}

impl std::error::Error for LogError {}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::AlreadyInitialized => write!(f, "Logging Error: already initialized"),
            LogError::InvalidLevel(level) => {
                write!(f, "Logging Error: invalid log level '{level}'")
            }
            LogError::InvalidFormat(format) => write!(
                f,
                "Logging Error: unknown log format '{format}'. Valid options are 'pretty' or \
                 'json'."
            ),
            LogError::SetSubscriber(msg) => {
                write!(f, "Logging Error: failed to set global subscriber: {msg}")
            }
        }
    }
}

/// Build the filter: `RUST_LOG` when set and valid, the configured level
/// otherwise.
///
/// Errors
/// ------
/// - `InvalidLevel` when the configured directives do not parse.
pub fn build_filter(config: &LogConfig) -> LogResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|_| LogError::InvalidLevel(config.level.clone()))
}

/// Install the global subscriber described by `config`.
///
/// Errors
/// ------
/// - `AlreadyInitialized` on a second call.
/// - `InvalidLevel` for unparsable filter directives.
/// - `SetSubscriber` if another subscriber was installed elsewhere.
pub fn init_logging(config: &LogConfig) -> LogResult<()> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr).with_current_span(false))
            .try_init(),
    };
    installed.map_err(|e| LogError::SetSubscriber(e.to_string()))?;
    let _ = LOGGING_INITIALIZED.set(());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_known_names() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!(matches!("xml".parse::<LogFormat>(), Err(LogError::InvalidFormat(_))));
    }

    #[test]
    fn log_config_deserializes_with_defaults() {
        let config: LogConfig = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }
}
