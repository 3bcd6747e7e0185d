//! data::errors — failures raised while acquiring and reshaping series.
//!
//! Purpose
//! -------
//! Give the acquisition layer (sources, long table, pivot) one error enum so
//! that the pipeline can abort with a message naming the offending series
//! and period instead of silently substituting defaults.
//!
//! Conventions
//! -----------
//! - Variants carry the series id and, where relevant, the period so the
//!   `Display` output is self-contained.
//! - Transport, filesystem and CSV failures are flattened into `String`
//!   payloads; this keeps `DataError` cheap to clone and comparable in tests.

use crate::data::period::Period;
use chrono::NaiveDate;

pub type DataResult<T> = Result<T, DataError>;

/// DataError — acquisition and reshaping failures.
///
/// Variants
/// --------
/// - `UnknownSeries` — the source does not recognise the identifier.
/// - `NoDataInRange` — the series exists but has no observation on or after
///   the requested start date.
/// - `DuplicatePeriod` — a series reports the same month twice.
/// - `MissingObservation` — a month inside the common span is absent for a
///   series, so the wide table would contain a hole.
/// - `NoOverlap` — the requested series share no common month.
/// - `InvalidValue` — a parsed value is not finite.
/// - `EmptyRequest` — no series identifiers were requested.
/// - `Network`, `Io`, `Parse` — wrapped backend failures.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    UnknownSeries { series: String, detail: String },
    NoDataInRange { series: String, from: NaiveDate },
    DuplicatePeriod { series: String, period: Period },
    MissingObservation { series: String, period: Period },
    NoOverlap { first_end: Period, last_start: Period },
    InvalidValue { series: String, period: Period, value: f64 },
    EmptyRequest,
    Network { series: String, text: String },
    Io { text: String },
    Parse { series: String, text: String },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::UnknownSeries { series, detail } => {
                write!(f, "Unknown series '{series}': {detail}")
            }
            DataError::NoDataInRange { series, from } => {
                write!(
                    f,
                    "No data in range: series '{series}' has no observations on or after {from}"
                )
            }
            DataError::DuplicatePeriod { series, period } => {
                write!(f, "Series '{series}' reports period {period} more than once")
            }
            DataError::MissingObservation { series, period } => {
                write!(
                    f,
                    "Series '{series}' has no observation for {period} inside the common span"
                )
            }
            DataError::NoOverlap { first_end, last_start } => write!(
                f,
                "Requested series do not overlap: one ends at {first_end}, another starts at \
                 {last_start}"
            ),
            DataError::InvalidValue { series, period, value } => {
                write!(f, "Series '{series}' has non-finite value {value} at {period}")
            }
            DataError::EmptyRequest => write!(f, "At least one series identifier is required"),
            DataError::Network { series, text } => {
                write!(f, "Network failure while fetching '{series}': {text}")
            }
            DataError::Io { text } => write!(f, "I/O failure: {text}"),
            DataError::Parse { series, text } => {
                write!(f, "Could not parse data for '{series}': {text}")
            }
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> DataError {
        DataError::Io { text: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `Display` messages embedding the series id and period payloads.
    // - The `From<std::io::Error>` conversion.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The "no data in range" failure must be explicit and name the series.
    //
    // Given
    // -----
    // - `NoDataInRange` for series "DSPI" from 2030-01-01.
    //
    // Expect
    // ------
    // - The message contains "No data in range", the id and the date.
    fn no_data_in_range_message_names_series_and_date() {
        // Arrange
        let from = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let err = DataError::NoDataInRange { series: "DSPI".to_string(), from };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("No data in range"), "Got: {msg}");
        assert!(msg.contains("DSPI"), "Got: {msg}");
        assert!(msg.contains("2030-01-01"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Missing-observation errors point at the hole in the wide table.
    //
    // Given
    // -----
    // - `MissingObservation` for "PMSAVE" at 2001-03.
    //
    // Expect
    // ------
    // - The message contains the id and "2001-03".
    fn missing_observation_message_includes_period() {
        // Arrange
        let err = DataError::MissingObservation {
            series: "PMSAVE".to_string(),
            period: Period::new(2001, 3).unwrap(),
        };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("PMSAVE") && msg.contains("2001-03"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // I/O errors are flattened into `DataError::Io`.
    //
    // Given
    // -----
    // - A `std::io::Error` of kind `NotFound`.
    //
    // Expect
    // ------
    // - The conversion yields the `Io` variant with a non-empty message.
    fn io_error_converts_to_io_variant() {
        // Arrange
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "cache file missing");

        // Act
        let err: DataError = io.into();

        // Assert
        match err {
            DataError::Io { text } => assert!(text.contains("cache file missing")),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
