//! data::source — where monthly observations come from.
//!
//! Purpose
//! -------
//! Abstract the "fetch(series_ids, from_date) → long-format observations"
//! collaborator behind [`SeriesSource`] and provide the concrete sources the
//! analysis needs: FRED over HTTP, an offline CSV directory, a read-through
//! cache combining the two, and an in-memory source.
//!
//! Key behaviors
//! -------------
//! - [`SeriesSource::fetch`] fails loudly: an unrecognised id is
//!   `DataError::UnknownSeries`, a series with nothing on or after the start
//!   date is `DataError::NoDataInRange`. Nothing is defaulted.
//! - FRED's keyless `fredgraph.csv` endpoint and the cache share one CSV
//!   layout (`observation_date,<ID>`), so cached files can be inspected or
//!   hand-edited with ordinary tools.
//! - [`CachedSource`] treats history as append-only: a month already in the
//!   cache keeps its cached value even if the remote now reports something
//!   else; only trailing months are added.
//!
//! Conventions
//! -----------
//! - A month is "in range" when its first day is on or after `from`.
//! - FRED marks missing values with `.`; such rows are skipped.

use crate::data::{
    errors::{DataError, DataResult},
    observation::{LongTable, Observation},
    period::Period,
};
use chrono::NaiveDate;
use std::{
    collections::{BTreeMap, HashMap},
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Default FRED CSV endpoint.
pub const FRED_GRAPH_CSV_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";

/// Anything that can deliver monthly observations for a series id.
pub trait SeriesSource {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Observations of one series whose month starts on or after `from`.
    /// An empty vector is allowed here; [`SeriesSource::fetch`] turns it
    /// into `NoDataInRange`.
    fn fetch_series(&self, series_id: &str, from: NaiveDate) -> DataResult<Vec<Observation>>;

    /// Fetch every id in request order into a [`LongTable`].
    fn fetch(&self, series_ids: &[String], from: NaiveDate) -> DataResult<LongTable> {
        if series_ids.is_empty() {
            return Err(DataError::EmptyRequest);
        }
        let mut table = LongTable::new();
        for id in series_ids {
            let obs = self.fetch_series(id, from)?;
            if obs.is_empty() {
                return Err(DataError::NoDataInRange { series: id.clone(), from });
            }
            info!(source = self.name(), series = %id, observations = obs.len(), "fetched series");
            table.push_series(id, obs)?;
        }
        Ok(table)
    }
}

fn in_range(period: Period, from: NaiveDate) -> bool {
    period.first_day() >= from
}

// ---- CSV layout shared by FRED and the cache ----

/// Parse a FRED-style CSV (`date,<ID>` with `.` for missing values).
///
/// Errors
/// ------
/// - `UnknownSeries` when the value column is not named `series_id`; FRED
///   answers unknown ids with an HTML page, which lands here.
/// - `Parse` for malformed dates or numbers.
pub fn parse_fred_csv<R: Read>(
    reader: R, series_id: &str, from: NaiveDate,
) -> DataResult<Vec<Observation>> {
    let mut reader =
        csv::ReaderBuilder::new().trim(csv::Trim::All).flexible(true).from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| DataError::Parse { series: series_id.to_string(), text: e.to_string() })?
        .clone();

    let value_header = headers.get(1).map(|h| h.trim_start_matches('\u{feff}'));
    if !value_header.is_some_and(|h| h.eq_ignore_ascii_case(series_id)) {
        let columns: Vec<&str> = headers.iter().collect();
        return Err(DataError::UnknownSeries {
            series: series_id.to_string(),
            detail: format!("response columns {columns:?} do not describe this series"),
        });
    }

    let mut out = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = record
            .map_err(|e| DataError::Parse { series: series_id.to_string(), text: e.to_string() })?;
        let (Some(date_raw), Some(value_raw)) = (record.get(0), record.get(1)) else {
            return Err(DataError::Parse {
                series: series_id.to_string(),
                text: format!("line {line}: expected two columns"),
            });
        };
        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d").map_err(|e| DataError::Parse {
            series: series_id.to_string(),
            text: format!("line {line}: bad date '{date_raw}': {e}"),
        })?;
        if value_raw.is_empty() || value_raw == "." {
            debug!(series = series_id, %date, "skipping missing value");
            continue;
        }
        let value: f64 = value_raw.parse().map_err(|e| DataError::Parse {
            series: series_id.to_string(),
            text: format!("line {line}: bad value '{value_raw}': {e}"),
        })?;
        let period = Period::from_date(date);
        if in_range(period, from) {
            out.push(Observation::new(period, series_id, value));
        }
    }
    Ok(out)
}

/// Write observations in the FRED CSV layout.
pub fn write_fred_csv(path: &Path, series_id: &str, obs: &[Observation]) -> DataResult<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| DataError::Io { text: format!("{}: {e}", path.display()) })?;
    let io_err = |e: csv::Error| DataError::Io { text: format!("{}: {e}", path.display()) };
    writer.write_record(["observation_date", series_id]).map_err(io_err)?;
    for o in obs {
        writer
            .write_record([o.period.first_day().to_string(), o.value.to_string()])
            .map_err(io_err)?;
    }
    writer.flush()?;
    Ok(())
}

// ---- FRED ----

/// FredSource — blocking HTTP client for FRED's CSV download endpoint.
#[derive(Debug, Clone)]
pub struct FredSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl FredSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DataResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("macro_vecm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Network { series: String::new(), text: e.to_string() })?;
        Ok(Self { client, base_url: base_url.into() })
    }
}

impl SeriesSource for FredSource {
    fn name(&self) -> &'static str {
        "fred"
    }

    fn fetch_series(&self, series_id: &str, from: NaiveDate) -> DataResult<Vec<Observation>> {
        let network = |e: reqwest::Error| DataError::Network {
            series: series_id.to_string(),
            text: e.to_string(),
        };
        debug!(series = series_id, url = %self.base_url, "requesting series");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("id", series_id.to_string()), ("cosd", from.to_string())])
            .send()
            .map_err(network)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::BAD_REQUEST {
            return Err(DataError::UnknownSeries {
                series: series_id.to_string(),
                detail: format!("FRED answered HTTP {status}"),
            });
        }
        if !status.is_success() {
            return Err(DataError::Network {
                series: series_id.to_string(),
                text: format!("HTTP {status}"),
            });
        }
        let body = response.text().map_err(network)?;
        parse_fred_csv(body.as_bytes(), series_id, from)
    }
}

// ---- Local CSV directory ----

/// CsvDirSource — offline source reading `<dir>/<ID>.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, series_id: &str) -> PathBuf {
        self.dir.join(format!("{series_id}.csv"))
    }

    /// Every cached observation for `series_id`, or `None` if not cached.
    pub fn read_all(&self, series_id: &str) -> DataResult<Option<Vec<Observation>>> {
        let path = self.path_for(series_id);
        if !path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(&path)?;
        parse_fred_csv(file, series_id, NaiveDate::MIN).map(Some)
    }

    pub fn write_all(&self, series_id: &str, obs: &[Observation]) -> DataResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        write_fred_csv(&self.path_for(series_id), series_id, obs)
    }
}

impl SeriesSource for CsvDirSource {
    fn name(&self) -> &'static str {
        "csv-dir"
    }

    fn fetch_series(&self, series_id: &str, from: NaiveDate) -> DataResult<Vec<Observation>> {
        match self.read_all(series_id)? {
            Some(obs) => Ok(obs.into_iter().filter(|o| in_range(o.period, from)).collect()),
            None => Err(DataError::UnknownSeries {
                series: series_id.to_string(),
                detail: format!("no cached file at {}", self.path_for(series_id).display()),
            }),
        }
    }
}

// ---- Read-through cache ----

/// CachedSource — remote source with an append-only CSV cache.
///
/// Invariants
/// ----------
/// - Values already present in the cache are returned unchanged on every
///   later run; remote revisions of past months are logged and ignored.
/// - The cache file is rewritten with the merged history after each fetch.
#[derive(Debug, Clone)]
pub struct CachedSource<S> {
    remote: S,
    cache: CsvDirSource,
}

impl<S: SeriesSource> CachedSource<S> {
    pub fn new(remote: S, cache_dir: impl Into<PathBuf>) -> Self {
        Self { remote, cache: CsvDirSource::new(cache_dir) }
    }
}

fn merge_append_only(
    series_id: &str, cached: Vec<Observation>, remote: Vec<Observation>,
) -> Vec<Observation> {
    let mut merged: BTreeMap<Period, f64> =
        cached.into_iter().map(|o| (o.period, o.value)).collect();
    let mut revisions = 0usize;
    for o in remote {
        match merged.get(&o.period) {
            Some(&old) if (old - o.value).abs() > 1e-9 * old.abs().max(1.0) => {
                revisions += 1;
                debug!(
                    series = series_id,
                    period = %o.period,
                    cached = old,
                    remote = o.value,
                    "ignoring revision"
                );
            }
            Some(_) => {}
            None => {
                merged.insert(o.period, o.value);
            }
        }
    }
    if revisions > 0 {
        warn!(
            series = series_id,
            revisions, "remote revised cached history; keeping cached values"
        );
    }
    merged.into_iter().map(|(period, value)| Observation::new(period, series_id, value)).collect()
}

impl<S: SeriesSource> SeriesSource for CachedSource<S> {
    fn name(&self) -> &'static str {
        "cached"
    }

    fn fetch_series(&self, series_id: &str, from: NaiveDate) -> DataResult<Vec<Observation>> {
        let cached = self.cache.read_all(series_id)?.unwrap_or_default();
        let remote = self.remote.fetch_series(series_id, from)?;
        let merged = merge_append_only(series_id, cached, remote);
        self.cache.write_all(series_id, &merged)?;
        Ok(merged.into_iter().filter(|o| in_range(o.period, from)).collect())
    }
}

// ---- In memory ----

/// InMemorySource — series held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: HashMap<String, Vec<Observation>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register consecutive monthly `values` for `series_id` starting at `start`.
    pub fn with_series(mut self, series_id: &str, start: Period, values: &[f64]) -> Self {
        let mut period = start;
        let obs = values
            .iter()
            .map(|&v| {
                let o = Observation::new(period, series_id, v);
                period = period.succ();
                o
            })
            .collect();
        self.series.insert(series_id.to_string(), obs);
        self
    }
}

impl SeriesSource for InMemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn fetch_series(&self, series_id: &str, from: NaiveDate) -> DataResult<Vec<Observation>> {
        self.series
            .get(series_id)
            .map(|obs| obs.iter().filter(|o| in_range(o.period, from)).cloned().collect())
            .ok_or_else(|| DataError::UnknownSeries {
                series: series_id.to_string(),
                detail: "not registered in memory".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - FRED CSV parsing (both header spellings, missing values, unknown ids).
    // - `fetch` failing with `NoDataInRange` / `UnknownSeries`.
    // - Append-only semantics of `CachedSource`.
    //
    // They intentionally DO NOT cover:
    // - Live HTTP requests to FRED.
    // -------------------------------------------------------------------------

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn p(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Parse the current FRED layout, skip `.` values and apply the start date.
    //
    // Given
    // -----
    // - A CSV with header `observation_date,DSPI`, one `.` row, four months.
    // - `from = 2000-02-01`.
    //
    // Expect
    // ------
    // - Two observations (2000-02 and 2000-04); 2000-03 is skipped.
    fn parse_fred_csv_skips_missing_and_applies_start() {
        // Arrange
        let body =
            "observation_date,DSPI\n2000-01-01,1.0\n2000-02-01,2.5\n2000-03-01,.\n2000-04-01,4.0\n";

        // Act
        let obs = parse_fred_csv(body.as_bytes(), "DSPI", date(2000, 2, 1)).unwrap();

        // Assert
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].period, p(2000, 2));
        assert_eq!(obs[0].value, 2.5);
        assert_eq!(obs[1].period, p(2000, 4));
    }

    #[test]
    fn parse_fred_csv_accepts_legacy_date_header() {
        let body = "DATE,PMSAVE\n1999-12-01,10.0\n";

        let obs = parse_fred_csv(body.as_bytes(), "PMSAVE", NaiveDate::MIN).unwrap();

        assert_eq!(obs, vec![Observation::new(p(1999, 12), "PMSAVE", 10.0)]);
    }

    #[test]
    // Purpose
    // -------
    // An HTML error page (what FRED returns for unknown ids) must be
    // reported as an unknown series.
    fn parse_fred_csv_rejects_html_error_page() {
        let body = "<!DOCTYPE html>\n<html><body>Series not found</body></html>\n";

        let err = parse_fred_csv(body.as_bytes(), "NOPE", NaiveDate::MIN).unwrap_err();

        assert!(matches!(err, DataError::UnknownSeries { ref series, .. } if series == "NOPE"));
    }

    #[test]
    fn parse_fred_csv_reports_bad_numbers() {
        let body = "observation_date,X\n2000-01-01,abc\n";

        let err = parse_fred_csv(body.as_bytes(), "X", NaiveDate::MIN).unwrap_err();

        assert!(matches!(err, DataError::Parse { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A start date after the last available observation is an explicit
    // error, not an empty table.
    //
    // Given
    // -----
    // - An in-memory series covering 2000-01..2000-12.
    // - `from = 2001-06-01`.
    //
    // Expect
    // ------
    // - `DataError::NoDataInRange` naming the series.
    fn fetch_after_last_observation_is_no_data_in_range() {
        // Arrange
        let source = InMemorySource::new().with_series("A", p(2000, 1), &[1.0; 12]);
        let ids = vec!["A".to_string()];

        // Act
        let err = source.fetch(&ids, date(2001, 6, 1)).unwrap_err();

        // Assert
        assert_eq!(
            err,
            DataError::NoDataInRange { series: "A".to_string(), from: date(2001, 6, 1) }
        );
        assert!(err.to_string().contains("No data in range"));
    }

    #[test]
    fn fetch_unknown_series_fails() {
        let source = InMemorySource::new().with_series("A", p(2000, 1), &[1.0; 3]);
        let ids = vec!["A".to_string(), "B".to_string()];

        let err = source.fetch(&ids, NaiveDate::MIN).unwrap_err();

        assert!(matches!(err, DataError::UnknownSeries { ref series, .. } if series == "B"));
    }

    #[test]
    fn fetch_with_no_ids_is_rejected() {
        let source = InMemorySource::new();

        assert_eq!(source.fetch(&[], NaiveDate::MIN).unwrap_err(), DataError::EmptyRequest);
    }

    #[test]
    // Purpose
    // -------
    // Cached months keep their first-seen values; only trailing months are
    // appended on a later run.
    //
    // Given
    // -----
    // - Run 1: remote has 2000-01..2000-03 = [1, 2, 3].
    // - Run 2: remote revised 2000-02 to 20 and added 2000-04 = 4.
    //
    // Expect
    // ------
    // - Run 2 returns [1, 2, 3, 4] and the cache file holds the same.
    fn cached_source_is_append_only() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let first = InMemorySource::new().with_series("A", p(2000, 1), &[1.0, 2.0, 3.0]);
        let second = InMemorySource::new().with_series("A", p(2000, 1), &[1.0, 20.0, 3.0, 4.0]);

        // Act
        let run1 = CachedSource::new(first, dir.path()).fetch_series("A", NaiveDate::MIN).unwrap();
        let run2 = CachedSource::new(second, dir.path()).fetch_series("A", NaiveDate::MIN).unwrap();
        let on_disk = CsvDirSource::new(dir.path()).fetch_series("A", NaiveDate::MIN).unwrap();

        // Assert
        let v1: Vec<f64> = run1.iter().map(|o| o.value).collect();
        let v2: Vec<f64> = run2.iter().map(|o| o.value).collect();
        let v_disk: Vec<f64> = on_disk.iter().map(|o| o.value).collect();
        assert_eq!(v1, vec![1.0, 2.0, 3.0]);
        assert_eq!(v2, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(v_disk, v2);
    }

    #[test]
    fn csv_dir_source_without_file_is_unknown_series() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvDirSource::new(dir.path());

        let err = source.fetch_series("DSPI", NaiveDate::MIN).unwrap_err();

        assert!(matches!(err, DataError::UnknownSeries { .. }));
    }
}
