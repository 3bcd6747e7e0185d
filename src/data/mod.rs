//! data — acquisition of monthly series and reshaping into a wide table.
//!
//! Purpose
//! -------
//! Turn a list of series identifiers and a start date into the month ×
//! series matrix the statistical stages consume, failing visibly on unknown
//! series, empty ranges or holes in the data.
//!
//! Key behaviors
//! -------------
//! - [`SeriesSource`] abstracts the provider; [`FredSource`],
//!   [`CsvDirSource`], [`CachedSource`] and [`InMemorySource`] implement it.
//! - [`LongTable`] stores `(period, series_id, value)` triples per series.
//! - [`WideTable::pivot`] aligns the series on their common monthly span.
//!
//! Invariants & assumptions
//! ------------------------
//! - Source data is treated as immutable for past periods: re-running with a
//!   later "now" may add trailing rows but never changes earlier values when
//!   the cache is enabled.
//! - Every value reaching [`WideTable`] is finite; positivity is checked
//!   later by the transformation stage, which knows it needs logarithms.
//!
//! Downstream usage
//! ----------------
//! - The pipeline calls `source.fetch(&ids, start)` and then
//!   `WideTable::pivot(&long, &ids)`.

pub mod errors;
pub mod observation;
pub mod period;
pub mod source;
pub mod wide;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{DataError, DataResult};
pub use self::observation::{LongTable, Observation};
pub use self::period::Period;
pub use self::source::{CachedSource, CsvDirSource, FredSource, InMemorySource, SeriesSource};
pub use self::wide::WideTable;
