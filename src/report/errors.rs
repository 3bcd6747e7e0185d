//! report::errors — failures while rendering or writing the report.

pub type ReportResult<T> = Result<T, ReportError>;

/// ReportError — error conditions for the report subtree.
///
/// Variants
/// --------
/// - `Io { path, text }`
///   Creating the output directory or writing a file failed.
/// - `Json { text }`
///   Serialising the artifacts failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    Io { path: String, text: String },
    Json { text: String },
}

impl std::error::Error for ReportError {}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io { path, text } => {
                write!(f, "Report Error: cannot write '{path}': {text}")
            }
            ReportError::Json { text } => {
                write!(f, "Report Error: JSON serialisation failed: {text}")
            }
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Json { text: err.to_string() }
    }
}
