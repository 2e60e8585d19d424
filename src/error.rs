use thiserror::Error;

/// Fatal errors that abort an export run
#[derive(Debug, Error)]
pub enum ExportError {
    /// Bad configuration value, or the data source could not be reached
    #[error("Configuration error: {0}")]
    Config(String),
    /// No survey registered under the requested name
    #[error("Survey not found: {0}")]
    SurveyNotFound(String),
    /// Range discovery or batch fetch failed
    #[error("Scan error: {0}")]
    Scan(String),
    /// Device identifier lookup failed
    #[error("Identifier resolution error: {0}")]
    Resolution(String),
    /// Writing the output CSV (or reading one back) failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Short tag used in logs and tests
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::Config(_) => "config",
            ExportError::SurveyNotFound(_) => "survey-not-found",
            ExportError::Scan(_) => "scan",
            ExportError::Resolution(_) => "resolution",
            ExportError::Csv(_) => "csv",
            ExportError::Io(_) => "io",
        }
    }
}

/// Per-row reasons the dedup window turns a record away.
///
/// These never abort a run; the driver counts duplicates and drops invalid rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Rejection {
    #[error("duplicate record")]
    Duplicate,
    #[error("invalid timestamp")]
    InvalidTimestamp,
}

pub type Result<T> = std::result::Result<T, ExportError>;
