//! Shared error type across cloudprom crates.

use thiserror::Error;

/// Stable error classification, used in logs and the exporter's own metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad metadata / stat-type combination or invalid config.
    Configuration,
    /// Namespace registered twice.
    Duplicate,
    /// Namespace not registered.
    NotFound,
    /// A declared label has no value for a series.
    MissingValue,
    /// No samples to aggregate for a series.
    NoData,
    /// Upstream repository failure or timeout.
    Repository,
    /// Programmer error (e.g. zero batch size).
    InvalidArgument,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// String representation used in log fields and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "CONFIGURATION",
            ErrorKind::Duplicate => "DUPLICATE",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::MissingValue => "MISSING_VALUE",
            ErrorKind::NoData => "NO_DATA",
            ErrorKind::Repository => "REPOSITORY",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CloudPromError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum CloudPromError {
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("namespace already registered: {0}")]
    Duplicate(String),
    #[error("namespace not registered: {0}")]
    NotFound(String),
    #[error("missing value for label {label} (series={series})")]
    MissingValue { label: String, series: String },
    #[error("no data (series={0})")]
    NoData(String),
    #[error("repository: {0}")]
    Repository(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl CloudPromError {
    /// Map the error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CloudPromError::Configuration(_) => ErrorKind::Configuration,
            CloudPromError::Duplicate(_) => ErrorKind::Duplicate,
            CloudPromError::NotFound(_) => ErrorKind::NotFound,
            CloudPromError::MissingValue { .. } => ErrorKind::MissingValue,
            CloudPromError::NoData(_) => ErrorKind::NoData,
            CloudPromError::Repository(_) => ErrorKind::Repository,
            CloudPromError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CloudPromError::Internal(_) => ErrorKind::Internal,
        }
    }
}
