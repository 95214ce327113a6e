//! Error kinds shared across the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading sources or building map features.
///
/// `SourceNotFound`, `Io`, `Csv`, `Json` and `MissingColumn` are fatal to a
/// recomputation. `Parse`, `InvalidGeometry` and `DuplicateKey` are raised per
/// record and collected by the merger instead of aborting the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to parse geometry: {0}")]
    Parse(String),

    #[error("invalid geometry type: expected Polygon or MultiPolygon, got {0}")]
    InvalidGeometry(String),

    #[error("degenerate score range: min == max == {0}")]
    DegenerateRange(f64),

    #[error("duplicate key {key:?} in score table")]
    DuplicateKey { key: String },

    #[error("invalid score range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    #[error("unknown palette {0:?}")]
    UnknownPalette(String),

    #[error("missing column {0:?}")]
    MissingColumn(String),

    #[error("row has no value in key column {0:?}")]
    MissingKey(String),

    #[error("missing or non-finite score for key {key:?}")]
    NonFiniteScore { key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the error only affects a single record and the run can continue.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            Error::Parse(_)
                | Error::InvalidGeometry(_)
                | Error::DuplicateKey { .. }
                | Error::MissingKey(_)
                | Error::NonFiniteScore { .. }
        )
    }

    /// Map an `io::Error` from opening `path` to `SourceNotFound` when the file is missing.
    pub(crate) fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::SourceNotFound { path: path.to_path_buf() },
            _ => Error::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A record-level failure, tagged with the key (or row label) it applies to.
#[derive(Debug, Error)]
#[error("{key}: {error}")]
pub struct RecordError {
    pub key: String,
    #[source]
    pub error: Error,
}

impl RecordError {
    pub fn new(key: impl Into<String>, error: Error) -> Self {
        Self { key: key.into(), error }
    }
}
