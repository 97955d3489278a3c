//! Fatal error taxonomy.
//!
//! Every variant that can end the process maps to its own exit code so that
//! callers (and scripts around the CLI) can tell failure classes apart.
//! Per-feature conditions inside a collection are deliberately not here;
//! those are [`SkipReason`](crate::geometry::SkipReason) values and never
//! abort a run.

use thiserror::Error;

/// A fatal error: configuration, I/O, or a geometry failure on a bare
/// (non-collection) input.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid radius '{0}': expected a positive number in kilometers")]
    InvalidRadius(String),

    #[error("no input file given")]
    MissingInput,

    #[error("no output file given")]
    MissingOutput,

    #[error("input file not found: {0}")]
    InputNotFound(String),

    #[error("could not read {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("could not parse {path} as GeoJSON: {source}")]
    ParseFailed {
        path: String,
        source: geojson::Error,
    },

    #[error("could not write {path}: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("unsupported input geometry: {0}")]
    InvalidGeometry(String),

    #[error("geometry operation failed: {0}")]
    OperationFailed(String),
}

impl GridError {
    /// Process exit status for this error. Distinct per failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            GridError::InvalidRadius(_) => 2,
            GridError::MissingInput => 3,
            GridError::MissingOutput => 4,
            GridError::InputNotFound(_) => 5,
            GridError::ReadFailed { .. } => 6,
            GridError::ParseFailed { .. } => 7,
            GridError::WriteFailed { .. } => 8,
            GridError::InvalidGeometry(_) => 9,
            GridError::OperationFailed(_) => 10,
        }
    }
}
