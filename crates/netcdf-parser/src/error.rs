//! Error types for NetCDF reading operations.

use mpas_common::MpasError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF reading.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Glob pattern could not be parsed
    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Pattern matched nothing
    #[error("No files match pattern: {0}")]
    NoFilesMatched(String),

    /// Missing required variable
    #[error("Variable '{name}' not found in {file}")]
    MissingVariable { file: String, name: String },

    /// Missing required dimension
    #[error("Dimension '{name}' not found in {file}")]
    MissingDimension { file: String, name: String },

    /// Files of one series disagree on a variable's shape
    #[error("Shape mismatch for '{name}' in {file}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        file: String,
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<NetCdfError> for MpasError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => MpasError::Io(e),
            NetCdfError::NoFilesMatched(pattern) => MpasError::NoFilesMatched(pattern),
            NetCdfError::MissingVariable { file, name } => {
                MpasError::MissingVariable { file, name }
            }
            NetCdfError::MissingDimension { file, name } => {
                MpasError::MissingDimension { file, name }
            }
            NetCdfError::ShapeMismatch {
                file,
                name,
                expected,
                found,
            } => MpasError::ShapeMismatch {
                what: format!("{name} in {file}"),
                expected,
                found,
            },
            other => MpasError::NetCdf(other.to_string()),
        }
    }
}
