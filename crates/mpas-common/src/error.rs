//! Error types for the MPAS diagnostics pipelines.

use thiserror::Error;

/// Result type alias using MpasError.
pub type MpasResult<T> = Result<T, MpasError>;

/// Primary error type for loading, reducing and rendering diagnostics.
#[derive(Debug, Error)]
pub enum MpasError {
    // === Input Errors ===
    #[error("No files match pattern: {0}")]
    NoFilesMatched(String),

    #[error("Variable '{name}' not found in {file}")]
    MissingVariable { file: String, name: String },

    #[error("Dimension '{name}' not found in {file}")]
    MissingDimension { file: String, name: String },

    #[error("Invalid NetCDF data: {0}")]
    NetCdf(String),

    // === Shape Errors ===
    #[error("Shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("{what} must be {expected}-dimensional, found shape {found:?}")]
    RankMismatch {
        what: String,
        expected: usize,
        found: Vec<usize>,
    },

    // === Selection Errors ===
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Window crosses the longitude seam ({lon_min} >= {lon_max}); split it into two windows")]
    SeamCrossing { lon_min: f64, lon_max: f64 },

    #[error("Window selects no cells: {0}")]
    EmptySelection(String),

    // === Rendering Errors ===
    #[error("Invalid contour levels: {0}")]
    InvalidLevels(String),

    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MpasError {
    /// Convenience constructor for shape mismatches.
    pub fn shape(what: impl Into<String>, expected: &[usize], found: &[usize]) -> Self {
        MpasError::ShapeMismatch {
            what: what.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// An array with the wrong number of dimensions.
    pub fn rank(what: impl Into<String>, expected: usize, found: &[usize]) -> Self {
        MpasError::RankMismatch {
            what: what.into(),
            expected,
            found: found.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_message() {
        let err = MpasError::shape("w_500hPa", &[3, 10], &[3, 12]);
        assert_eq!(
            err.to_string(),
            "Shape mismatch for w_500hPa: expected [3, 10], found [3, 12]"
        );
    }

    #[test]
    fn test_rank_message() {
        let err = MpasError::rank("theta (time, cell, level)", 3, &[2, 4]);
        assert_eq!(
            err.to_string(),
            "theta (time, cell, level) must be 3-dimensional, found shape [2, 4]"
        );
    }

    #[test]
    fn test_seam_crossing_message() {
        let err = MpasError::SeamCrossing {
            lon_min: 350.0,
            lon_max: 10.0,
        };
        assert!(err.to_string().contains("split it into two windows"));
    }
}
