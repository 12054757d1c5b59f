//! Multi-file datasets concatenated along the record dimension.
//!
//! MPAS writes one file per output interval (`diagnostics.2009-01-15_00.00.00.nc`,
//! ...). A [`MultiFileDataset`] opens every file matching a glob pattern,
//! sorted by name so the embedded timestamps come out in order, and reads
//! time-indexed variables as one array with the record axis first.

use std::path::{Path, PathBuf};

use mpas_common::{CalendarAxis, CellGrid, MpasResult};
use ndarray::{ArrayD, IxDyn};
use tracing::{debug, info, warn};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{open_file, read_values_f64, require_variable, variable_dims};

/// Name of the MPAS record dimension.
pub const TIME_DIMENSION: &str = "Time";

/// Expand a glob pattern into a sorted list of existing files.
pub fn expand_pattern(pattern: &str) -> NetCdfResult<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| NetCdfError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| NetCdfError::IoError(e.into_error()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(NetCdfError::NoFilesMatched(pattern.to_string()));
    }
    Ok(paths)
}

/// A set of NetCDF files read as one logical dataset.
pub struct MultiFileDataset {
    pattern: String,
    time_dim: String,
    files: Vec<(PathBuf, netcdf::File)>,
}

impl MultiFileDataset {
    /// Open every file matching `pattern`.
    pub fn open(pattern: &str) -> NetCdfResult<Self> {
        let paths = expand_pattern(pattern)?;
        Self::open_paths(pattern, paths)
    }

    /// Open an explicit, already ordered list of files.
    pub fn open_paths(label: &str, paths: Vec<PathBuf>) -> NetCdfResult<Self> {
        if paths.is_empty() {
            return Err(NetCdfError::NoFilesMatched(label.to_string()));
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let file = open_file(&path)?;
            files.push((path, file));
        }

        info!(
            pattern = %label,
            files = files.len(),
            first = %files[0].0.display(),
            "Opened dataset"
        );

        Ok(Self {
            pattern: label.to_string(),
            time_dim: TIME_DIMENSION.to_string(),
            files,
        })
    }

    /// The pattern the dataset was opened from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Paths of the member files, in concatenation order.
    pub fn paths(&self) -> Vec<&Path> {
        self.files.iter().map(|(p, _)| p.as_path()).collect()
    }

    /// Number of member files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total length of the record dimension across all files.
    pub fn time_len(&self) -> NetCdfResult<usize> {
        let mut total = 0;
        for (path, file) in &self.files {
            let dim = file
                .dimension(&self.time_dim)
                .ok_or_else(|| NetCdfError::MissingDimension {
                    file: path.display().to_string(),
                    name: self.time_dim.clone(),
                })?;
            total += dim.len();
        }
        Ok(total)
    }

    /// Calendar of the series, derived from the member file names and the
    /// number of records each file holds.
    ///
    /// `None` when the files hold differing record counts.
    pub fn calendar(&self) -> Option<CalendarAxis> {
        CalendarAxis::from_file_names(&self.paths(), self.records_per_file()?)
    }

    /// Record count shared by every member file.
    pub fn records_per_file(&self) -> Option<usize> {
        let mut counts = self
            .files
            .iter()
            .map(|(_, file)| file.dimension(&self.time_dim).map(|d| d.len()));
        let first = counts.next()??;
        counts.all(|c| c == Some(first)).then_some(first)
    }

    /// Read a time-indexed variable from every file, concatenated along the
    /// leading record axis.
    ///
    /// All files must agree on the lengths of the remaining dimensions.
    pub fn read_time_series(&self, name: &str) -> NetCdfResult<ArrayD<f64>> {
        let mut tail: Option<Vec<usize>> = None;
        let mut steps = 0;
        let mut values = Vec::new();

        for (path, file) in &self.files {
            let var = require_variable(file, path, name)?;
            let (dims, shape) = variable_dims(&var);

            if dims.first().map(String::as_str) != Some(self.time_dim.as_str()) {
                return Err(NetCdfError::InvalidFormat(format!(
                    "{} in {} is not indexed by {} (dimensions {:?})",
                    name,
                    path.display(),
                    self.time_dim,
                    dims
                )));
            }

            match &tail {
                Some(expected) if expected.as_slice() != &shape[1..] => {
                    return Err(NetCdfError::ShapeMismatch {
                        file: path.display().to_string(),
                        name: name.to_string(),
                        expected: expected.clone(),
                        found: shape[1..].to_vec(),
                    });
                }
                Some(_) => {}
                None => tail = Some(shape[1..].to_vec()),
            }

            steps += shape[0];
            values.extend(read_values_f64(&var, path)?);
        }

        let mut full_shape = vec![steps];
        full_shape.extend(tail.unwrap_or_default());
        debug!(variable = %name, shape = ?full_shape, "Read time series");

        ArrayD::from_shape_vec(IxDyn(&full_shape), values).map_err(|e| {
            NetCdfError::InvalidFormat(format!("{} does not fit shape {:?}: {}", name, full_shape, e))
        })
    }

    /// Read a variable without a record dimension (coordinates, `zgrid`) from
    /// the first file.
    pub fn read_static(&self, name: &str) -> NetCdfResult<ArrayD<f64>> {
        let (path, file) = &self.files[0];
        let var = require_variable(file, path, name)?;
        let (dims, shape) = variable_dims(&var);

        if dims.first().map(String::as_str) == Some(self.time_dim.as_str()) {
            warn!(
                variable = %name,
                "Static read of a time-indexed variable; using the first file only"
            );
        }

        let values = read_values_f64(&var, path)?;
        ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| {
            NetCdfError::InvalidFormat(format!("{} does not fit shape {:?}: {}", name, shape, e))
        })
    }

    /// Read `latCell`/`lonCell` (radians) into a grid in degrees.
    pub fn read_cell_grid(&self) -> MpasResult<CellGrid> {
        let lat = self.read_static("latCell")?;
        let lon = self.read_static("lonCell")?;
        let lat: Vec<f64> = lat.iter().copied().collect();
        let lon: Vec<f64> = lon.iter().copied().collect();
        CellGrid::from_radians(&lat, &lon)
    }

    /// Compare the number of matched files with the record length.
    ///
    /// Each MPAS output file normally holds one step, so the two agree. The
    /// record length is authoritative; a disagreement is only reported.
    pub fn check_one_step_per_file(&self) -> NetCdfResult<bool> {
        let steps = self.time_len()?;
        let consistent = steps == self.files.len();
        if !consistent {
            warn!(
                pattern = %self.pattern,
                files = self.files.len(),
                steps,
                "File count differs from record length; using record length"
            );
        }
        Ok(consistent)
    }
}

impl std::fmt::Debug for MultiFileDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiFileDataset")
            .field("pattern", &self.pattern)
            .field("time_dim", &self.time_dim)
            .field("files", &self.paths())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_pattern_no_match() {
        let err = expand_pattern("/nonexistent-dir/diagnostics.*.nc").unwrap_err();
        assert!(matches!(err, NetCdfError::NoFilesMatched(_)));
    }

    #[test]
    fn test_expand_pattern_invalid() {
        let err = expand_pattern("diagnostics.[.nc").unwrap_err();
        assert!(matches!(err, NetCdfError::InvalidPattern { .. }));
    }

    #[test]
    fn test_open_paths_empty() {
        let err = MultiFileDataset::open_paths("none", vec![]).unwrap_err();
        assert!(matches!(err, NetCdfError::NoFilesMatched(_)));
    }
}
