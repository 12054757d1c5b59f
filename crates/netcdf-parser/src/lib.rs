//! NetCDF reader for MPAS unstructured-grid model output.
//!
//! This crate opens the per-interval files written by MPAS (`diagnostics.*.nc`,
//! `x1.*.output.*.nc`) and exposes their variables as `f64` arrays, with
//! time-indexed variables concatenated across files.
//!
//! # MPAS Data Structure
//!
//! Fields are stored on an unstructured mesh: the horizontal dimension is
//! `nCells`, with cell-center coordinates `latCell`/`lonCell` in radians.
//! Three-dimensional fields add `nVertLevels` (or `nVertLevelsP1` for level
//! interfaces such as `zgrid`). The record dimension is `Time`.
//!
//! # Implementation Notes
//!
//! Reading goes through the `netcdf` crate (libnetcdf/HDF5). HDF5 error
//! printing is silenced before the first open.

pub mod dataset;
pub mod error;
pub mod native;

pub use dataset::{expand_pattern, MultiFileDataset, TIME_DIMENSION};
pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
