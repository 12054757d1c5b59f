//! Diagnostics computed from MPAS unstructured-grid output.
//!
//! Both views follow the same pipeline:
//!
//! ```text
//! MultiFileDataset ──► CellMask ──► masked mean ──► 2D array ──► renderer
//!   (netcdf-parser)    (selector)    (reduce)
//! ```
//!
//! - [`HovmollerSlice`]: a `(time, cell)` field averaged over a latitude
//!   band in 1° longitude bins.
//! - [`HumidityProfile`]: relative humidity derived from pressure,
//!   potential temperature and mixing ratio, averaged over a small window
//!   and laid out `(level, time)`.

pub mod hovmoller;
pub mod humidity;
pub mod profile;
pub mod reduce;
pub mod selector;

pub use hovmoller::HovmollerSlice;
pub use humidity::ReferencePressure;
pub use profile::HumidityProfile;
pub use reduce::{hovmoller_average, masked_mean};
pub use selector::{cell_mask, latitude_mask, longitude_bin_masks, CellMask, LongitudeBin};
