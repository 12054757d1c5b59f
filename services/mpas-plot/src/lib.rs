//! MPAS diagnostic plots.
//!
//! Two pipelines over MPAS unstructured-grid output, each rendering one PNG
//! per figure:
//! - [`hovmoller`]: vertical velocity averaged in a latitude band, binned by
//!   longitude, plotted against time
//! - [`profile`]: relative humidity over a small window, plotted against
//!   altitude and time

pub mod config;
pub mod hovmoller;
pub mod profile;

pub use config::PlotConfig;
