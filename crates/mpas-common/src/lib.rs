//! Common types shared by the MPAS diagnostics crates.

pub mod error;
pub mod grid;
pub mod time;
pub mod window;

pub use error::{MpasError, MpasResult};
pub use grid::{degrees_to_radians, radians_to_degrees, CellGrid};
pub use time::{CalendarAxis, Tick};
pub use window::{GeoWindow, LatitudeBand, LonConvention};
