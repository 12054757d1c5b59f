//! Filled-contour figure rendering.
//!
//! - Colormaps and discrete band colors
//! - Band classification and marching-squares band edges
//! - Figure layout with axes, ticks and colorbar
//! - PNG encoding

pub mod colormap;
pub mod contour;
pub mod figure;
pub mod png;
pub mod text;

pub use colormap::{Color, Colormap, COLORMAP_NAMES};
pub use contour::{arange_levels, BandScheme, Extend};
pub use figure::{
    render_filled_contour, AxisSpec, ColorbarOrientation, ColorbarSpec, FieldGrid, Figure,
    FigureConfig, Frame,
};
