//! Named colormaps for filled contour plots.
//!
//! A colormap maps a normalized value in [0, 1] to a color by linear
//! interpolation between evenly spaced stops. Any name suffixed with `_r`
//! gives the reversed map.

use mpas_common::{MpasError, MpasResult};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let (r, g, b) = hex_to_rgb(hex)?;
        Some(Self::new(r, g, b, 255))
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| (a as f32 * t_inv + b as f32 * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

// ColorBrewer RdYlBu, 11 classes
const RD_YL_BU: &[&str] = &[
    "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee090", "#ffffbf", "#e0f3f8", "#abd9e9",
    "#74add1", "#4575b4", "#313695",
];

// GMT no_green, blue through cyan and yellow to red
const GMT_NO_GREEN: &[&str] = &[
    "#2060ff", "#209fff", "#20bfff", "#00cfff", "#2affff", "#55ffff", "#7fffff", "#aaffff",
    "#ffff54", "#fff000", "#ffbf00", "#ffa800", "#ff8a00", "#ff7000", "#ff4d00", "#ff0000",
];

// Dry tan to saturated blue
const HUMIDITY: &[&str] = &["#d2b48c", "#ffff96", "#adff2f", "#64c8ff", "#1932c8"];

/// Names accepted by [`Colormap::by_name`], without `_r` variants.
pub const COLORMAP_NAMES: &[&str] = &["RdYlBu", "GMT_no_green", "humidity"];

/// A continuous colormap built from evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    stops: Vec<Color>,
}

impl Colormap {
    /// Build a colormap from at least two stops.
    pub fn new(name: impl Into<String>, stops: Vec<Color>) -> MpasResult<Self> {
        let name = name.into();
        if stops.len() < 2 {
            return Err(MpasError::UnknownColormap(format!(
                "{} needs at least two stops",
                name
            )));
        }
        Ok(Self { name, stops })
    }

    /// Look up a named colormap. `RdYlBu_r` and friends are reversed.
    pub fn by_name(name: &str) -> MpasResult<Self> {
        if let Some(base) = name.strip_suffix("_r") {
            let mut cmap = Self::by_name(base)?;
            cmap.stops.reverse();
            cmap.name = name.to_string();
            return Ok(cmap);
        }

        let hex = match name {
            "RdYlBu" => RD_YL_BU,
            "GMT_no_green" => GMT_NO_GREEN,
            "humidity" => HUMIDITY,
            other => return Err(MpasError::UnknownColormap(other.to_string())),
        };

        let stops = hex
            .iter()
            .map(|h| Color::from_hex(h).ok_or_else(|| MpasError::UnknownColormap(h.to_string())))
            .collect::<MpasResult<Vec<_>>>()?;
        Self::new(name, stops)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color at normalized position `t` (clamped to [0, 1]).
    pub fn sample(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (self.stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(self.stops.len() - 2);
        interpolate_color(self.stops[i], self.stops[i + 1], scaled - i as f32)
    }

    /// `n` colors sampled evenly from one end of the map to the other.
    pub fn discrete(&self, n: usize) -> Vec<Color> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(0.5)],
            _ => (0..n)
                .map(|i| self.sample(i as f32 / (n - 1) as f32))
                .collect(),
        }
    }
}
