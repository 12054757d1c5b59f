//! Filled-contour figures with axes, ticks and a colorbar.
//!
//! Each figure is described by a [`FigureConfig`]; nothing is shared between
//! figures. The plot area is filled pixel by pixel: every pixel center maps
//! back to data coordinates, the field is sampled there by bilinear
//! interpolation, and the sample is colored by its band.
//!
//! ```text
//! ┌──────────────── width ────────────────┐
//! │               title                   │
//! │ y    ┌─────────────────────┐ ┌─┐      │
//! │ tick │      plot area      │ │ │ vert │
//! │ lbls │                     │ │ │ cbar │
//! │      └─────────────────────┘ └─┘      │
//! │           x tick labels               │
//! │  ◄[ horizontal colorbar ]►            │
//! └───────────────────────────────────────┘
//! ```

use std::path::Path;

use mpas_common::{MpasError, MpasResult, Tick};
use serde::{Deserialize, Serialize};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use tracing::debug;

use crate::colormap::{Color, Colormap};
use crate::contour::{generate_all_contours, BandScheme};
use crate::png::create_png_auto;
use crate::text::{draw_text, text_width, Anchor, TextStyle};

/// One axis of the plot area.
#[derive(Debug, Clone, Default)]
pub struct AxisSpec {
    pub label: Option<String>,
    /// Displayed data range, defaults to the coordinate span
    pub range: Option<(f64, f64)>,
    /// Explicit ticks; when empty, evenly spaced round values are used
    pub ticks: Vec<Tick>,
    /// Larger values toward the origin side (top for y, left for x)
    pub inverted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorbarOrientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Default)]
pub struct ColorbarSpec {
    pub orientation: ColorbarOrientation,
    pub label: Option<String>,
    /// Tick values; defaults to the levels, thinned to fit
    pub ticks: Option<Vec<f64>>,
}

/// Per-figure configuration.
#[derive(Debug, Clone)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    pub font_size: f32,
    pub background: Color,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub colorbar: ColorbarSpec,
    /// Trace band edges with thin isolines
    pub band_edges: bool,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 1000,
            title: None,
            font_size: 14.0,
            background: Color::WHITE,
            x_axis: AxisSpec::default(),
            y_axis: AxisSpec::default(),
            colorbar: ColorbarSpec::default(),
            band_edges: false,
        }
    }
}

/// A row-major field on a rectilinear grid: row `j` sits at `y[j]`,
/// column `i` at `x[i]`.
#[derive(Debug, Clone, Copy)]
pub struct FieldGrid<'a> {
    values: &'a [f64],
    x: &'a [f64],
    y: &'a [f64],
}

impl<'a> FieldGrid<'a> {
    /// Coordinates must be strictly increasing with at least two samples.
    pub fn new(values: &'a [f64], x: &'a [f64], y: &'a [f64]) -> MpasResult<Self> {
        if values.len() != x.len() * y.len() {
            return Err(MpasError::shape(
                "contour field",
                &[y.len(), x.len()],
                &[values.len()],
            ));
        }
        for (name, coords) in [("x", x), ("y", y)] {
            if coords.len() < 2 {
                return Err(MpasError::Render(format!(
                    "{} axis needs at least two coordinates, got {}",
                    name,
                    coords.len()
                )));
            }
            if coords.windows(2).any(|w| !(w[0] < w[1])) {
                return Err(MpasError::Render(format!(
                    "{} coordinates must be strictly increasing",
                    name
                )));
            }
        }
        Ok(Self { values, x, y })
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.x.len() + col]
    }

    /// Bilinear sample at data coordinates; NaN outside the grid or next
    /// to a missing value.
    pub fn sample(&self, xd: f64, yd: f64) -> f64 {
        match (locate(self.x, xd), locate(self.y, yd)) {
            (Some(cx), Some(cy)) => self.sample_at(cx, cy),
            _ => f64::NAN,
        }
    }

    fn sample_at(&self, (i, tx): (usize, f64), (j, ty): (usize, f64)) -> f64 {
        let v00 = self.at(j, i);
        let v10 = self.at(j, i + 1);
        let v01 = self.at(j + 1, i);
        let v11 = self.at(j + 1, i + 1);
        let top = v00 * (1.0 - tx) + v10 * tx;
        let bottom = v01 * (1.0 - tx) + v11 * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

/// Interval index and fraction of `v` within increasing `coords`.
fn locate(coords: &[f64], v: f64) -> Option<(usize, f64)> {
    let n = coords.len();
    if !(v >= coords[0] && v <= coords[n - 1]) {
        return None;
    }
    let i = coords.partition_point(|&c| c <= v).clamp(1, n - 1) - 1;
    let t = (v - coords[i]) / (coords[i + 1] - coords[i]);
    Some((i, t.clamp(0.0, 1.0)))
}

/// Map a fractional grid index back to a coordinate.
fn index_to_coord(coords: &[f64], f: f32) -> f64 {
    let f = (f as f64).clamp(0.0, (coords.len() - 1) as f64);
    let i = (f.floor() as usize).min(coords.len() - 2);
    coords[i] + (f - i as f64) * (coords[i + 1] - coords[i])
}

/// Placement of the plot area and its data ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub x_inverted: bool,
    pub y_inverted: bool,
}

impl Frame {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    fn x_fraction(&self, xd: f64) -> f64 {
        let f = (xd - self.x_range.0) / (self.x_range.1 - self.x_range.0);
        if self.x_inverted {
            1.0 - f
        } else {
            f
        }
    }

    fn y_fraction(&self, yd: f64) -> f64 {
        // Fraction measured downward from the top edge
        let f = (yd - self.y_range.0) / (self.y_range.1 - self.y_range.0);
        if self.y_inverted {
            f
        } else {
            1.0 - f
        }
    }

    /// Pixel position of a data point.
    pub fn data_to_pixel(&self, xd: f64, yd: f64) -> (f32, f32) {
        (
            self.left + (self.x_fraction(xd) * self.width as f64) as f32,
            self.top + (self.y_fraction(yd) * self.height as f64) as f32,
        )
    }

    /// Data coordinates under a pixel position.
    pub fn pixel_to_data(&self, px: f32, py: f32) -> (f64, f64) {
        let mut fx = ((px - self.left) / self.width) as f64;
        let mut fy = ((py - self.top) / self.height) as f64;
        if self.x_inverted {
            fx = 1.0 - fx;
        }
        if !self.y_inverted {
            fy = 1.0 - fy;
        }
        (
            self.x_range.0 + fx * (self.x_range.1 - self.x_range.0),
            self.y_range.0 + fy * (self.y_range.1 - self.y_range.0),
        )
    }

    fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.left && px <= self.right() && py >= self.top && py <= self.bottom()
    }
}

/// A rendered figure.
pub struct Figure {
    pixmap: Pixmap,
    frame: Frame,
}

impl Figure {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Color of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::new(p.red(), p.green(), p.blue(), p.alpha()))
    }

    /// Unpremultiplied RGBA bytes.
    pub fn rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    pub fn to_png(&self) -> MpasResult<Vec<u8>> {
        create_png_auto(&self.rgba(), self.width() as usize, self.height() as usize)
            .map_err(MpasError::Render)
    }

    /// Encode and write the figure as PNG.
    pub fn save(&self, path: &Path) -> MpasResult<()> {
        let png = self.to_png()?;
        std::fs::write(path, &png)?;
        debug!(path = %path.display(), bytes = png.len(), "Wrote figure");
        Ok(())
    }
}

/// Render `grid` as a filled contour plot.
pub fn render_filled_contour(
    grid: &FieldGrid,
    scheme: &BandScheme,
    colormap: &Colormap,
    config: &FigureConfig,
) -> MpasResult<Figure> {
    let mut pixmap = Pixmap::new(config.width, config.height).ok_or_else(|| {
        MpasError::Render(format!("invalid figure size {}x{}", config.width, config.height))
    })?;
    pixmap.fill(config.background.to_skia());

    let frame = layout(grid, config)?;
    let colors = scheme.colors(colormap);

    fill_bands(&mut pixmap, &frame, grid, scheme, &colors);
    if config.band_edges {
        draw_band_edges(&mut pixmap, &frame, grid, scheme);
    }
    draw_axes(&mut pixmap, &frame, config);
    draw_colorbar(&mut pixmap, &frame, scheme, &colors, config);

    if let Some(title) = &config.title {
        let style = TextStyle::new(config.font_size * 1.2).anchor(Anchor::Middle);
        draw_text(
            &mut pixmap,
            frame.left + frame.width / 2.0,
            frame.top / 2.0,
            title,
            &style,
        );
    }

    debug!(
        width = config.width,
        height = config.height,
        nx = grid.nx(),
        ny = grid.ny(),
        bands = scheme.n_bands(),
        "Rendered filled contour"
    );
    Ok(Figure { pixmap, frame })
}

fn layout(grid: &FieldGrid, config: &FigureConfig) -> MpasResult<Frame> {
    let fs = config.font_size;
    let vertical_bar = config.colorbar.orientation == ColorbarOrientation::Vertical;

    let top = if config.title.is_some() { fs * 3.0 } else { fs * 1.5 };
    let left = fs * 6.0;
    let right = if vertical_bar { fs * 9.0 } else { fs * 2.0 };
    let bottom = if vertical_bar { fs * 4.5 } else { fs * 10.0 };

    let width = config.width as f32 - left - right;
    let height = config.height as f32 - top - bottom;
    if width < 10.0 || height < 10.0 {
        return Err(MpasError::Render(format!(
            "figure {}x{} too small for its margins",
            config.width, config.height
        )));
    }

    let span = |coords: &[f64]| (coords[0], coords[coords.len() - 1]);
    let x_range = config.x_axis.range.unwrap_or_else(|| span(grid.x));
    let y_range = config.y_axis.range.unwrap_or_else(|| span(grid.y));
    for (name, (lo, hi)) in [("x", x_range), ("y", y_range)] {
        if !(lo < hi) {
            return Err(MpasError::Render(format!("empty {} range ({}, {})", name, lo, hi)));
        }
    }

    Ok(Frame {
        left,
        top,
        width,
        height,
        x_range,
        y_range,
        x_inverted: config.x_axis.inverted,
        y_inverted: config.y_axis.inverted,
    })
}

fn fill_bands(
    pixmap: &mut Pixmap,
    frame: &Frame,
    grid: &FieldGrid,
    scheme: &BandScheme,
    colors: &[Color],
) {
    let stride = pixmap.width() as usize;
    let x0 = frame.left.round() as usize;
    let x1 = (frame.right().round() as usize).min(stride);
    let y0 = frame.top.round() as usize;
    let y1 = (frame.bottom().round() as usize).min(pixmap.height() as usize);

    // Grid position of each pixel column and row, computed once
    let columns: Vec<Option<(usize, f64)>> = (x0..x1)
        .map(|px| locate(grid.x, frame.pixel_to_data(px as f32 + 0.5, frame.top).0))
        .collect();

    let data = pixmap.data_mut();
    for py in y0..y1 {
        let Some(cy) = locate(grid.y, frame.pixel_to_data(frame.left, py as f32 + 0.5).1) else {
            continue;
        };
        for (offset, cx) in columns.iter().enumerate() {
            let Some(cx) = *cx else {
                continue;
            };
            let band = scheme.classify(grid.sample_at(cx, cy));
            if let Some(color) = band.and_then(|b| colors.get(b)) {
                let idx = (py * stride + x0 + offset) * 4;
                let a = color.a as u16;
                let pre = |c: u8| ((c as u16 * a + 127) / 255) as u8;
                data[idx..idx + 4].copy_from_slice(&[pre(color.r), pre(color.g), pre(color.b), color.a]);
            }
        }
    }
}

fn stroke_paint(color: Color, width: f32) -> (Paint<'static>, Stroke) {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    let stroke = Stroke {
        width,
        line_cap: LineCap::Butt,
        line_join: LineJoin::Miter,
        ..Stroke::default()
    };
    (paint, stroke)
}

fn line(pixmap: &mut Pixmap, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    if let Some(path) = pb.finish() {
        let (paint, stroke) = stroke_paint(color, width);
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

fn draw_band_edges(pixmap: &mut Pixmap, frame: &Frame, grid: &FieldGrid, scheme: &BandScheme) {
    let contours = generate_all_contours(grid.values, grid.nx(), grid.ny(), scheme.levels());
    let edge = Color::new(40, 40, 40, 160);

    let mut pb = PathBuilder::new();
    for contour in &contours {
        let mut pen_down = false;
        for p in &contour.points {
            let (px, py) = frame.data_to_pixel(index_to_coord(grid.x, p.x), index_to_coord(grid.y, p.y));
            // Lift the pen outside the plot area
            if !frame.contains(px, py) {
                pen_down = false;
                continue;
            }
            if pen_down {
                pb.line_to(px, py);
            } else {
                pb.move_to(px, py);
                pen_down = true;
            }
        }
    }

    if let Some(path) = pb.finish() {
        let (paint, stroke) = stroke_paint(edge, 0.8);
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Format a tick value compactly: `0.05`, `-0.1`, `120`.
pub fn format_tick(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Round ticks (1, 2 or 5 × 10^k apart) spanning `range`.
pub fn nice_ticks(range: (f64, f64), target: usize) -> Vec<Tick> {
    let (lo, hi) = range;
    if !(lo < hi) || target == 0 {
        return Vec::new();
    }
    let raw = (hi - lo) / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last)
        .map(|k| {
            let v = k as f64 * step;
            Tick::new(v, format_tick(v))
        })
        .collect()
}

fn axis_ticks(axis: &AxisSpec, range: (f64, f64), target: usize) -> Vec<Tick> {
    if axis.ticks.is_empty() {
        nice_ticks(range, target)
    } else {
        axis.ticks
            .iter()
            .filter(|t| t.position >= range.0 && t.position <= range.1)
            .cloned()
            .collect()
    }
}

fn draw_axes(pixmap: &mut Pixmap, frame: &Frame, config: &FigureConfig) {
    let fs = config.font_size;
    let tick_len = fs * 0.4;
    let label_style = TextStyle::new(fs);

    if let Some(rect) = Rect::from_xywh(frame.left, frame.top, frame.width, frame.height) {
        let path = PathBuilder::from_rect(rect);
        let (paint, stroke) = stroke_paint(Color::BLACK, 1.0);
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    for tick in axis_ticks(&config.x_axis, frame.x_range, 6) {
        let (px, _) = frame.data_to_pixel(tick.position, frame.y_range.0);
        let y = frame.bottom();
        line(pixmap, (px, y), (px, y + tick_len), Color::BLACK, 1.0);
        draw_text(pixmap, px, y + fs * 1.2, &tick.label, &label_style.anchor(Anchor::Middle));
    }

    for tick in axis_ticks(&config.y_axis, frame.y_range, 8) {
        let (_, py) = frame.data_to_pixel(frame.x_range.0, tick.position);
        let x = frame.left;
        line(pixmap, (x - tick_len, py), (x, py), Color::BLACK, 1.0);
        draw_text(pixmap, x - fs * 0.8, py, &tick.label, &label_style.anchor(Anchor::End));
    }

    if let Some(label) = &config.x_axis.label {
        let style = label_style.anchor(Anchor::Middle);
        draw_text(pixmap, frame.left + frame.width / 2.0, frame.bottom() + fs * 2.8, label, &style);
    }
    if let Some(label) = &config.y_axis.label {
        let style = label_style
            .anchor(Anchor::Middle)
            .rotated(-std::f32::consts::FRAC_PI_2);
        draw_text(pixmap, fs * 1.2, frame.top + frame.height / 2.0, label, &style);
    }
}

/// Colorbar geometry along its long axis: `start..end` holds the interior
/// bands, extension caps sit outside that span.
struct BarGeometry {
    start: f32,
    end: f32,
    cross0: f32,
    thickness: f32,
    cap: f32,
}

impl BarGeometry {
    fn position(&self, scheme: &BandScheme, value: f64) -> Option<f32> {
        let levels = scheme.levels();
        let n = levels.len() - 1;
        if value < levels[0] || value > levels[n] {
            return None;
        }
        let i = levels.partition_point(|&l| l <= value).clamp(1, n) - 1;
        let frac = (i as f64 + (value - levels[i]) / (levels[i + 1] - levels[i])) / n as f64;
        Some(self.start + frac as f32 * (self.end - self.start))
    }
}

fn draw_colorbar(
    pixmap: &mut Pixmap,
    frame: &Frame,
    scheme: &BandScheme,
    colors: &[Color],
    config: &FigureConfig,
) {
    let fs = config.font_size;
    let horizontal = config.colorbar.orientation == ColorbarOrientation::Horizontal;
    let thickness = fs * 1.5;
    let cap = thickness * 1.2;
    let extend = scheme.extend();

    // Long axis runs left→right (horizontal) or bottom→top (vertical)
    let geo = if horizontal {
        BarGeometry {
            start: frame.left + if extend.has_min() { cap } else { 0.0 },
            end: frame.right() - if extend.has_max() { cap } else { 0.0 },
            cross0: frame.bottom() + fs * 4.5,
            thickness,
            cap,
        }
    } else {
        BarGeometry {
            start: frame.bottom() - if extend.has_min() { cap } else { 0.0 },
            end: frame.top + if extend.has_max() { cap } else { 0.0 },
            cross0: frame.right() + fs * 1.5,
            thickness,
            cap,
        }
    };

    let to_xy = |along: f32, across: f32| -> (f32, f32) {
        if horizontal {
            (along, geo.cross0 + across)
        } else {
            (geo.cross0 + across, along)
        }
    };

    let mut fill = |points: &[(f32, f32)], color: Color| {
        let mut pb = PathBuilder::new();
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            pb.move_to(x, y);
        }
        for &(x, y) in iter {
            pb.line_to(x, y);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color(color.to_skia());
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            let (paint, stroke) = stroke_paint(Color::BLACK, 0.8);
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    };

    let offset = usize::from(extend.has_min());
    let n = scheme.interior_bands();
    let step = (geo.end - geo.start) / n as f32;
    for band in 0..n {
        let a = geo.start + band as f32 * step;
        let b = a + step;
        let quad = [to_xy(a, 0.0), to_xy(b, 0.0), to_xy(b, geo.thickness), to_xy(a, geo.thickness)];
        fill(&quad, colors[offset + band]);
    }
    if extend.has_min() {
        let tip = geo.start - (geo.end - geo.start).signum() * geo.cap;
        let tri = [to_xy(geo.start, 0.0), to_xy(geo.start, geo.thickness), to_xy(tip, geo.thickness / 2.0)];
        fill(&tri, colors[0]);
    }
    if extend.has_max() {
        let tip = geo.end + (geo.end - geo.start).signum() * geo.cap;
        let tri = [to_xy(geo.end, 0.0), to_xy(geo.end, geo.thickness), to_xy(tip, geo.thickness / 2.0)];
        fill(&tri, colors[colors.len() - 1]);
    }

    // Ticks
    let values: Vec<f64> = match &config.colorbar.ticks {
        Some(ticks) => ticks.clone(),
        None => {
            let levels = scheme.levels();
            let widest = levels
                .iter()
                .map(|&l| text_width(&format_tick(l), fs))
                .fold(0.0f32, f32::max);
            let room = if horizontal { widest + fs } else { fs * 1.5 };
            let every = ((room / step.abs()).ceil() as usize).max(1);
            levels.iter().copied().step_by(every).collect()
        }
    };

    let style = TextStyle::new(fs);
    let tick_len = fs * 0.4;
    for v in values {
        let Some(along) = geo.position(scheme, v) else {
            continue;
        };
        let label = format_tick(v);
        if horizontal {
            let y = geo.cross0 + geo.thickness;
            line(pixmap, (along, y), (along, y + tick_len), Color::BLACK, 1.0);
            draw_text(pixmap, along, y + fs * 1.2, &label, &style.anchor(Anchor::Middle));
        } else {
            let x = geo.cross0 + geo.thickness;
            line(pixmap, (x, along), (x + tick_len, along), Color::BLACK, 1.0);
            draw_text(pixmap, x + fs * 0.8, along, &label, &style);
        }
    }

    if let Some(label) = &config.colorbar.label {
        if horizontal {
            let style = style.anchor(Anchor::Middle);
            let y = geo.cross0 + geo.thickness + fs * 3.0;
            draw_text(pixmap, frame.left + frame.width / 2.0, y, label, &style);
        } else {
            // Reads top to bottom
            let style = style
                .anchor(Anchor::Middle)
                .rotated(std::f32::consts::FRAC_PI_2);
            let x = geo.cross0 + geo.thickness + fs * 5.5;
            draw_text(pixmap, x, frame.top + frame.height / 2.0, label, &style);
        }
    }
}
