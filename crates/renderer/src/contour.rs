//! Contour levels, band classification and isolines.
//!
//! Filled contours color each sample by the band its value falls in:
//! band `i` covers `levels[i] <= v < levels[i + 1]`. Extension bands
//! catch values below the first or at/above the last level when the
//! [`Extend`] mode asks for them; otherwise such values stay unfilled.
//! Band edges can additionally be traced as isolines with marching squares.

use mpas_common::{MpasError, MpasResult};
use serde::{Deserialize, Serialize};

use crate::colormap::{Color, Colormap};

/// Levels `start, start + step, ...` strictly below `stop`.
///
/// Count and values match a half-open arange: `ceil((stop - start) / step)`
/// values, each computed as `start + i * step`.
pub fn arange_levels(start: f64, stop: f64, step: f64) -> MpasResult<Vec<f64>> {
    if ![start, stop, step].iter().all(|v| v.is_finite()) || step <= 0.0 || stop <= start {
        return Err(MpasError::InvalidLevels(format!(
            "range start={} stop={} step={}",
            start, stop, step
        )));
    }
    let n = ((stop - start) / step).ceil() as usize;
    Ok((0..n).map(|i| start + i as f64 * step).collect())
}

/// Which out-of-range sides get their own colored band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extend {
    #[default]
    Neither,
    Min,
    Max,
    Both,
}

impl Extend {
    pub fn has_min(self) -> bool {
        matches!(self, Extend::Min | Extend::Both)
    }

    pub fn has_max(self) -> bool {
        matches!(self, Extend::Max | Extend::Both)
    }
}

/// Discrete levels plus extension mode.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScheme {
    levels: Vec<f64>,
    extend: Extend,
}

impl BandScheme {
    /// Levels must be finite, strictly increasing, and at least two.
    pub fn new(levels: Vec<f64>, extend: Extend) -> MpasResult<Self> {
        if levels.len() < 2 {
            return Err(MpasError::InvalidLevels(format!(
                "need at least two levels, got {}",
                levels.len()
            )));
        }
        if levels.iter().any(|l| !l.is_finite()) {
            return Err(MpasError::InvalidLevels("non-finite level".to_string()));
        }
        if levels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MpasError::InvalidLevels(
                "levels must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { levels, extend })
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn extend(&self) -> Extend {
        self.extend
    }

    /// Bands between levels, excluding extensions.
    pub fn interior_bands(&self) -> usize {
        self.levels.len() - 1
    }

    /// All bands, extensions included.
    pub fn n_bands(&self) -> usize {
        self.interior_bands()
            + usize::from(self.extend.has_min())
            + usize::from(self.extend.has_max())
    }

    /// Band index of `value`, counting a lower extension band as 0.
    ///
    /// `None` for NaN and for out-of-range values on a side that is not
    /// extended.
    pub fn classify(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let offset = usize::from(self.extend.has_min());
        let first = self.levels[0];
        let last = self.levels[self.levels.len() - 1];

        if value < first {
            return self.extend.has_min().then_some(0);
        }
        if value >= last {
            return self.extend.has_max().then_some(offset + self.interior_bands());
        }
        let i = self.levels.partition_point(|&l| l <= value) - 1;
        Some(offset + i)
    }

    /// One color per band, sampled evenly across the colormap.
    pub fn colors(&self, colormap: &Colormap) -> Vec<Color> {
        colormap.discrete(self.n_bands())
    }
}

/// A point in 2D space (grid index or pixel coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A complete contour line (polyline)
#[derive(Debug, Clone)]
pub struct Contour {
    pub level: f64,
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Marching squares over a row-major grid.
///
/// Segment points are in grid index coordinates: `x` is the column, `y`
/// the row. Cells touching a NaN are skipped.
pub fn march_squares(data: &[f64], width: usize, height: usize, level: f64) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            segments.extend(get_cell_segments(
                cell_index,
                x as f32,
                y as f32,
                [tl, tr, br, bl],
                level,
            ));
        }
    }

    segments
}

/// Segments for one marching squares cell, corners ordered tl, tr, br, bl.
fn get_cell_segments(cell_index: u8, x: f32, y: f32, corners: [f64; 4], level: f64) -> Vec<Segment> {
    let [tl, tr, br, bl] = corners;
    let top = interpolate_edge((x, y), (x + 1.0, y), tl, tr, level);
    let right = interpolate_edge((x + 1.0, y), (x + 1.0, y + 1.0), tr, br, level);
    let bottom = interpolate_edge((x, y + 1.0), (x + 1.0, y + 1.0), bl, br, level);
    let left = interpolate_edge((x, y), (x, y + 1.0), tl, bl, level);

    let seg = |start, end| Segment { start, end };
    match cell_index {
        0 | 15 => vec![],
        1 | 14 => vec![seg(left, top)],
        2 | 13 => vec![seg(top, right)],
        3 | 12 => vec![seg(left, right)],
        4 | 11 => vec![seg(right, bottom)],
        5 => vec![seg(left, top), seg(right, bottom)],
        6 | 9 => vec![seg(top, bottom)],
        7 | 8 => vec![seg(left, bottom)],
        10 => vec![seg(top, right), seg(left, bottom)],
        _ => vec![],
    }
}

/// Linearly interpolate where `level` crosses the edge from `p1` to `p2`.
fn interpolate_edge(p1: (f32, f32), p2: (f32, f32), val1: f64, val2: f64, level: f64) -> Point {
    if (val2 - val1).abs() < 1e-12 {
        return Point::new((p1.0 + p2.0) / 2.0, (p1.1 + p2.1) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0) as f32;
    Point::new(p1.0 + t * (p2.0 - p1.0), p1.1 + t * (p2.1 - p1.1))
}

fn distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Connect unordered segments into polylines.
pub fn connect_segments(segments: Vec<Segment>) -> Vec<Contour> {
    let mut contours = Vec::new();
    let mut used = vec![false; segments.len()];
    let epsilon = 0.001;

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }

        let mut points = vec![segments[start_idx].start, segments[start_idx].end];
        used[start_idx] = true;

        let mut current_end = segments[start_idx].end;
        loop {
            let next = segments.iter().enumerate().find_map(|(i, seg)| {
                if used[i] {
                    None
                } else if distance(seg.start, current_end) < epsilon {
                    Some((i, seg.end))
                } else if distance(seg.end, current_end) < epsilon {
                    Some((i, seg.start))
                } else {
                    None
                }
            });
            match next {
                Some((i, point)) => {
                    used[i] = true;
                    points.push(point);
                    current_end = point;
                }
                None => break,
            }
        }

        let closed = distance(points[0], current_end) < epsilon;
        contours.push(Contour {
            level: 0.0,
            points,
            closed,
        });
    }

    contours
}

/// Isolines at every level of a row-major grid, in grid index coordinates.
pub fn generate_all_contours(
    data: &[f64],
    width: usize,
    height: usize,
    levels: &[f64],
) -> Vec<Contour> {
    let mut all_contours = Vec::new();

    for &level in levels {
        let mut contours = connect_segments(march_squares(data, width, height, level));
        for contour in &mut contours {
            contour.level = level;
        }
        all_contours.extend(contours);
    }

    tracing::debug!(
        levels = levels.len(),
        contours = all_contours.len(),
        points = all_contours.iter().map(|c| c.points.len()).sum::<usize>(),
        "Generated band edges"
    );
    all_contours
}
