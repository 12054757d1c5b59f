//! Stroke-font text for axis labels, ticks and titles.
//!
//! Glyphs are polylines on a 4×6 design grid (x right, y down, baseline at
//! y = 6) stroked with tiny-skia, so no font files are needed. Lowercase
//! letters are drawn as capitals.

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::colormap::Color;

/// Horizontal anchoring of a text run relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    /// Nominal font size in pixels
    pub size: f32,
    pub color: Color,
    pub anchor: Anchor,
    /// Rotation in radians, clockwise on screen
    pub angle: f32,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            color: Color::BLACK,
            anchor: Anchor::Start,
            angle: 0.0,
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn rotated(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }
}

type Stroke2 = &'static [(f32, f32)];

fn glyph(ch: char) -> &'static [Stroke2] {
    const OVAL: Stroke2 = &[
        (1.0, 0.0),
        (3.0, 0.0),
        (4.0, 1.0),
        (4.0, 5.0),
        (3.0, 6.0),
        (1.0, 6.0),
        (0.0, 5.0),
        (0.0, 1.0),
        (1.0, 0.0),
    ];

    match ch.to_ascii_uppercase() {
        '0' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 0.0)]],
        '1' => &[&[(1.0, 1.0), (2.0, 0.0), (2.0, 6.0)], &[(1.0, 6.0), (3.0, 6.0)]],
        '2' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (0.0, 6.0), (4.0, 6.0)]],
        '3' => &[&[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0)], &[(1.0, 3.0), (4.0, 3.0)]],
        '4' => &[&[(0.0, 0.0), (0.0, 3.0), (4.0, 3.0)], &[(4.0, 0.0), (4.0, 6.0)]],
        '5' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 3.0), (4.0, 3.0), (4.0, 6.0), (0.0, 6.0)]],
        '6' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0), (4.0, 3.0), (0.0, 3.0)]],
        '7' => &[&[(0.0, 0.0), (4.0, 0.0), (2.0, 6.0)]],
        '8' => &[
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 0.0)],
            &[(0.0, 3.0), (4.0, 3.0)],
        ],
        '9' => &[&[(4.0, 3.0), (0.0, 3.0), (0.0, 0.0), (4.0, 0.0), (4.0, 6.0), (0.0, 6.0)]],
        'A' => &[&[(0.0, 6.0), (2.0, 0.0), (4.0, 6.0)], &[(0.8, 3.6), (3.2, 3.6)]],
        'B' => &[
            &[(0.0, 0.0), (0.0, 6.0), (3.0, 6.0), (4.0, 5.0), (4.0, 4.0), (3.0, 3.0), (0.0, 3.0)],
            &[(0.0, 0.0), (3.0, 0.0), (4.0, 1.0), (4.0, 2.0), (3.0, 3.0)],
        ],
        'C' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0)]],
        'D' => &[&[(0.0, 0.0), (0.0, 6.0), (3.0, 6.0), (4.0, 4.5), (4.0, 1.5), (3.0, 0.0), (0.0, 0.0)]],
        'E' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0)], &[(0.0, 3.0), (3.0, 3.0)]],
        'F' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0)], &[(0.0, 3.0), (3.0, 3.0)]],
        'G' => &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0), (4.0, 3.0), (2.0, 3.0)]],
        'H' => &[&[(0.0, 0.0), (0.0, 6.0)], &[(4.0, 0.0), (4.0, 6.0)], &[(0.0, 3.0), (4.0, 3.0)]],
        'I' => &[&[(1.0, 0.0), (3.0, 0.0)], &[(2.0, 0.0), (2.0, 6.0)], &[(1.0, 6.0), (3.0, 6.0)]],
        'J' => &[&[(4.0, 0.0), (4.0, 6.0), (0.0, 6.0), (0.0, 4.0)]],
        'K' => &[&[(0.0, 0.0), (0.0, 6.0)], &[(4.0, 0.0), (0.0, 3.0), (4.0, 6.0)]],
        'L' => &[&[(0.0, 0.0), (0.0, 6.0), (4.0, 6.0)]],
        'M' => &[&[(0.0, 6.0), (0.0, 0.0), (2.0, 3.0), (4.0, 0.0), (4.0, 6.0)]],
        'N' => &[&[(0.0, 6.0), (0.0, 0.0), (4.0, 6.0), (4.0, 0.0)]],
        'O' => &[OVAL],
        'P' => &[&[(0.0, 6.0), (0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)]],
        'Q' => &[OVAL, &[(2.5, 4.5), (4.0, 6.5)]],
        'R' => &[&[(0.0, 6.0), (0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (4.0, 6.0)]],
        'S' => &[&[
            (4.0, 1.0),
            (3.0, 0.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (0.0, 2.0),
            (1.0, 3.0),
            (3.0, 3.0),
            (4.0, 4.0),
            (4.0, 5.0),
            (3.0, 6.0),
            (1.0, 6.0),
            (0.0, 5.0),
        ]],
        'T' => &[&[(0.0, 0.0), (4.0, 0.0)], &[(2.0, 0.0), (2.0, 6.0)]],
        'U' => &[&[(0.0, 0.0), (0.0, 6.0), (4.0, 6.0), (4.0, 0.0)]],
        'V' => &[&[(0.0, 0.0), (2.0, 6.0), (4.0, 0.0)]],
        'W' => &[&[(0.0, 0.0), (1.0, 6.0), (2.0, 3.0), (3.0, 6.0), (4.0, 0.0)]],
        'X' => &[&[(0.0, 0.0), (4.0, 6.0)], &[(4.0, 0.0), (0.0, 6.0)]],
        'Y' => &[&[(0.0, 0.0), (2.0, 3.0), (4.0, 0.0)], &[(2.0, 3.0), (2.0, 6.0)]],
        'Z' => &[&[(0.0, 0.0), (4.0, 0.0), (0.0, 6.0), (4.0, 6.0)]],
        '-' => &[&[(0.5, 3.0), (3.5, 3.0)]],
        '+' => &[&[(0.0, 3.0), (4.0, 3.0)], &[(2.0, 1.0), (2.0, 5.0)]],
        '=' => &[&[(0.0, 2.0), (4.0, 2.0)], &[(0.0, 4.0), (4.0, 4.0)]],
        '.' => &[&[(2.0, 5.6), (2.0, 6.0)]],
        ',' => &[&[(2.0, 5.5), (1.5, 7.0)]],
        ':' => &[&[(2.0, 1.6), (2.0, 2.0)], &[(2.0, 4.6), (2.0, 5.0)]],
        '/' => &[&[(0.0, 6.0), (4.0, 0.0)]],
        '_' => &[&[(0.0, 6.5), (4.0, 6.5)]],
        '^' => &[&[(1.0, 2.0), (2.0, 0.0), (3.0, 2.0)]],
        '(' => &[&[(3.0, 0.0), (1.5, 1.5), (1.5, 4.5), (3.0, 6.0)]],
        ')' => &[&[(1.0, 0.0), (2.5, 1.5), (2.5, 4.5), (1.0, 6.0)]],
        '%' => &[
            &[(0.0, 6.0), (4.0, 0.0)],
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)],
            &[(3.0, 5.0), (4.0, 5.0), (4.0, 6.0), (3.0, 6.0), (3.0, 5.0)],
        ],
        '°' => &[&[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 0.0)]],
        _ => &[],
    }
}

fn glyph_width(size: f32) -> f32 {
    size * 0.6
}

fn advance(size: f32) -> f32 {
    glyph_width(size) + size * 0.2
}

/// Width in pixels of `text` at `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    let n = text.chars().count();
    if n == 0 {
        return 0.0;
    }
    n as f32 * advance(size) - size * 0.2
}

/// Draw `text` with its vertical center on `(x, y)`.
pub fn draw_text(pixmap: &mut Pixmap, x: f32, y: f32, text: &str, style: &TextStyle) {
    if text.is_empty() {
        return;
    }

    let size = style.size;
    let width = text_width(text, size);
    let cap_height = size * 0.75;
    let start_x = match style.anchor {
        Anchor::Start => 0.0,
        Anchor::Middle => -width / 2.0,
        Anchor::End => -width,
    };

    let transform = Transform::from_rotate(style.angle.to_degrees()).post_translate(x, y);

    let mut pb = PathBuilder::new();
    for (i, ch) in text.chars().enumerate() {
        let origin = start_x + i as f32 * advance(size);
        for stroke in glyph(ch) {
            let to_local = |&(gx, gy): &(f32, f32)| {
                (
                    origin + gx / 4.0 * glyph_width(size),
                    (gy / 6.0 - 0.5) * cap_height,
                )
            };
            let mut points = stroke.iter().map(to_local);
            if let Some((px, py)) = points.next() {
                pb.move_to(px, py);
                for (px, py) in points {
                    pb.line_to(px, py);
                }
            }
        }
    }

    let Some(path) = pb.finish() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(style.color.to_skia());
    paint.anti_alias = true;

    let stroke = Stroke {
        width: (size * 0.09).max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
}
