//! 2D chart rendering onto an abstract raster surface.
//!
//! ```text
//! DashboardSnapshot ──► line::draw_line_chart ──┐
//!                   └─► bar::draw_bar_chart  ───┴──► dyn Surface
//!                                                    ├─ RecordingSurface (commands)
//!                                                    └─ SvgSurface (document)
//! ```
//!
//! Renderers are stateless: every call clears the whole surface and paints
//! from scratch.

pub mod bar;
pub mod line;
pub mod recorder;
pub mod svg;

use serde::{Deserialize, Serialize};

pub use bar::draw_bar_chart;
pub use line::draw_line_chart;
pub use recorder::{DrawCommand, RecordingSurface};
pub use svg::SvgSurface;

/// RGB with a float alpha, matching CSS `rgba()` semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

pub mod palette {
    use super::Color;

    pub const SKY: Color = Color::rgb(0x38, 0xbd, 0xf8);
    pub const ORANGE: Color = Color::rgb(0xf9, 0x73, 0x16);
    pub const GRID: Color = Color::rgba(148, 163, 184, 0.4);
    pub const AREA_TOP: Color = Color::rgba(56, 189, 248, 0.35);
    pub const AREA_BOTTOM: Color = Color::rgba(15, 23, 42, 0.0);
    pub const LABEL: Color = Color::rgb(0x94, 0xa3, 0xb8);
    pub const VALUE: Color = Color::rgb(0xe2, 0xe8, 0xf0);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathOp {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.ops.push(PathOp::MoveTo { x, y });
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.ops.push(PathOp::LineTo { x, y });
        self
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) -> &mut Self {
        self.ops.push(PathOp::QuadTo { cx, cy, x, y });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.ops.push(PathOp::Close);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// End points of every op, in order. Control points are excluded.
    pub fn vertices(&self) -> Vec<(f64, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                PathOp::MoveTo { x, y } | PathOp::LineTo { x, y } | PathOp::QuadTo { x, y, .. } => {
                    Some((x, y))
                }
                PathOp::Close => None,
            })
            .collect()
    }

    /// SVG path data (`d` attribute).
    pub fn svg_data(&self) -> String {
        let parts: Vec<String> = self
            .ops
            .iter()
            .map(|op| match *op {
                PathOp::MoveTo { x, y } => format!("M{:.2} {:.2}", x, y),
                PathOp::LineTo { x, y } => format!("L{:.2} {:.2}", x, y),
                PathOp::QuadTo { cx, cy, x, y } => {
                    format!("Q{:.2} {:.2} {:.2} {:.2}", cx, cy, x, y)
                }
                PathOp::Close => "Z".to_string(),
            })
            .collect();
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Paint {
    Solid { color: Color },
    /// Linear gradient between two points in surface coordinates; stops are
    /// `(offset in [0,1], color)`.
    LinearGradient {
        from: (f64, f64),
        to: (f64, f64),
        stops: Vec<(f64, Color)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    /// Dash pattern; empty means solid.
    pub dash: Vec<f64>,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Vec::new(),
        }
    }

    pub fn dashed(color: Color, width: f64, dash: &[f64]) -> Self {
        Self {
            color,
            width,
            dash: dash.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color,
    pub size_px: f64,
    pub bold: bool,
}

/// Fixed-size raster drawing target.
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle);
    fn fill_path(&mut self, path: &Path, paint: &Paint);
    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}
