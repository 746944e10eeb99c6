//! Product-mix bar chart with rounded bars and text labels.

use super::{palette, Paint, Path, Surface, TextStyle};
use crate::format::format_percent;
use crate::model::ProductSegment;

pub const BAR_GAP: f64 = 20.0;
/// Vertical space reserved for the labels above and below the bars.
pub const VERTICAL_RESERVE: f64 = 40.0;
pub const BASELINE_OFFSET: f64 = 20.0;
pub const LEFT_INSET: f64 = 10.0;
pub const CORNER_RADIUS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BarRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Bottom-anchored bars in input order, spaced by `BAR_GAP`.
pub fn bar_layout(mix: &[ProductSegment], width: f64, height: f64) -> Vec<BarRect> {
    if mix.is_empty() {
        return Vec::new();
    }
    let bar_width = (width / mix.len() as f64 - BAR_GAP).max(0.0);
    mix.iter()
        .enumerate()
        .map(|(i, segment)| {
            let bar_height = segment.ratio * (height - VERTICAL_RESERVE);
            BarRect {
                x: i as f64 * (bar_width + BAR_GAP) + LEFT_INSET,
                y: height - bar_height - BASELINE_OFFSET,
                width: bar_width,
                height: bar_height,
            }
        })
        .collect()
}

/// Closed rectangle with quadratic corners, traced clockwise from the top
/// edge. The radius shrinks to fit rectangles smaller than `2 * radius`.
pub fn rounded_rect_path(x: f64, y: f64, width: f64, height: f64, radius: f64) -> Path {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    let mut p = Path::new();
    p.move_to(x + r, y)
        .line_to(x + width - r, y)
        .quad_to(x + width, y, x + width, y + r)
        .line_to(x + width, y + height - r)
        .quad_to(x + width, y + height, x + width - r, y + height)
        .line_to(x + r, y + height)
        .quad_to(x, y + height, x, y + height - r)
        .line_to(x, y + r)
        .quad_to(x, y, x + r, y)
        .close();
    p
}

fn bar_color(index: usize) -> super::Color {
    if index % 2 == 0 {
        palette::ORANGE
    } else {
        palette::SKY
    }
}

/// Clears `surface` and paints one labelled bar per segment.
pub fn draw_bar_chart(surface: &mut dyn Surface, mix: &[ProductSegment]) {
    let width = surface.width();
    let height = surface.height();
    surface.clear(0.0, 0.0, width, height);

    let label_style = TextStyle {
        color: palette::LABEL,
        size_px: 12.0,
        bold: false,
    };
    let value_style = TextStyle {
        color: palette::VALUE,
        size_px: 13.0,
        bold: true,
    };

    for (i, (segment, bar)) in mix.iter().zip(bar_layout(mix, width, height)).enumerate() {
        let path = rounded_rect_path(bar.x, bar.y, bar.width, bar.height, CORNER_RADIUS);
        surface.fill_path(&path, &Paint::Solid { color: bar_color(i) });
        surface.draw_text(&segment.label, bar.x, height - 6.0, &label_style);
        surface.draw_text(&format_percent(segment.ratio), bar.x, bar.y - 8.0, &value_style);
    }
}
