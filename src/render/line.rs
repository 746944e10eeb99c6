//! Revenue line chart with dashed gridlines and a gradient area fill.

use super::{palette, Paint, Path, StrokeStyle, Surface};
use crate::model::RevenuePoint;

/// Headroom added above the max and below the min value.
pub const VALUE_PADDING: f64 = 10.0;
pub const GRIDLINES: usize = 3;
pub const LINE_WIDTH: f64 = 3.0;
const GRID_DASH: [f64; 2] = [4.0, 6.0];

/// Vertical scale of a chart: padded min/max and their span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueBounds {
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

impl ValueBounds {
    /// `None` for an empty series. A zero span is replaced by 1.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = lo - VALUE_PADDING;
        let max = hi + VALUE_PADDING;
        let range = if max - min == 0.0 { 1.0 } else { max - min };
        Some(Self { min, max, range })
    }
}

/// Maps series positions and values onto surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    pub bounds: ValueBounds,
    pub width: f64,
    pub height: f64,
}

impl LineGeometry {
    /// Leftmost point at 0, rightmost at `width`. A lone point sits at 0.
    pub fn x_at(&self, index: usize, count: usize) -> f64 {
        if count < 2 {
            return 0.0;
        }
        index as f64 / (count - 1) as f64 * self.width
    }

    /// Higher values map higher on the surface (smaller y).
    pub fn y_at(&self, value: f64) -> f64 {
        self.height - (value - self.bounds.min) / self.bounds.range * self.height
    }

    /// Pixel positions of the polyline. A single-point series is widened to a
    /// flat segment spanning the full width.
    pub fn map_points(&self, values: &[f64]) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (self.x_at(i, values.len()), self.y_at(*v)))
            .collect();
        if let [(_, y)] = points.as_slice() {
            let y = *y;
            points.push((self.width, y));
        }
        points
    }
}

pub fn gridline_ys(height: f64) -> [f64; GRIDLINES] {
    let step = height / (GRIDLINES + 1) as f64;
    [step, step * 2.0, step * 3.0]
}

/// Clears `surface` and paints the revenue trend.
pub fn draw_line_chart(surface: &mut dyn Surface, series: &[RevenuePoint]) {
    let width = surface.width();
    let height = surface.height();
    surface.clear(0.0, 0.0, width, height);

    let grid = StrokeStyle::dashed(palette::GRID, 1.0, &GRID_DASH);
    for y in gridline_ys(height) {
        let mut path = Path::new();
        path.move_to(0.0, y).line_to(width, y);
        surface.stroke_path(&path, &grid);
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let Some(bounds) = ValueBounds::from_values(&values) else {
        return;
    };
    let geometry = LineGeometry {
        bounds,
        width,
        height,
    };
    let points = geometry.map_points(&values);

    let mut line = Path::new();
    for (i, (x, y)) in points.iter().enumerate() {
        if i == 0 {
            line.move_to(*x, *y);
        } else {
            line.line_to(*x, *y);
        }
    }
    surface.stroke_path(&line, &StrokeStyle::solid(palette::SKY, LINE_WIDTH));

    let mut area = line.clone();
    area.line_to(width, height).line_to(0.0, height).close();
    let gradient = Paint::LinearGradient {
        from: (0.0, 0.0),
        to: (0.0, height),
        stops: vec![(0.0, palette::AREA_TOP), (1.0, palette::AREA_BOTTOM)],
    };
    surface.fill_path(&area, &gradient);
}
