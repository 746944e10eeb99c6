use anyhow::{Context, Result};
use std::fs;
use std::path::Path as FsPath;

use super::{Paint, Path, StrokeStyle, Surface, TextStyle};

/// Surface that renders into a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    defs: Vec<String>,
    body: Vec<String>,
    next_gradient: usize,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            body: Vec::new(),
            next_gradient: 0,
        }
    }

    pub fn document(&self) -> String {
        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = self.width,
            h = self.height
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                out.push_str(d);
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }
        for el in &self.body {
            out.push_str(el);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    /// Writes the document to `path`, returning the number of bytes written.
    pub fn write_to(&self, path: &FsPath) -> Result<usize> {
        let doc = self.document();
        fs::write(path, &doc).with_context(|| format!("writing {}", path.display()))?;
        Ok(doc.len())
    }

    fn paint_ref(&mut self, paint: &Paint) -> String {
        match paint {
            Paint::Solid { color } => color.css(),
            Paint::LinearGradient { from, to, stops } => {
                let id = format!("g{}", self.next_gradient);
                self.next_gradient += 1;
                let stops: String = stops
                    .iter()
                    .map(|(offset, color)| {
                        format!(
                            "<stop offset=\"{}\" stop-color=\"rgb({},{},{})\" stop-opacity=\"{}\"/>",
                            offset, color.r, color.g, color.b, color.a
                        )
                    })
                    .collect();
                self.defs.push(format!(
                    "<linearGradient id=\"{}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">{}</linearGradient>",
                    id, from.0, from.1, to.0, to.1, stops
                ));
                format!("url(#{})", id)
            }
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Surface for SvgSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64) {
        // Only full-surface clears are representable; the chart renderers
        // never issue partial ones.
        if x <= 0.0 && y <= 0.0 && width >= self.width && height >= self.height {
            self.defs.clear();
            self.body.clear();
            self.next_gradient = 0;
        }
    }

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle) {
        let dash = if style.dash.is_empty() {
            String::new()
        } else {
            let parts: Vec<String> = style.dash.iter().map(|d| d.to_string()).collect();
            format!(" stroke-dasharray=\"{}\"", parts.join(","))
        };
        self.body.push(format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"{}/>",
            path.svg_data(),
            style.color.css(),
            style.width,
            dash
        ));
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        let fill = self.paint_ref(paint);
        self.body.push(format!("<path d=\"{}\" fill=\"{}\"/>", path.svg_data(), fill));
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        let weight = if style.bold { " font-weight=\"bold\"" } else { "" };
        self.body.push(format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" fill=\"{}\" font-size=\"{}px\" font-family=\"Segoe UI, sans-serif\"{}>{}</text>",
            x,
            y,
            style.color.css(),
            style.size_px,
            weight,
            escape(text)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{draw_bar_chart, draw_line_chart};
    use crate::model::RevenuePoint;
    use crate::simulate::normalize_mix;

    #[test]
    fn test_line_chart_document() {
        let mut svg = SvgSurface::new(600.0, 200.0);
        let series: Vec<RevenuePoint> = (1..=5)
            .map(|day| RevenuePoint { day, value: 150.0 + day as f64 })
            .collect();
        draw_line_chart(&mut svg, &series);
        let doc = svg.document();
        assert!(doc.starts_with("<svg"));
        assert!(doc.contains("linearGradient id=\"g0\""));
        assert!(doc.contains("stroke-dasharray=\"4,6\""));
        assert!(doc.contains("fill=\"url(#g0)\""));
    }

    #[test]
    fn test_repaint_resets_gradients() {
        let mut svg = SvgSurface::new(600.0, 200.0);
        let series = vec![RevenuePoint { day: 1, value: 150.0 }, RevenuePoint { day: 2, value: 160.0 }];
        draw_line_chart(&mut svg, &series);
        draw_line_chart(&mut svg, &series);
        assert!(!svg.document().contains("id=\"g1\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut svg = SvgSurface::new(420.0, 260.0);
        let mix = normalize_mix(&[("R&D", 1.0), ("<Ops>", 1.0)]);
        draw_bar_chart(&mut svg, &mix);
        let doc = svg.document();
        assert!(doc.contains("R&amp;D"));
        assert!(doc.contains("&lt;Ops&gt;"));
        assert!(doc.contains("50.0%"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chart.svg");
        let bytes = SvgSurface::new(10.0, 10.0).write_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(bytes, written.len());
        assert!(written.contains("</svg>"));
    }
}
