use serde::{Deserialize, Serialize};

use super::{Paint, Path, StrokeStyle, Surface, TextStyle};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Stroke {
        path: Path,
        style: StrokeStyle,
    },
    Fill {
        path: Path,
        paint: Paint,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
}

/// Surface that keeps the drawing calls of the current frame. Clearing the
/// whole surface discards everything recorded before it.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "width": self.width,
            "height": self.height,
            "commands": self.commands,
        })
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if x <= 0.0 && y <= 0.0 && width >= self.width && height >= self.height {
            self.commands.clear();
        }
        self.commands.push(DrawCommand::Clear {
            x,
            y,
            width,
            height,
        });
    }

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            style: style.clone(),
        });
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            paint: paint.clone(),
        });
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            style: style.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette;

    #[test]
    fn test_partial_clear_keeps_history() {
        let mut s = RecordingSurface::new(100.0, 50.0);
        s.fill_path(&Path::new(), &Paint::Solid { color: palette::SKY });
        s.clear(10.0, 10.0, 20.0, 20.0);
        assert_eq!(s.commands().len(), 2);
        s.clear(0.0, 0.0, 100.0, 50.0);
        assert_eq!(s.commands().len(), 1);
    }

    #[test]
    fn test_json_tags_commands() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        s.clear(0.0, 0.0, 10.0, 10.0);
        let json = s.to_json();
        assert_eq!(json["commands"][0]["cmd"], "clear");
    }
}
