//! # Drawing Surface
//!
//! The narrow capability the table engine paints onto. A surface measures
//! text and accepts fill, stroke and glyph-run calls on a page whose origin
//! is the bottom-left corner with Y growing upward. Every call paints over
//! what is already there.
//!
//! [`RecordingSurface`] keeps the calls in a list instead of painting them,
//! which is what the tests and the `--draw-calls` CLI mode use.

use crate::error::GlyphEncodingError;
use crate::font::{FontContext, FontKey};
use crate::model::Color;
use serde::Serialize;

/// Stroke parameters for outlines and lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// An axis-aligned rectangle; `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub trait Surface {
    fn page_width(&self) -> f64;

    fn page_height(&self) -> f64;

    /// Width of `text` set in `font` at `size`, in points.
    fn measure_text(&self, text: &str, font: &FontKey, size: f64)
        -> Result<f64, GlyphEncodingError>;

    /// Draw a single line of text with its baseline starting at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: &FontKey, size: f64, color: Color);

    /// Fill and/or stroke a rectangle.
    fn draw_rectangle(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>);

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCall {
    Text {
        text: String,
        x: f64,
        y: f64,
        font: FontKey,
        size: f64,
        color: Color,
    },
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
}

impl DrawCall {
    pub fn is_text(&self) -> bool {
        matches!(self, DrawCall::Text { .. })
    }
}

/// A surface that measures with a [`FontContext`] and records every call.
#[derive(Debug)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    fonts: FontContext,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_fonts(width, height, FontContext::new())
    }

    pub fn with_fonts(width: f64, height: f64, fonts: FontContext) -> Self {
        Self {
            width,
            height,
            fonts,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<DrawCall> {
        self.calls
    }

    pub fn fonts_mut(&mut self) -> &mut FontContext {
        &mut self.fonts
    }

    /// Text of every recorded glyph run, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn page_width(&self) -> f64 {
        self.width
    }

    fn page_height(&self) -> f64 {
        self.height
    }

    fn measure_text(
        &self,
        text: &str,
        font: &FontKey,
        size: f64,
    ) -> Result<f64, GlyphEncodingError> {
        self.fonts.measure_string(text, font, size)
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: &FontKey, size: f64, color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
            size,
            color,
        });
    }

    fn draw_rectangle(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>) {
        self.calls.push(DrawCall::Rect { rect, fill, stroke });
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
        self.calls.push(DrawCall::Line { from, to, stroke });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface_records_in_order() {
        let mut s = RecordingSurface::new(595.0, 842.0);
        let stroke = Stroke {
            color: Color::BLACK,
            width: 1.0,
        };
        s.draw_rectangle(
            Rect {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            },
            Some(Color::WHITE),
            None,
        );
        s.draw_line((0.0, 0.0), (10.0, 0.0), stroke);
        s.draw_text("Hi", 1.0, 2.0, &FontKey::regular("Helvetica"), 9.0, Color::BLACK);

        assert_eq!(s.calls().len(), 3);
        assert!(!s.calls()[0].is_text());
        assert!(s.calls()[2].is_text());
        assert_eq!(s.texts(), vec!["Hi"]);
    }

    #[test]
    fn test_draw_calls_serialize_with_op_tag() {
        let call = DrawCall::Line {
            from: (0.0, 1.0),
            to: (2.0, 1.0),
            stroke: Stroke {
                color: Color::BLACK,
                width: 0.5,
            },
        };
        let json = serde_json::to_string(&call).unwrap();
        assert!(json.starts_with(r#"{"op":"line""#));
    }
}
