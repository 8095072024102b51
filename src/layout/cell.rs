//! Cell sizing: wrapped lines and required height for one cell at one
//! column width.

use crate::font::FontKey;
use crate::model::{Color, TableOptions, TextAlign};
use crate::surface::Surface;
use crate::text::{wrap_with_fallback, CellText, Line, TextMeasurer};

/// A measured cell, carrying everything the painter needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub text: CellText,
    pub font_size: f64,
    /// Height this cell needs, padding included. The row may be taller.
    pub height: f64,
    pub align: TextAlign,
    pub color: Color,
    pub background: Option<Color>,
}

impl CellLayout {
    pub fn lines(&self) -> &[Line] {
        self.text.lines()
    }
}

/// Height of a block of `line_count` lines, padding included.
pub fn cell_height(line_count: usize, font_size: f64, line_height: f64, padding: f64) -> f64 {
    line_count.max(1) as f64 * font_size * line_height + 2.0 * padding
}

/// Wraps cell text against a column width and reports the height it needs.
pub struct CellSizer<'a> {
    surface: &'a dyn Surface,
    padding: f64,
    line_height: f64,
    placeholder: &'a str,
}

impl<'a> CellSizer<'a> {
    pub fn new(surface: &'a dyn Surface, options: &'a TableOptions) -> Self {
        Self {
            surface,
            padding: options.padding,
            line_height: options.line_height,
            placeholder: &options.placeholder,
        }
    }

    /// Wrapped lines and height for `text` in a column `column_width` wide.
    ///
    /// Blank text needs one bare font-size line. With `wrap` off every
    /// paragraph stays on a single line however wide it is.
    pub fn size(
        &self,
        text: &str,
        font: &FontKey,
        font_size: f64,
        column_width: f64,
        wrap: bool,
    ) -> (CellText, f64) {
        if text.trim().is_empty() {
            let blank = CellText::Measured(vec![Line {
                text: String::new(),
                width: 0.0,
            }]);
            return (blank, font_size + 2.0 * self.padding);
        }

        let measurer = TextMeasurer::new(self.surface, font, font_size);
        let max_width = if wrap {
            column_width - 2.0 * self.padding
        } else {
            f64::INFINITY
        };
        let wrapped = wrap_with_fallback(&measurer, text, max_width, self.placeholder);
        let height = cell_height(
            wrapped.lines().len(),
            font_size,
            self.line_height,
            self.padding,
        );
        (wrapped, height)
    }
}
