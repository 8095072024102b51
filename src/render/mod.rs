//! # Table Painting
//!
//! Turns a measured [`TableLayout`] into surface calls. Painting runs as a
//! fixed sequence of passes, fills first, then strokes, then glyphs, so text
//! is never covered by a later fill or line:
//!
//! ```text
//! Background -> HeaderBackground -> RowBackgrounds -> Border
//!   -> ColumnSeparators -> RowSeparators -> HeaderText -> RowText -> Done
//! ```
//!
//! Rows run downward from `start_y`. Every pass folds over the row heights
//! from the same starting point, so no cursor is shared between passes.

use crate::layout::{CellLayout, RowLayout, TableLayout};
use crate::model::{TableOptions, TextAlign, VerticalAlign};
use crate::surface::{Rect, Stroke, Surface};

/// Baseline offset below the top of a line box, as a fraction of the font
/// size.
pub const BASELINE_RATIO: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Background,
    HeaderBackground,
    RowBackgrounds,
    Border,
    ColumnSeparators,
    RowSeparators,
    HeaderText,
    RowText,
    Done,
}

impl Pass {
    pub fn next(self) -> Pass {
        match self {
            Pass::Background => Pass::HeaderBackground,
            Pass::HeaderBackground => Pass::RowBackgrounds,
            Pass::RowBackgrounds => Pass::Border,
            Pass::Border => Pass::ColumnSeparators,
            Pass::ColumnSeparators => Pass::RowSeparators,
            Pass::RowSeparators => Pass::HeaderText,
            Pass::HeaderText => Pass::RowText,
            Pass::RowText | Pass::Done => Pass::Done,
        }
    }
}

pub struct TableRenderer<'a> {
    layout: &'a TableLayout,
    options: &'a TableOptions,
    start_y: f64,
}

impl<'a> TableRenderer<'a> {
    pub fn new(layout: &'a TableLayout, options: &'a TableOptions, start_y: f64) -> Self {
        Self {
            layout,
            options,
            start_y,
        }
    }

    /// Paint every pass and return the Y just below the table.
    pub fn paint(&self, surface: &mut dyn Surface) -> f64 {
        let mut pass = Pass::Background;
        while pass != Pass::Done {
            self.run(pass, surface);
            pass = pass.next();
        }
        self.end_y()
    }

    pub fn end_y(&self) -> f64 {
        self.start_y - self.layout.total_height()
    }

    fn run(&self, pass: Pass, surface: &mut dyn Surface) {
        match pass {
            Pass::Background => self.paint_background(surface),
            Pass::HeaderBackground => self.paint_header_background(surface),
            Pass::RowBackgrounds => self.paint_row_backgrounds(surface),
            Pass::Border => self.paint_border(surface),
            Pass::ColumnSeparators => self.paint_column_separators(surface),
            Pass::RowSeparators => self.paint_row_separators(surface),
            Pass::HeaderText => self.paint_text(surface, true),
            Pass::RowText => self.paint_text(surface, false),
            Pass::Done => {}
        }
    }

    /// Each row paired with the Y of its top edge.
    fn row_tops(&self) -> impl Iterator<Item = (f64, &'a RowLayout)> + '_ {
        self.layout.rows.iter().scan(self.start_y, |y, row| {
            let top = *y;
            *y -= row.height;
            Some((top, row))
        })
    }

    fn stroke(&self) -> Option<Stroke> {
        (self.options.border_width > 0.0).then_some(Stroke {
            color: self.options.border_color,
            width: self.options.border_width,
        })
    }

    fn band(&self, top: f64, height: f64) -> Rect {
        Rect {
            x: self.layout.x,
            y: top - height,
            width: self.layout.painted_width(),
            height,
        }
    }

    fn paint_background(&self, surface: &mut dyn Surface) {
        if let Some(fill) = self.options.background_color {
            let rect = self.band(self.start_y, self.layout.total_height());
            surface.draw_rectangle(rect, Some(fill), None);
        }
    }

    fn paint_header_background(&self, surface: &mut dyn Surface) {
        let Some(fill) = self.options.header_background_color else {
            return;
        };
        for (top, row) in self.row_tops().filter(|(_, r)| r.is_header()) {
            surface.draw_rectangle(self.band(top, row.height), Some(fill), None);
        }
    }

    fn paint_row_backgrounds(&self, surface: &mut dyn Surface) {
        let lefts = self.layout.column_lefts();
        for (top, row) in self.row_tops() {
            if let (Some(fill), Some(index)) = (self.options.alternate_row_color, row.body_index())
            {
                if index % 2 == 1 {
                    surface.draw_rectangle(self.band(top, row.height), Some(fill), None);
                }
            }
            for ((cell, &left), &width) in row
                .cells
                .iter()
                .zip(&lefts)
                .zip(&self.layout.column_widths)
            {
                if let Some(fill) = cell.background {
                    let rect = Rect {
                        x: left,
                        y: top - row.height,
                        width,
                        height: row.height,
                    };
                    surface.draw_rectangle(rect, Some(fill), None);
                }
            }
        }
    }

    fn paint_border(&self, surface: &mut dyn Surface) {
        if let Some(stroke) = self.stroke() {
            let rect = self.band(self.start_y, self.layout.total_height());
            surface.draw_rectangle(rect, None, Some(stroke));
        }
    }

    fn paint_column_separators(&self, surface: &mut dyn Surface) {
        let Some(stroke) = self.stroke() else { return };
        let bottom = self.end_y();
        for x in self.layout.column_lefts().into_iter().skip(1) {
            surface.draw_line((x, self.start_y), (x, bottom), stroke);
        }
    }

    fn paint_row_separators(&self, surface: &mut dyn Surface) {
        let Some(stroke) = self.stroke() else { return };
        let left = self.layout.x;
        let right = left + self.layout.painted_width();
        for (top, _) in self.row_tops().skip(1) {
            surface.draw_line((left, top), (right, top), stroke);
        }
    }

    fn paint_text(&self, surface: &mut dyn Surface, header: bool) {
        let font = if header {
            &self.options.header_font
        } else {
            &self.options.font
        };
        let lefts = self.layout.column_lefts();
        for (top, row) in self.row_tops().filter(|(_, r)| r.is_header() == header) {
            for ((cell, &left), &width) in row
                .cells
                .iter()
                .zip(&lefts)
                .zip(&self.layout.column_widths)
            {
                for (text, x, y) in self.place_lines(cell, left, width, top, row.height) {
                    surface.draw_text(text, x, y, font, cell.font_size, cell.color);
                }
            }
        }
    }

    /// Baseline origin of each non-empty line of `cell`.
    fn place_lines<'c>(
        &self,
        cell: &'c CellLayout,
        left: f64,
        width: f64,
        top: f64,
        row_height: f64,
    ) -> Vec<(&'c str, f64, f64)> {
        let padding = self.options.padding;
        let leading = cell.font_size * self.options.line_height;
        let block = cell.lines().len() as f64 * leading;
        let anchor = match self.options.vertical_align {
            VerticalAlign::Top => top - padding,
            VerticalAlign::Middle => top - (row_height - block) / 2.0,
            VerticalAlign::Bottom => top - row_height + padding + block,
        };

        cell.lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.text.is_empty())
            .map(|(i, line)| {
                let x = match cell.align {
                    TextAlign::Left => left + padding,
                    TextAlign::Center => left + (width - line.width) / 2.0,
                    TextAlign::Right => left + width - line.width - padding,
                };
                let y = anchor - i as f64 * leading - BASELINE_RATIO * cell.font_size;
                (line.text.as_str(), x, y)
            })
            .collect()
    }
}
