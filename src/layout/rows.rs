//! Row heights: every cell is sized at its column's final width and a row is
//! as tall as its tallest cell.

use super::cell::{CellLayout, CellSizer};
use super::{body_font_size, header_font_size};
use crate::model::{Cell, ColumnSpec, TableOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    /// Index into the caller's data rows.
    Body(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub kind: RowKind,
    pub height: f64,
    pub cells: Vec<CellLayout>,
}

impl RowLayout {
    pub fn is_header(&self) -> bool {
        self.kind == RowKind::Header
    }

    /// Position among the data rows; `None` for the header.
    pub fn body_index(&self) -> Option<usize> {
        match self.kind {
            RowKind::Body(i) => Some(i),
            RowKind::Header => None,
        }
    }

    fn from_cells(kind: RowKind, cells: Vec<CellLayout>) -> Self {
        let height = cells.iter().fold(0.0, |acc: f64, c| acc.max(c.height));
        RowLayout {
            kind,
            height,
            cells,
        }
    }
}

/// Size the header row (when enabled) and every data row against `widths`.
///
/// `widths` must be the final column widths; rows are never re-measured.
pub fn measure_rows(
    sizer: &CellSizer<'_>,
    columns: &[ColumnSpec],
    widths: &[f64],
    rows: &[Vec<Cell>],
    options: &TableOptions,
) -> Vec<RowLayout> {
    let mut out = Vec::with_capacity(rows.len() + 1);

    if options.header {
        let header_color = options.header_text_color.unwrap_or(options.text_color);
        let cells = columns
            .iter()
            .zip(widths)
            .map(|(column, &width)| {
                let font_size = header_font_size(options, column);
                let (text, height) =
                    sizer.size(&column.header, &options.header_font, font_size, width, true);
                CellLayout {
                    text,
                    font_size,
                    height,
                    align: column.resolved_header_align(),
                    color: header_color,
                    background: None,
                }
            })
            .collect();
        out.push(RowLayout::from_cells(RowKind::Header, cells));
    }

    for (index, row) in rows.iter().enumerate() {
        let cells = columns
            .iter()
            .zip(widths)
            .zip(row)
            .map(|((column, &width), cell)| {
                let font_size = body_font_size(options, column, cell);
                let (text, height) =
                    sizer.size(&cell.text, &options.font, font_size, width, column.wrap);
                CellLayout {
                    text,
                    font_size,
                    height,
                    align: cell.align.unwrap_or(column.align),
                    color: cell.color.unwrap_or(options.text_color),
                    background: cell.background_color,
                }
            })
            .collect();
        out.push(RowLayout::from_cells(RowKind::Body(index), cells));
    }

    out
}

/// Row heights, parallel to `rows`.
pub fn row_heights(rows: &[RowLayout]) -> Vec<f64> {
    rows.iter().map(|r| r.height).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_row_height_is_max_of_cells() {
        let s = RecordingSurface::new(595.0, 842.0);
        let opts = TableOptions {
            header: false,
            ..Default::default()
        };
        let sizer = CellSizer::new(&s, &opts);
        let columns = vec![ColumnSpec::new("A"), ColumnSpec::new("B"), ColumnSpec::new("C")];
        let widths = vec![60.0, 60.0, 60.0];
        let rows = vec![vec![
            Cell::text("one"),
            Cell::text("a fairly long line that wraps several times in sixty points"),
            Cell::text("two lines of text here"),
        ]];

        let measured = measure_rows(&sizer, &columns, &widths, &rows, &opts);
        assert_eq!(measured.len(), 1);
        let row = &measured[0];
        let expected = row.cells.iter().map(|c| c.height).fold(0.0, f64::max);
        assert_eq!(row.height, expected);
        assert_eq!(row.height, row.cells[1].height);
        assert!(row.cells[1].height > row.cells[0].height);
    }

    #[test]
    fn test_header_row_comes_first_with_header_style() {
        let s = RecordingSurface::new(595.0, 842.0);
        let opts = TableOptions::default();
        let sizer = CellSizer::new(&s, &opts);
        let columns = vec![
            ColumnSpec::new("Item"),
            ColumnSpec::new("Price").align(crate::model::TextAlign::Right),
        ];
        let rows = vec![vec![Cell::text("Widget"), Cell::text("9.99")]];
        let measured = measure_rows(&sizer, &columns, &[100.0, 100.0], &rows, &opts);

        assert_eq!(measured.len(), 2);
        assert!(measured[0].is_header());
        assert_eq!(measured[1].kind, RowKind::Body(0));
        assert_eq!(measured[0].cells[1].align, crate::model::TextAlign::Right);
        assert_eq!(measured[0].cells[0].lines()[0].text, "Item");
        assert_eq!(row_heights(&measured).len(), 2);
    }

    #[test]
    fn test_cell_overrides_apply() {
        let s = RecordingSurface::new(595.0, 842.0);
        let opts = TableOptions {
            header: false,
            ..Default::default()
        };
        let sizer = CellSizer::new(&s, &opts);
        let columns = vec![ColumnSpec::new("A")];
        let red = crate::model::Color::rgb(1.0, 0.0, 0.0);
        let rows = vec![vec![Cell::text("x").font_size(14.0).color(red).background(red)]];
        let measured = measure_rows(&sizer, &columns, &[100.0], &rows, &opts);
        let cell = &measured[0].cells[0];
        assert_eq!(cell.font_size, 14.0);
        assert_eq!(cell.color, red);
        assert_eq!(cell.background, Some(red));
        assert!((measured[0].height - (14.0 * 1.2 + 12.0)).abs() < 1e-9);
    }
}
