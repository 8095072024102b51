//! # Table Layout
//!
//! Everything that has to be known before the first draw call: the table's
//! frame on the page, the column widths, every cell's wrapped lines and every
//! row's height.
//!
//! The order is fixed. Column widths are allocated once from single-line
//! content measurements ([`columns`]); cells are then wrapped against those final
//! widths ([`cell`]) and rows take the height of their tallest cell
//! ([`rows`]). Nothing is re-run reactively, so the heights always match the
//! widths they were computed for.
//!
//! Layout only borrows the surface immutably, for measuring. Painting, which
//! needs it mutably, starts after [`TableLayout::compute`] has returned.

pub mod cell;
pub mod columns;
pub mod rows;

use crate::error::TableError;
use crate::model::{Cell, ColumnSpec, ColumnWidth, TableOptions};
use crate::surface::Surface;

pub use cell::{CellLayout, CellSizer};
pub use columns::{allocate_column_widths, measure_content_widths, ColumnAllocation};
pub use rows::{measure_rows, row_heights, RowKind, RowLayout};

/// The fully measured table, ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    /// Left edge of the table.
    pub x: f64,
    /// Nominal table width. The columns sum to this unless `overflow` is set.
    pub width: f64,
    pub column_widths: Vec<f64>,
    /// Header row first when present, then the data rows in order.
    pub rows: Vec<RowLayout>,
    /// The column minimums did not fit the nominal width.
    pub overflow: bool,
}

impl TableLayout {
    /// Validate the input, then measure the whole table.
    pub fn compute(
        surface: &dyn Surface,
        columns: &[ColumnSpec],
        rows: &[Vec<Cell>],
        options: &TableOptions,
    ) -> Result<Self, TableError> {
        validate(columns, rows, options)?;
        let (x, width) = table_frame(surface.page_width(), options)?;

        let content = measure_content_widths(surface, columns, rows, options);
        let allocation = allocate_column_widths(columns, &content, width);

        let sizer = CellSizer::new(surface, options);
        let rows = measure_rows(&sizer, columns, &allocation.widths, rows, options);

        Ok(TableLayout {
            x,
            width,
            column_widths: allocation.widths,
            rows,
            overflow: allocation.overflow,
        })
    }

    /// Row heights, parallel to `rows`.
    pub fn row_heights(&self) -> Vec<f64> {
        row_heights(&self.rows)
    }

    pub fn total_height(&self) -> f64 {
        self.rows.iter().map(|r| r.height).sum()
    }

    /// Sum of the column widths. Wider than `width` on overflow.
    pub fn painted_width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    /// Left edge of each column.
    pub fn column_lefts(&self) -> Vec<f64> {
        self.column_widths
            .iter()
            .scan(self.x, |x, w| {
                let left = *x;
                *x += w;
                Some(left)
            })
            .collect()
    }
}

/// The table's left edge and usable width on a page `page_width` wide.
pub fn table_frame(page_width: f64, options: &TableOptions) -> Result<(f64, f64), TableError> {
    let x = options.x.unwrap_or(options.margin);
    let width = options
        .width
        .unwrap_or(page_width - 2.0 * options.margin);
    if !width.is_finite() || width < 0.0 {
        return Err(TableError::InvalidOptions(format!(
            "usable table width is {} (page width {}, margin {})",
            width, page_width, options.margin
        )));
    }
    Ok((x, width))
}

/// Reject tables that cannot be laid out. Runs before anything is measured
/// or drawn.
pub fn validate(
    columns: &[ColumnSpec],
    rows: &[Vec<Cell>],
    options: &TableOptions,
) -> Result<(), TableError> {
    validate_options(options)?;

    if columns.is_empty() {
        return Err(TableError::NoColumns);
    }
    for (i, column) in columns.iter().enumerate() {
        validate_column(i, column)?;
    }

    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(TableError::RowShape {
                row: row_index,
                expected: columns.len(),
                found: row.len(),
            });
        }
        for (col_index, cell) in row.iter().enumerate() {
            if let Some(size) = cell.font_size {
                if !is_positive(size) {
                    return Err(TableError::InvalidOptions(format!(
                        "row {} cell {}: font size must be positive, got {}",
                        row_index, col_index, size
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_options(options: &TableOptions) -> Result<(), TableError> {
    let invalid = |what: &str, value: f64| {
        Err(TableError::InvalidOptions(format!("{} is {}", what, value)))
    };
    if !is_positive(options.font_size) {
        return invalid("fontSize", options.font_size);
    }
    if let Some(size) = options.header_font_size {
        if !is_positive(size) {
            return invalid("headerFontSize", size);
        }
    }
    if !is_positive(options.line_height) {
        return invalid("lineHeight", options.line_height);
    }
    if !is_non_negative(options.padding) {
        return invalid("padding", options.padding);
    }
    if !is_non_negative(options.border_width) {
        return invalid("borderWidth", options.border_width);
    }
    if !options.margin.is_finite() {
        return invalid("margin", options.margin);
    }
    if let Some(x) = options.x {
        if !x.is_finite() {
            return invalid("x", x);
        }
    }
    Ok(())
}

fn validate_column(index: usize, column: &ColumnSpec) -> Result<(), TableError> {
    let invalid = |reason: String| {
        Err(TableError::InvalidColumn {
            column: index,
            header: column.header.clone(),
            reason,
        })
    };

    match column.width {
        ColumnWidth::Fixed(w) => {
            if !is_non_negative(w) {
                return invalid(format!("fixed width must be a non-negative number, got {}", w));
            }
        }
        ColumnWidth::Flex(flex) => {
            if !is_non_negative(flex.min_width) {
                return invalid(format!(
                    "minWidth must be a non-negative number, got {}",
                    flex.min_width
                ));
            }
            if let Some(max) = flex.max_width {
                if max.is_nan() || max < flex.min_width {
                    return invalid(format!(
                        "maxWidth {} is below minWidth {}",
                        max, flex.min_width
                    ));
                }
            }
            if !is_non_negative(flex.weight) {
                return invalid(format!(
                    "weight must be a non-negative number, got {}",
                    flex.weight
                ));
            }
        }
    }

    if let Some(size) = column.font_size {
        if !is_positive(size) {
            return invalid(format!("font size must be positive, got {}", size));
        }
    }
    Ok(())
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn is_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Font size for a body cell: cell override, then column, then table.
pub fn body_font_size(options: &TableOptions, column: &ColumnSpec, cell: &Cell) -> f64 {
    cell.font_size
        .or(column.font_size)
        .unwrap_or(options.font_size)
}

/// Font size for a header cell.
pub fn header_font_size(options: &TableOptions, column: &ColumnSpec) -> f64 {
    options
        .header_font_size
        .or(column.font_size)
        .unwrap_or(options.font_size)
}
