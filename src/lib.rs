//! # Forme Table
//!
//! Table layout and text flow for PDF pages.
//!
//! A table is a list of column specs, rows of text cells and a set of
//! options. The engine measures everything first, then paints: column widths
//! are allocated once from the content, cells are wrapped against those
//! widths, rows take the height of their tallest cell, and only then are
//! fills, lines and glyph runs issued to a [`Surface`].
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Columns, cells, options
//!       ↓
//!   [layout]   Column widths, wrapped cells, row heights
//!       ↓        (measuring through [text] and [font])
//!   [render]   Pass-ordered draw calls onto a [surface]
//!       ↓
//!   [pdf]      Content streams and PDF bytes
//! ```
//!
//! Coordinates are PDF points with the origin at the bottom-left corner and
//! Y growing upward. A table is drawn downward from its `start_y`, and every
//! render returns the Y just below the table so callers can stack content.

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod render;
pub mod surface;
pub mod text;

pub use error::{FormeError, GlyphEncodingError, TableError};
pub use layout::TableLayout;
pub use model::{Cell, ColumnSpec, FontSource, Table, TableDocument, TableOptions};
pub use render::TableRenderer;
pub use surface::{DrawCall, RecordingSurface, Surface};

use std::path::Path;

use font::FontContext;
use pdf::{PdfPage, PdfWriter};

/// Lay out and paint one table with its top edge at `start_y`.
///
/// Returns the Y immediately below the table. Invalid input is rejected
/// before anything is drawn.
pub fn render(
    surface: &mut dyn Surface,
    columns: &[ColumnSpec],
    rows: &[Vec<Cell>],
    options: &TableOptions,
    start_y: f64,
) -> Result<f64, TableError> {
    let layout = TableLayout::compute(&*surface, columns, rows, options)?;
    Ok(TableRenderer::new(&layout, options, start_y).paint(surface))
}

impl Table {
    /// Measure this table without drawing it.
    pub fn layout(&self, surface: &dyn Surface) -> Result<TableLayout, TableError> {
        TableLayout::compute(surface, &self.columns, &self.rows, &self.options)
    }

    pub fn render(&self, surface: &mut dyn Surface, start_y: f64) -> Result<f64, TableError> {
        render(surface, &self.columns, &self.rows, &self.options, start_y)
    }
}

/// Paint every table of `document` onto `surface`, stacked from the top
/// margin downward. Returns the Y below the last table.
///
/// Every table is measured before the first one is painted, so an invalid
/// table anywhere in the document leaves the surface untouched.
pub fn paint_document(
    surface: &mut dyn Surface,
    document: &TableDocument,
) -> Result<f64, FormeError> {
    let layouts = document
        .tables
        .iter()
        .map(|table| table.layout(&*surface))
        .collect::<Result<Vec<_>, _>>()?;

    let mut y = surface.page_height() - document.margin_top;
    for (i, (table, layout)) in document.tables.iter().zip(&layouts).enumerate() {
        if i > 0 {
            y -= document.gap;
        }
        y = TableRenderer::new(layout, &table.options, y).paint(surface);
        if y < 0.0 {
            log::warn!(
                "table {} ends {:.2}pt below the bottom of the page",
                i,
                -y
            );
        }
    }
    Ok(y)
}

/// Register the font files `document` declares with `fonts`.
///
/// Each file is read once per path, however many faces point at it.
pub fn load_document_fonts(
    fonts: &mut FontContext,
    document: &TableDocument,
) -> Result<(), FormeError> {
    for source in &document.fonts {
        fonts.load_font_file(source.key.clone(), Path::new(&source.src))?;
    }
    Ok(())
}

/// Render a document to PDF bytes.
///
/// The PDF is set in the standard fonts only: declared font files are not
/// embedded, and text in those faces is measured and drawn with the standard
/// font their key resolves to.
pub fn render_document(document: &TableDocument) -> Result<Vec<u8>, FormeError> {
    for source in &document.fonts {
        log::warn!(
            "font {} ({}) is not embedded; PDF output uses the standard fonts",
            source.key, source.src
        );
    }
    let (width, height) = document.page.dimensions();
    let mut page = PdfPage::new(width, height);
    paint_document(&mut page, document)?;
    Ok(PdfWriter::new().write(&[page], &document.metadata))
}

/// Render a document described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, FormeError> {
    let document: TableDocument = serde_json::from_str(json)?;
    render_document(&document)
}

/// The draw calls a document produces, in order, without writing a PDF.
///
/// Declared font files are loaded and used for measuring.
pub fn record_document(document: &TableDocument) -> Result<Vec<DrawCall>, FormeError> {
    let (width, height) = document.page.dimensions();
    let mut surface = RecordingSurface::new(width, height);
    load_document_fonts(surface.fonts_mut(), document)?;
    paint_document(&mut surface, document)?;
    Ok(surface.into_calls())
}

/// [`record_document`] for JSON input, with the calls dumped as JSON.
pub fn draw_calls_json(json: &str) -> Result<String, FormeError> {
    let document: TableDocument = serde_json::from_str(json)?;
    let calls = record_document(&document)?;
    Ok(serde_json::to_string_pretty(&calls)?)
}
