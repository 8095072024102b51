//! # Table Model
//!
//! The input representation for the table engine: column specs, cells, and
//! rendering options. Everything here is plain value data with serde derives
//! so a table can come straight from JSON produced by the quoting app.
//!
//! Cells carry already-formatted strings. Currency, totals and the rest of
//! the business data assembly happen before a table reaches this crate.

use crate::font::FontKey;
use serde::{Deserialize, Serialize};

/// An RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn gray(v: f64) -> Self {
        Self { r: v, g: v, b: v }
    }
}

/// Horizontal placement of a line inside its cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchoring of a cell's text block inside the row height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// How a column's width is decided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnWidth {
    /// Fixed width in points. Never grows or shrinks.
    Fixed(f64),
    /// Content-driven width inside `[min_width, max_width]`, sharing leftover
    /// space by weight.
    Flex(FlexWidth),
}

impl Default for ColumnWidth {
    fn default() -> Self {
        ColumnWidth::Flex(FlexWidth::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexWidth {
    #[serde(default)]
    pub min_width: f64,
    /// `None` means unbounded.
    #[serde(default)]
    pub max_width: Option<f64>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Default for FlexWidth {
    fn default() -> Self {
        Self {
            min_width: 0.0,
            max_width: None,
            weight: 1.0,
        }
    }
}

impl FlexWidth {
    pub fn max_or_unbounded(&self) -> f64 {
        self.max_width.unwrap_or(f64::INFINITY)
    }
}

fn default_weight() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// One table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub header: String,
    #[serde(default)]
    pub width: ColumnWidth,
    #[serde(default)]
    pub align: TextAlign,
    /// Falls back to `align` when unset.
    #[serde(default)]
    pub header_align: Option<TextAlign>,
    /// When false, body cells are typeset on one unwrapped line.
    #[serde(default = "default_true")]
    pub wrap: bool,
    /// Font size for this column's body cells.
    #[serde(default)]
    pub font_size: Option<f64>,
}

impl ColumnSpec {
    /// A flexible, left-aligned, wrapping column with weight 1.
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            width: ColumnWidth::default(),
            align: TextAlign::Left,
            header_align: None,
            wrap: true,
            font_size: None,
        }
    }

    pub fn fixed(mut self, width: f64) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    pub fn flex(mut self, min_width: f64, max_width: Option<f64>, weight: f64) -> Self {
        self.width = ColumnWidth::Flex(FlexWidth {
            min_width,
            max_width,
            weight,
        });
        self
    }

    pub fn weight(self, weight: f64) -> Self {
        let flex = self.flex_width();
        self.flex(flex.min_width, flex.max_width, weight)
    }

    pub fn min_width(self, min_width: f64) -> Self {
        let flex = self.flex_width();
        self.flex(min_width, flex.max_width, flex.weight)
    }

    pub fn max_width(self, max_width: f64) -> Self {
        let flex = self.flex_width();
        self.flex(flex.min_width, Some(max_width), flex.weight)
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn header_align(mut self, align: TextAlign) -> Self {
        self.header_align = Some(align);
        self
    }

    pub fn no_wrap(mut self) -> Self {
        self.wrap = false;
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn resolved_header_align(&self) -> TextAlign {
        self.header_align.unwrap_or(self.align)
    }

    fn flex_width(&self) -> FlexWidth {
        match self.width {
            ColumnWidth::Flex(f) => f,
            ColumnWidth::Fixed(_) => FlexWidth::default(),
        }
    }
}

/// One (row, column) content unit.
///
/// In JSON a cell is either a bare string or an object with overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CellRepr", rename_all = "camelCase")]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Text(String),
    #[serde(rename_all = "camelCase")]
    Full {
        #[serde(default)]
        text: String,
        #[serde(default)]
        align: Option<TextAlign>,
        #[serde(default)]
        font_size: Option<f64>,
        #[serde(default)]
        color: Option<Color>,
        #[serde(default)]
        background_color: Option<Color>,
    },
}

impl From<CellRepr> for Cell {
    fn from(repr: CellRepr) -> Self {
        match repr {
            CellRepr::Text(text) => Cell::text(text),
            CellRepr::Full {
                text,
                align,
                font_size,
                color,
                background_color,
            } => Cell {
                text,
                align,
                font_size,
                color,
                background_color,
            },
        }
    }
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = Some(align);
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::text(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::text(text)
    }
}

/// Rendering options. Every field has a default so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    /// Draw a header row built from the column headers.
    pub header: bool,
    pub border_color: Color,
    /// Stroke width for the outer border and the separators. Zero disables
    /// all lines.
    pub border_width: f64,
    pub header_background_color: Option<Color>,
    /// Fill for every second body row.
    pub alternate_row_color: Option<Color>,
    /// Fill behind the whole table.
    pub background_color: Option<Color>,
    pub text_color: Color,
    pub header_text_color: Option<Color>,
    pub font_size: f64,
    pub header_font_size: Option<f64>,
    pub padding: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    pub vertical_align: VerticalAlign,
    pub font: FontKey,
    pub header_font: FontKey,
    /// Horizontal page margin used when `x` / `width` are unset.
    pub margin: f64,
    pub x: Option<f64>,
    pub width: Option<f64>,
    /// Text drawn in place of a cell whose glyphs cannot be encoded at all.
    pub placeholder: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            header: true,
            border_color: Color::gray(0.6),
            border_width: 1.0,
            header_background_color: Some(Color::gray(0.9)),
            alternate_row_color: Some(Color::gray(0.97)),
            background_color: None,
            text_color: Color::BLACK,
            header_text_color: None,
            font_size: 9.0,
            header_font_size: None,
            padding: 6.0,
            line_height: 1.2,
            vertical_align: VerticalAlign::Top,
            font: FontKey::new("Helvetica", 400, false),
            header_font: FontKey::new("Helvetica", 700, false),
            margin: 40.0,
            x: None,
            width: None,
            placeholder: "?".to_string(),
        }
    }
}

/// A complete table: columns, data rows and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
    #[serde(default)]
    pub options: TableOptions,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// A font file a document measures with, and the face it provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSource {
    #[serde(flatten)]
    pub key: FontKey,
    /// Path to a TrueType/OpenType file.
    pub src: String,
}

/// The CLI / JSON input: one page holding one or more stacked tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDocument {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub page: PageSize,
    /// Distance from the top edge of the page to the first table.
    #[serde(default = "default_top_margin")]
    pub margin_top: f64,
    /// Vertical space between stacked tables.
    #[serde(default = "default_gap")]
    pub gap: f64,
    #[serde(default)]
    pub fonts: Vec<FontSource>,
    pub tables: Vec<Table>,
}

fn default_top_margin() -> f64 {
    40.0
}

fn default_gap() -> f64 {
    12.0
}
