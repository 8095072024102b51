//! # Font Management
//!
//! Font resolution and width measurement for table text.
//!
//! The 14 standard PDF fonts need no embedding and cover WinAnsi text. Custom
//! TrueType/OpenType fonts (typically a CJK face) are parsed with ttf-parser
//! for their advance widths. Font bytes are held in an explicit [`FontCache`]
//! owned by the [`FontContext`], never in global state.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::error::{FormeError, GlyphEncodingError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Identifies a font face: family + weight + style.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontKey {
    pub family: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

impl FontKey {
    pub fn new(family: impl Into<String>, weight: u32, italic: bool) -> Self {
        Self {
            family: family.into(),
            weight,
            italic,
        }
    }

    pub fn regular(family: impl Into<String>) -> Self {
        Self::new(family, 400, false)
    }

    pub fn bold(family: impl Into<String>) -> Self {
        Self::new(family, 700, false)
    }

    /// Snap to 400 or 700, the two weights the standard fonts ship.
    fn snapped(&self) -> FontKey {
        FontKey {
            family: self.family.clone(),
            weight: if self.weight >= 600 { 700 } else { 400 },
            italic: self.italic,
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if self.weight != 400 {
            write!(f, " {}", self.weight)?;
        }
        if self.italic {
            write!(f, " italic")?;
        }
        Ok(())
    }
}

/// The standard PDF fonts usable for WinAnsi text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Obliques share the widths of their upright face.
    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => {
                StandardFontMetrics::HELVETICA_BOLD
            }
            // Times Italic is narrower than Roman; Roman widths keep the
            // measurement on the safe (wider) side for most glyphs.
            Self::TimesRoman | Self::TimesItalic => StandardFontMetrics::TIMES_ROMAN,
            Self::TimesBold | Self::TimesBoldItalic => StandardFontMetrics::TIMES_BOLD,
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => StandardFontMetrics::COURIER,
        }
    }

    /// Map a font key onto a standard font, falling back to Helvetica for
    /// unknown families.
    pub fn resolve(key: &FontKey) -> StandardFont {
        let bold = key.weight >= 600;
        let family = key.family.to_ascii_lowercase();
        let family = family.trim();
        match (family, bold, key.italic) {
            ("times" | "times-roman" | "times new roman" | "serif", false, false) => {
                Self::TimesRoman
            }
            ("times" | "times-roman" | "times new roman" | "serif", true, false) => {
                Self::TimesBold
            }
            ("times" | "times-roman" | "times new roman" | "serif", false, true) => {
                Self::TimesItalic
            }
            ("times" | "times-roman" | "times new roman" | "serif", true, true) => {
                Self::TimesBoldItalic
            }
            ("courier" | "courier new" | "monospace", false, false) => Self::Courier,
            ("courier" | "courier new" | "monospace", true, false) => Self::CourierBold,
            ("courier" | "courier new" | "monospace", false, true) => Self::CourierOblique,
            ("courier" | "courier new" | "monospace", true, true) => Self::CourierBoldOblique,
            (_, false, false) => Self::Helvetica,
            (_, true, false) => Self::HelveticaBold,
            (_, false, true) => Self::HelveticaOblique,
            (_, true, true) => Self::HelveticaBoldOblique,
        }
    }
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub ascender: i16,
    pub descender: i16,
}

impl CustomFontMetrics {
    /// Advance width of `ch` in points, or `None` if the font has no glyph.
    pub fn char_width(&self, ch: char, font_size: f64) -> Option<f64> {
        let units = self.advance_widths.get(&ch)?;
        Some(*units as f64 / self.units_per_em as f64 * font_size)
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                }
            }
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            ascender: face.ascender(),
            descender: face.descender(),
        })
    }
}

/// Font file bytes keyed by font identifier.
///
/// Populated once per key and read thereafter; entries are never evicted.
#[derive(Debug, Clone, Default)]
pub struct FontCache {
    entries: HashMap<String, Arc<[u8]>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        self.entries.get(key).cloned()
    }

    pub fn put(&mut self, key: impl Into<String>, bytes: Vec<u8>) -> Arc<[u8]> {
        let bytes: Arc<[u8]> = Arc::from(bytes);
        self.entries.insert(key.into(), Arc::clone(&bytes));
        bytes
    }

    /// Return the cached bytes for `key`, running `load` only on a miss.
    pub fn get_or_load<E>(
        &mut self,
        key: &str,
        load: impl FnOnce() -> Result<Vec<u8>, E>,
    ) -> Result<Arc<[u8]>, E> {
        if let Some(bytes) = self.get(key) {
            return Ok(bytes);
        }
        let bytes = load()?;
        Ok(self.put(key, bytes))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A font key resolved to something that can measure.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedFont<'a> {
    Standard(StandardFont),
    Custom(&'a CustomFontMetrics),
}

/// Custom fonts registered by key. Anything not registered resolves to a
/// standard font.
#[derive(Debug, Default)]
pub struct FontRegistry {
    custom: HashMap<FontKey, CustomFontMetrics>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: FontKey, metrics: CustomFontMetrics) {
        self.custom.insert(key, metrics);
    }

    /// Look up a font: exact custom match, then snapped weight, then the
    /// standard fonts.
    pub fn resolve(&self, key: &FontKey) -> ResolvedFont<'_> {
        if let Some(m) = self.custom.get(key) {
            return ResolvedFont::Custom(m);
        }
        if let Some(m) = self.custom.get(&key.snapped()) {
            return ResolvedFont::Custom(m);
        }
        ResolvedFont::Standard(StandardFont::resolve(key))
    }

    pub fn is_custom(&self, key: &FontKey) -> bool {
        matches!(self.resolve(key), ResolvedFont::Custom(_))
    }
}

/// Shared font context used by measuring surfaces.
#[derive(Debug, Default)]
pub struct FontContext {
    registry: FontRegistry,
    cache: FontCache,
}

impl FontContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register already-parsed metrics under `key`.
    pub fn register_metrics(&mut self, key: FontKey, metrics: CustomFontMetrics) {
        self.registry.register(key, metrics);
    }

    /// Parse raw font data and register it under `key`.
    pub fn register_font_data(&mut self, key: FontKey, data: &[u8]) -> Result<(), FormeError> {
        let metrics = CustomFontMetrics::from_font_data(data)
            .ok_or_else(|| FormeError::FontError(format!("cannot parse font data for {}", key)))?;
        self.registry.register(key, metrics);
        Ok(())
    }

    /// Register a font whose bytes come from `load`, going through the cache
    /// so each `source` is loaded at most once.
    pub fn load_font(
        &mut self,
        key: FontKey,
        source: &str,
        load: impl FnOnce() -> std::io::Result<Vec<u8>>,
    ) -> Result<(), FormeError> {
        let bytes = self.cache.get_or_load(source, load)?;
        self.register_font_data(key, &bytes)
    }

    /// Register a font file from disk.
    pub fn load_font_file(&mut self, key: FontKey, path: &Path) -> Result<(), FormeError> {
        let source = path.to_string_lossy().into_owned();
        self.load_font(key, &source, || std::fs::read(path))
    }

    pub fn cache(&self) -> &FontCache {
        &self.cache
    }

    pub fn resolve(&self, key: &FontKey) -> ResolvedFont<'_> {
        self.registry.resolve(key)
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    /// Advance width of a single character in points.
    pub fn char_width(
        &self,
        ch: char,
        key: &FontKey,
        font_size: f64,
    ) -> Result<f64, GlyphEncodingError> {
        let width = match self.resolve(key) {
            ResolvedFont::Standard(font) => font.metrics().char_width(ch, font_size),
            ResolvedFont::Custom(m) => m.char_width(ch, font_size),
        };
        width.ok_or_else(|| GlyphEncodingError {
            font: key.to_string(),
            ch,
        })
    }

    /// Width of a string in points. Fails on the first unencodable character.
    pub fn measure_string(
        &self,
        text: &str,
        key: &FontKey,
        font_size: f64,
    ) -> Result<f64, GlyphEncodingError> {
        let mut width = 0.0;
        for ch in text.chars() {
            width += self.char_width(ch, key, font_size)?;
        }
        Ok(width)
    }
}
