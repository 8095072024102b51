//! Structured error types for the table engine.
//!
//! Shape errors abort a render before anything is drawn. Glyph errors never
//! escape a cell: the text layer absorbs them and falls back. `FormeError`
//! wraps everything the document-level API can hit.

use thiserror::Error;

/// A table that cannot be laid out as given.
///
/// Always returned before the first draw call, so a failed render leaves the
/// surface untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("table has no columns")]
    NoColumns,

    #[error("row {row} has {found} cells but the table has {expected} columns")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column {column} ({header:?}): {reason}")]
    InvalidColumn {
        column: usize,
        header: String,
        reason: String,
    },

    #[error("invalid table options: {0}")]
    InvalidOptions(String),
}

/// A font was asked to measure or draw a character it has no glyph for.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("font {font} cannot encode {ch:?} (U+{:04X})", code_point(.ch))]
pub struct GlyphEncodingError {
    pub font: String,
    pub ch: char,
}

fn code_point(ch: &char) -> u32 {
    *ch as u32
}

/// The unified error type returned by the document-level API.
#[derive(Debug, Error)]
pub enum FormeError {
    /// JSON input failed to parse as a valid table document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// A table could not be laid out.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
    /// A font could not be loaded or parsed.
    #[error("Font error: {0}")]
    FontError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FormeError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the table document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FormeError::ParseError { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_shape_message() {
        let err = TableError::RowShape {
            row: 2,
            expected: 3,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "row 2 has 4 cells but the table has 3 columns"
        );
    }

    #[test]
    fn test_glyph_error_message() {
        let err = GlyphEncodingError {
            font: "Helvetica".to_string(),
            ch: '中',
        };
        assert_eq!(err.to_string(), "font Helvetica cannot encode '中' (U+4E2D)");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_parse_error_carries_hint() {
        let err: FormeError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse document"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }
}
