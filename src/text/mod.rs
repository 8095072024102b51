//! # Text Layout
//!
//! Greedy, character-level line breaking and glyph-width measurement.
//!
//! Table text mixes CJK and Latin scripts. CJK has no spaces to break at, so
//! the breaker appends one Unicode scalar value at a time and breaks as soon
//! as the next character would overflow, whatever the script. Latin words
//! may therefore split mid-word; there is no hyphenation.
//!
//! Measurement goes through the [`Surface`], which may reject characters its
//! font cannot encode. [`wrap_with_fallback`] absorbs that per cell: it
//! retries once with a sanitized string and then falls back to a placeholder,
//! reporting which path was taken in a [`CellText`].

use crate::error::GlyphEncodingError;
use crate::font::FontKey;
use crate::surface::Surface;

/// Measures text in one font at one size on a surface.
#[derive(Clone, Copy)]
pub struct TextMeasurer<'a> {
    surface: &'a dyn Surface,
    font: &'a FontKey,
    size: f64,
}

impl<'a> TextMeasurer<'a> {
    pub fn new(surface: &'a dyn Surface, font: &'a FontKey, size: f64) -> Self {
        Self {
            surface,
            font,
            size,
        }
    }

    pub fn width_of(&self, text: &str) -> Result<f64, GlyphEncodingError> {
        self.surface.measure_text(text, self.font, self.size)
    }

    pub fn can_encode(&self, ch: char) -> bool {
        let mut buf = [0u8; 4];
        self.width_of(ch.encode_utf8(&mut buf)).is_ok()
    }

    pub fn font(&self) -> &FontKey {
        self.font
    }
}

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    /// Measured width of `text` in points.
    pub width: f64,
}

impl Line {
    fn empty() -> Self {
        Line {
            text: String::new(),
            width: 0.0,
        }
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit line breaks are hard breaks; each paragraph is wrapped on its
/// own. The result is never empty: empty text yields one empty line. A
/// single character wider than `max_width` gets a line of its own.
pub fn wrap_text(
    measurer: &TextMeasurer<'_>,
    text: &str,
    max_width: f64,
) -> Result<Vec<Line>, GlyphEncodingError> {
    let mut lines = Vec::new();
    let normalized = text.replace("\r\n", "\n");
    for paragraph in normalized.split(is_line_break) {
        wrap_paragraph(measurer, paragraph, max_width, &mut lines)?;
    }
    if lines.is_empty() {
        lines.push(Line::empty());
    }
    Ok(lines)
}

fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn wrap_paragraph(
    measurer: &TextMeasurer<'_>,
    paragraph: &str,
    max_width: f64,
    out: &mut Vec<Line>,
) -> Result<(), GlyphEncodingError> {
    let first = out.len();
    let mut current = String::new();
    let mut current_width = 0.0;

    for ch in paragraph.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        let candidate_width = measurer.width_of(&candidate)?;

        if candidate_width > max_width && !current.is_empty() {
            out.push(finish_line(measurer, &current, current_width)?);
            current.clear();
            current_width = 0.0;
            // Whitespace at a break is swallowed rather than opening the line.
            if !ch.is_whitespace() {
                current.push(ch);
                current_width = measurer.width_of(&current)?;
            }
        } else {
            current = candidate;
            current_width = candidate_width;
        }
    }

    if !current.trim().is_empty() || out.len() == first {
        out.push(finish_line(measurer, &current, current_width)?);
    }
    Ok(())
}

fn finish_line(
    measurer: &TextMeasurer<'_>,
    raw: &str,
    raw_width: f64,
) -> Result<Line, GlyphEncodingError> {
    let trimmed = raw.trim();
    let width = if trimmed.len() == raw.len() {
        raw_width
    } else {
        measurer.width_of(trimmed)?
    };
    Ok(Line {
        text: trimmed.to_string(),
        width,
    })
}

/// Wrapped cell text together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum CellText {
    /// The text as given.
    Measured(Vec<Line>),
    /// The font rejected some characters; these lines come from the
    /// sanitized `text`.
    Sanitized { text: String, lines: Vec<Line> },
    /// Nothing usable survived sanitizing; the placeholder stands in.
    Placeholder(Vec<Line>),
}

impl CellText {
    pub fn lines(&self) -> &[Line] {
        match self {
            CellText::Measured(lines) => lines,
            CellText::Sanitized { lines, .. } => lines,
            CellText::Placeholder(lines) => lines,
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, CellText::Measured(_))
    }

    /// Width of the widest line.
    pub fn max_line_width(&self) -> f64 {
        self.lines().iter().fold(0.0, |acc, l| acc.max(l.width))
    }
}

/// Wrap `text`, absorbing glyph encoding errors.
///
/// On an encoding error the text is sanitized for the measurer's font and
/// wrapped once more. If that fails too, or sanitizing leaves nothing of a
/// non-blank text, the result is `placeholder` on a single line.
pub fn wrap_with_fallback(
    measurer: &TextMeasurer<'_>,
    text: &str,
    max_width: f64,
    placeholder: &str,
) -> CellText {
    match wrap_text(measurer, text, max_width) {
        Ok(lines) => return CellText::Measured(lines),
        Err(err) => log::debug!("{}; retrying with sanitized text", err),
    }

    let sanitized = sanitize(text, |ch| measurer.can_encode(ch));
    if !sanitized.trim().is_empty() {
        match wrap_text(measurer, &sanitized, max_width) {
            Ok(lines) => {
                return CellText::Sanitized {
                    text: sanitized,
                    lines,
                }
            }
            Err(err) => log::debug!("sanitized text still unencodable: {}", err),
        }
    }

    log::warn!(
        "cell text {:?} cannot be set in {}; drawing placeholder",
        text,
        measurer.font()
    );
    CellText::Placeholder(vec![placeholder_line(measurer, placeholder)])
}

/// The placeholder as a single line, sanitized like cell text when the font
/// cannot set it as given. Left blank if nothing survives.
fn placeholder_line(measurer: &TextMeasurer<'_>, placeholder: &str) -> Line {
    if let Ok(width) = measurer.width_of(placeholder) {
        return Line {
            text: placeholder.to_string(),
            width,
        };
    }

    let text = sanitize(placeholder, |ch| measurer.can_encode(ch)).replace('\n', " ");
    match measurer.width_of(&text) {
        Ok(width) if !text.trim().is_empty() => {
            log::warn!(
                "placeholder {:?} cannot be set in {}; drawing {:?}",
                placeholder,
                measurer.font(),
                text
            );
            Line { text, width }
        }
        _ => {
            log::warn!(
                "placeholder {:?} cannot be set in {}; leaving cell blank",
                placeholder,
                measurer.font()
            );
            Line::empty()
        }
    }
}

/// Width of `text` set without wrapping: the widest of its paragraphs.
pub fn single_line_width(measurer: &TextMeasurer<'_>, text: &str, placeholder: &str) -> f64 {
    wrap_with_fallback(measurer, text, f64::INFINITY, placeholder).max_line_width()
}

/// Make `text` drawable by a font that encodes only the characters accepted
/// by `can_encode`.
///
/// Line breaks are kept, tabs become spaces, other control characters are
/// dropped. Characters the font rejects are transliterated to an ASCII
/// approximation when one exists (fullwidth forms, CJK punctuation,
/// typographic quotes and dashes) and dropped otherwise.
pub fn sanitize(text: &str, can_encode: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut alt = String::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }
        if is_line_break(ch) {
            out.push('\n');
            continue;
        }
        if ch == '\t' {
            out.push(' ');
            continue;
        }
        if ch.is_control() {
            continue;
        }
        if can_encode(ch) {
            out.push(ch);
            continue;
        }
        alt.clear();
        transliterate(ch, &mut alt);
        out.extend(alt.chars().filter(|c| can_encode(*c)));
    }
    out
}

fn transliterate(ch: char, out: &mut String) {
    let code = ch as u32;
    // Fullwidth ASCII variants sit at a fixed offset from ASCII.
    if (0xFF01..=0xFF5E).contains(&code) {
        if let Some(ascii) = char::from_u32(code - 0xFEE0) {
            out.push(ascii);
        }
        return;
    }
    let replacement = match ch {
        '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{3000}' => " ",
        '‘' | '’' | '‚' | '′' => "'",
        '“' | '”' | '„' | '″' | '「' | '」' | '『' | '』' => "\"",
        '‐' | '‑' | '–' | '—' | '−' => "-",
        '…' => "...",
        '•' | '・' => "*",
        '。' => ".",
        '、' => ",",
        '【' | '〔' => "[",
        '】' | '〕' => "]",
        '《' | '〈' => "<",
        '》' | '〉' => ">",
        '￥' => "\u{00A5}",
        '€' => "EUR",
        '™' => "TM",
        _ => "",
    };
    out.push_str(replacement);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{CustomFontMetrics, FontContext};
    use crate::surface::RecordingSurface;
    use std::collections::HashMap;

    const CJK: &str = "中文表格排版测试";

    fn surface() -> RecordingSurface {
        let mut fonts = FontContext::new();
        let mut advance_widths = HashMap::new();
        for ch in CJK.chars().chain("，。".chars()) {
            advance_widths.insert(ch, 1000);
        }
        for ch in ' '..='~' {
            advance_widths.insert(ch, 500);
        }
        fonts.register_metrics(
            FontKey::regular("Noto Sans SC"),
            CustomFontMetrics {
                units_per_em: 1000,
                advance_widths,
                ascender: 880,
                descender: -120,
            },
        );
        RecordingSurface::with_fonts(595.0, 842.0, fonts)
    }

    fn helvetica() -> FontKey {
        FontKey::regular("Helvetica")
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_empty_string_is_one_empty_line() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let lines = wrap_text(&m, "", 100.0).unwrap();
        assert_eq!(lines, vec![Line::empty()]);
    }

    #[test]
    fn test_single_line() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 12.0);
        let lines = wrap_text(&m, "Hello", 200.0).unwrap();
        assert_eq!(texts(&lines), vec!["Hello"]);
        assert!((lines[0].width - m.width_of("Hello").unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_long_text_wraps_within_width() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let text = "A much longer description that needs wrapping across multiple lines";
        let lines = wrap_text(&m, text, 80.0).unwrap();
        assert!(lines.len() >= 3);
        for line in &lines {
            assert!(line.width <= 80.0 + 1e-9, "{:?} overflows", line.text);
            assert_eq!(line.text, line.text.trim());
        }
        let joined: String = texts(&lines).concat();
        assert_eq!(joined.replace(' ', ""), text.replace(' ', ""));
    }

    #[test]
    fn test_space_at_break_is_swallowed() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        // "ab" fits, "ab " does not.
        let ab = m.width_of("ab").unwrap();
        let lines = wrap_text(&m, "ab cd", ab + 0.5).unwrap();
        assert_eq!(texts(&lines), vec!["ab", "cd"]);
    }

    #[test]
    fn test_wide_char_gets_own_line() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let lines = wrap_text(&m, "WWW", 1.0).unwrap();
        assert_eq!(texts(&lines), vec!["W", "W", "W"]);
    }

    #[test]
    fn test_explicit_newline() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let lines = wrap_text(&m, "Hello\r\n\nWorld", 200.0).unwrap();
        assert_eq!(texts(&lines), vec!["Hello", "", "World"]);
    }

    #[test]
    fn test_cjk_breaks_per_character() {
        let s = surface();
        let font = FontKey::regular("Noto Sans SC");
        let m = TextMeasurer::new(&s, &font, 10.0);
        // 8 glyphs at 10pt each; three fit per line.
        let lines = wrap_text(&m, CJK, 35.0).unwrap();
        assert_eq!(texts(&lines), vec!["中文表", "格排版", "测试"]);
        assert_eq!(texts(&lines).concat(), CJK);
    }

    #[test]
    fn test_line_count_monotonic_in_width() {
        let s = surface();
        let font = FontKey::regular("Noto Sans SC");
        let m = TextMeasurer::new(&s, &font, 9.0);
        let text = "Quote 2026-014: 中文表格排版测试 with mixed Latin text，。";
        let mut previous = usize::MAX;
        let mut width = 5.0;
        while width < 400.0 {
            let count = wrap_text(&m, text, width).unwrap().len();
            assert!(count <= previous, "width {} gave {} > {}", width, count, previous);
            previous = count;
            width += 3.7;
        }
        assert_eq!(previous, 1);
    }

    #[test]
    fn test_unencodable_text_is_an_error() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let err = wrap_text(&m, "Price 中", 100.0).unwrap_err();
        assert_eq!(err.ch, '中');
    }

    #[test]
    fn test_fallback_measured_when_encodable() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let text = wrap_with_fallback(&m, "Plain", 100.0, "?");
        assert!(!text.is_fallback());
        assert!(matches!(text, CellText::Measured(_)));
    }

    #[test]
    fn test_fallback_sanitizes_fullwidth_and_strips_cjk() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let text = wrap_with_fallback(&m, "数量：１２ pcs", 200.0, "?");
        match text {
            CellText::Sanitized { text, lines } => {
                assert_eq!(text, ":12 pcs");
                assert_eq!(texts(&lines), vec![":12 pcs"]);
            }
            other => panic!("expected sanitized text, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_placeholder_when_nothing_survives() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let text = wrap_with_fallback(&m, "中文", 200.0, "?");
        assert_eq!(
            text,
            CellText::Placeholder(vec![Line {
                text: "?".to_string(),
                width: m.width_of("?").unwrap(),
            }])
        );
    }

    #[test]
    fn test_unencodable_placeholder_is_sanitized() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let text = wrap_with_fallback(&m, "中文", 200.0, "？");
        assert_eq!(
            text,
            CellText::Placeholder(vec![Line {
                text: "?".to_string(),
                width: m.width_of("?").unwrap(),
            }])
        );
    }

    #[test]
    fn test_placeholder_with_nothing_encodable_leaves_cell_blank() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let text = wrap_with_fallback(&m, "中文", 200.0, "表");
        assert_eq!(text, CellText::Placeholder(vec![Line::empty()]));
        assert_eq!(text.max_line_width(), 0.0);
    }

    #[test]
    fn test_single_line_width_uses_widest_paragraph() {
        let s = surface();
        let font = helvetica();
        let m = TextMeasurer::new(&s, &font, 10.0);
        let w = single_line_width(&m, "ab\nabcdef", "?");
        assert!((w - m.width_of("abcdef").unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_sanitize_rules() {
        let ascii_only = |c: char| c.is_ascii() && !c.is_ascii_control();
        assert_eq!(sanitize("a\tb\u{7}c", ascii_only), "a bc");
        assert_eq!(sanitize("“Hi”—ok…", ascii_only), "\"Hi\"-ok...");
        assert_eq!(sanitize("Ｔｏｔａｌ\u{3000}５", ascii_only), "Total 5");
        assert_eq!(sanitize("line1\r\nline2", ascii_only), "line1\nline2");
        assert_eq!(sanitize("€5", ascii_only), "EUR5");
    }
}
