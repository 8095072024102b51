//! # PDF Output
//!
//! [`PdfPage`] is a [`Surface`] that turns draw calls into content-stream
//! operators as they arrive; [`PdfWriter`] serializes finished pages into a
//! PDF 1.7 file.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, content streams, pages
//! ...
//! xref                <- byte offset of every object
//! trailer             <- root (and info) references
//! %%EOF
//! ```
//!
//! Only the standard fonts are used, with WinAnsiEncoding, so no font program
//! is embedded. A page measures with the same standard metrics it draws with:
//! a custom font registered elsewhere has no effect here.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use crate::error::GlyphEncodingError;
use crate::font::metrics::win_ansi_byte;
use crate::font::{FontContext, FontKey, StandardFont};
use crate::model::{Color, Metadata};
use crate::surface::{Rect, Stroke, Surface};
use miniz_oxide::deflate::compress_to_vec_zlib;

/// One page being painted.
#[derive(Debug)]
pub struct PdfPage {
    width: f64,
    height: f64,
    fonts: FontContext,
    content: String,
    /// Fonts in first-use order; `/F{i}` names entry `i`.
    used_fonts: Vec<StandardFont>,
}

impl PdfPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            fonts: FontContext::new(),
            content: String::new(),
            used_fonts: Vec::new(),
        }
    }

    /// The uncompressed content stream.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn used_fonts(&self) -> &[StandardFont] {
        &self.used_fonts
    }

    fn font_resource(&mut self, font: StandardFont) -> usize {
        match self.used_fonts.iter().position(|f| *f == font) {
            Some(i) => i,
            None => {
                self.used_fonts.push(font);
                self.used_fonts.len() - 1
            }
        }
    }
}

impl Surface for PdfPage {
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
        let index = self.font_resource(StandardFont::resolve(font));
        let _ = write!(
            self.content,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.2} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\nET\n",
            color.r,
            color.g,
            color.b,
            index,
            size,
            x,
            y,
            encode_win_ansi(text)
        );
    }

    fn draw_rectangle(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>) {
        let op = match (fill, stroke) {
            (None, None) => return,
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (Some(_), Some(_)) => "B",
        };
        self.content.push_str("q\n");
        if let Some(c) = fill {
            let _ = writeln!(self.content, "{:.3} {:.3} {:.3} rg", c.r, c.g, c.b);
        }
        if let Some(s) = stroke {
            write_stroke_state(&mut self.content, s);
        }
        let _ = write!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} re\n{}\nQ\n",
            rect.x, rect.y, rect.width, rect.height, op
        );
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
        self.content.push_str("q\n");
        write_stroke_state(&mut self.content, stroke);
        let _ = write!(
            self.content,
            "{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            from.0, from.1, to.0, to.1
        );
    }
}

fn write_stroke_state(stream: &mut String, stroke: Stroke) {
    let c = stroke.color;
    let _ = write!(
        stream,
        "{:.3} {:.3} {:.3} RG\n{:.2} w\n",
        c.r, c.g, c.b, stroke.width
    );
}

/// Encode `text` as the body of a PDF literal string in WinAnsiEncoding.
///
/// Delimiters are backslash-escaped and bytes above 0x7E are written as
/// octal escapes, so the result is plain ASCII. Characters outside WinAnsi
/// become `?`.
pub fn encode_win_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match win_ansi_byte(ch).unwrap_or(b'?') {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b @ 0x20..=0x7E => out.push(b as char),
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Escape a string for use in the Info dictionary.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

pub struct PdfWriter;

/// Objects allocated while writing; index 0 is the free-list head.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
}

impl PdfBuilder {
    fn new() -> Self {
        // 0 = free entry, 1 = Catalog, 2 = Pages; filled in at the end.
        Self {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `pages` into PDF bytes.
    pub fn write(&self, pages: &[PdfPage], metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder::new();

        // One font object per distinct standard font across all pages.
        let mut font_objects: Vec<(StandardFont, usize)> = Vec::new();
        for font in pages.iter().flat_map(|p| p.used_fonts.iter().copied()) {
            if font_objects.iter().any(|(f, _)| *f == font) {
                continue;
            }
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(dict.into_bytes());
            font_objects.push((font, id));
        }

        let mut page_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let compressed = compress_to_vec_zlib(page.content.as_bytes(), 6);
            let mut stream: Vec<u8> = Vec::new();
            let _ = write!(
                stream,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            stream.extend_from_slice(&compressed);
            stream.extend_from_slice(b"\nendstream");
            let content_id = builder.push(stream);

            let resources = page
                .used_fonts
                .iter()
                .enumerate()
                .filter_map(|(i, font)| {
                    font_objects
                        .iter()
                        .find(|(f, _)| f == font)
                        .map(|(_, id)| format!("/F{} {} 0 R", i, id))
                })
                .collect::<Vec<_>>()
                .join(" ");
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width, page.height, content_id, resources
            );
            page_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_ids.len()
        )
        .into_bytes();

        let info_id = info_dictionary(metadata).map(|info| builder.push(info.into_bytes()));
        serialize(&builder, info_id)
    }
}

fn info_dictionary(metadata: &Metadata) -> Option<String> {
    if metadata.title.is_none() && metadata.author.is_none() && metadata.subject.is_none() {
        return None;
    }
    let mut info = String::from("<< ");
    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            let _ = write!(info, "/{} ({}) ", name, escape_pdf_string(value));
        }
    }
    info.push_str("/Producer (forme-table) >>");
    Some(info)
}

fn serialize(builder: &PdfBuilder, info_id: Option<usize>) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets = vec![0usize; builder.objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, data) in builder.objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{} 0 obj\n", i);
        output.extend_from_slice(data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len());
    if let Some(id) = info_id {
        let _ = write!(output, " /Info {} 0 R", id);
    }
    let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_encode_win_ansi_escapes() {
        assert_eq!(encode_win_ansi("Total (net)"), "Total \\(net\\)");
        assert_eq!(encode_win_ansi("a\\b"), "a\\\\b");
        assert_eq!(encode_win_ansi("café"), "caf\\351");
        assert_eq!(encode_win_ansi("€5"), "\\2005");
        assert_eq!(encode_win_ansi("中"), "?");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let pages = vec![PdfPage::new(595.28, 841.89)];
        let bytes = PdfWriter::new().write(&pages, &Metadata::default());

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"trailer"));
        assert!(!contains(&bytes, b"/Info"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let pages = vec![PdfPage::new(595.28, 841.89)];
        let metadata = Metadata {
            title: Some("Parts (Q3)".to_string()),
            author: Some("Stores".to_string()),
            subject: None,
        };
        let bytes = PdfWriter::new().write(&pages, &metadata);
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/Title (Parts \\(Q3\\))"));
        assert!(text.contains("/Author (Stores)"));
        assert!(!text.contains("/Subject"));
    }

    #[test]
    fn test_page_records_operators() {
        let mut page = PdfPage::new(200.0, 200.0);
        let stroke = Stroke {
            color: Color::BLACK,
            width: 1.0,
        };
        page.draw_rectangle(
            Rect {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 20.0,
            },
            Some(Color::gray(0.9)),
            Some(stroke),
        );
        page.draw_line((10.0, 10.0), (60.0, 10.0), stroke);
        page.draw_text("Hi", 12.0, 15.0, &FontKey::bold("Helvetica"), 9.0, Color::BLACK);

        let content = page.content();
        assert!(content.contains("10.00 10.00 50.00 20.00 re\nB\n"));
        assert!(content.contains("10.00 10.00 m\n60.00 10.00 l\nS\n"));
        assert!(content.contains("/F0 9.00 Tf"));
        assert!(content.contains("(Hi) Tj"));
        assert_eq!(page.used_fonts(), &[StandardFont::HelveticaBold]);
    }

    #[test]
    fn test_fonts_registered_once_per_document() {
        let mut first = PdfPage::new(200.0, 200.0);
        first.draw_text("a", 0.0, 0.0, &FontKey::regular("Helvetica"), 9.0, Color::BLACK);
        first.draw_text("b", 0.0, 0.0, &FontKey::bold("Helvetica"), 9.0, Color::BLACK);
        let mut second = PdfPage::new(200.0, 200.0);
        second.draw_text("c", 0.0, 0.0, &FontKey::bold("Helvetica"), 9.0, Color::BLACK);

        let bytes = PdfWriter::new().write(&[first, second], &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/BaseFont /Helvetica-Bold ").count(), 1);
        assert_eq!(text.matches("/BaseFont /Helvetica ").count(), 1);
        assert!(text.contains("/Count 2"));
    }

    #[test]
    fn test_measures_with_standard_metrics() {
        let page = PdfPage::new(595.0, 842.0);
        let font = FontKey::regular("Helvetica");
        let w = page.measure_text("AB", &font, 10.0).unwrap();
        assert!((w - 13.34).abs() < 1e-9);
        assert!(page.measure_text("表", &font, 10.0).is_err());
    }
}
