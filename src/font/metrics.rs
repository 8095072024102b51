//! Advance widths for the standard PDF fonts.
//!
//! Widths come from the Adobe AFM files, in 1/1000 em. Only the WinAnsi
//! repertoire is covered: the standard fonts are never embedded, so anything
//! outside WinAnsi cannot be drawn with them and is reported as unencodable.

/// Widths for the printable ASCII range `0x20..=0x7E`, indexed by `ch - 0x20`.
type AsciiWidths = [u16; 95];

#[rustfmt::skip]
const HELVETICA: AsciiWidths = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: AsciiWidths = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: AsciiWidths = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: AsciiWidths = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

/// Width table for one standard font face.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    ascii: Option<&'static AsciiWidths>,
    /// Courier is monospaced; every glyph has this width.
    fixed: u16,
    quote_single: u16,
    quote_double: u16,
    en_dash: u16,
}

impl StandardFontMetrics {
    pub const HELVETICA: StandardFontMetrics = StandardFontMetrics {
        ascii: Some(&HELVETICA),
        fixed: 0,
        quote_single: 222,
        quote_double: 333,
        en_dash: 556,
    };
    pub const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
        ascii: Some(&HELVETICA_BOLD),
        fixed: 0,
        quote_single: 278,
        quote_double: 500,
        en_dash: 556,
    };
    pub const TIMES_ROMAN: StandardFontMetrics = StandardFontMetrics {
        ascii: Some(&TIMES_ROMAN),
        fixed: 0,
        quote_single: 333,
        quote_double: 444,
        en_dash: 500,
    };
    pub const TIMES_BOLD: StandardFontMetrics = StandardFontMetrics {
        ascii: Some(&TIMES_BOLD),
        fixed: 0,
        quote_single: 333,
        quote_double: 500,
        en_dash: 500,
    };
    pub const COURIER: StandardFontMetrics = StandardFontMetrics {
        ascii: None,
        fixed: 600,
        quote_single: 600,
        quote_double: 600,
        en_dash: 600,
    };

    /// Width of `ch` in 1/1000 em, or `None` if the font cannot encode it.
    pub fn char_units(&self, ch: char) -> Option<u16> {
        let byte = win_ansi_byte(ch)?;
        let Some(ascii) = self.ascii else {
            return Some(self.fixed);
        };
        let units = match byte {
            0x20..=0x7E => ascii[(byte - 0x20) as usize],
            0x91 | 0x92 => self.quote_single,
            0x93 | 0x94 => self.quote_double,
            0x95 => 350,
            0x96 => self.en_dash,
            0x85 | 0x97 => 1000,
            // Non-breaking space and soft hyphen render like their ASCII forms.
            0xA0 => ascii[0],
            0xAD => ascii[(b'-' - 0x20) as usize],
            _ => match latin1_base(ch) {
                Some(base) => ascii[(base as u8 - 0x20) as usize],
                // Remaining Latin-1 symbols and the euro sign: digit width.
                None => ascii[(b'0' - 0x20) as usize],
            },
        };
        Some(units)
    }

    /// Width of `ch` in points, or `None` if the font cannot encode it.
    pub fn char_width(&self, ch: char, font_size: f64) -> Option<f64> {
        self.char_units(ch)
            .map(|units| units as f64 / 1000.0 * font_size)
    }
}

/// Map a character to its WinAnsiEncoding byte.
///
/// Returns `None` for control characters and for anything outside the
/// encoding (CJK, emoji, most symbols).
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' => Some(ch as u8),
        '\u{00A0}'..='\u{00FF}' => Some(ch as u32 as u8),
        '€' => Some(0x80),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        _ => None,
    }
}

/// The unaccented ASCII letter an accented Latin-1 letter is drawn over.
/// Accented forms share their base letter's advance width in these fonts.
fn latin1_base(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ð' => 'D',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}
