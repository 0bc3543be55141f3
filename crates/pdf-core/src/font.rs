//! Standard (base-14) font handling
//!
//! Only the Helvetica, Times and Courier families are supported. They are
//! referenced by name with `WinAnsiEncoding`, so nothing has to be embedded,
//! and their advance widths are known up front from the AFM metrics.

use bitflags::bitflags;
use lopdf::{dictionary, Dictionary};

bitflags! {
    /// Font style flags
    ///
    /// Bold and italic select a different standard font; underline and
    /// strikeout are decorations drawn as lines next to the text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        const BOLD = 0b0001;
        const ITALIC = 0b0010;
        const UNDERLINE = 0b0100;
        const STRIKEOUT = 0b1000;
    }
}

/// Standard font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// Family name as used in PDF base font names
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Helvetica => "Helvetica",
            FontFamily::Times => "Times",
            FontFamily::Courier => "Courier",
        }
    }

    /// Ascender in 1/1000 em
    pub fn ascent(&self) -> f32 {
        match self {
            FontFamily::Helvetica => 718.0,
            FontFamily::Times => 683.0,
            FontFamily::Courier => 629.0,
        }
    }

    /// Descender in 1/1000 em (negative)
    pub fn descent(&self) -> f32 {
        match self {
            FontFamily::Helvetica => -207.0,
            FontFamily::Times => -217.0,
            FontFamily::Courier => -157.0,
        }
    }

    /// Base font name for the given style, e.g. `Helvetica-BoldOblique`
    pub fn base_font(&self, style: FontStyle) -> &'static str {
        let bold = style.contains(FontStyle::BOLD);
        let italic = style.contains(FontStyle::ITALIC);
        match (self, bold, italic) {
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Resolve a standard base font name back to its family
    pub fn from_base_font(base_font: &str) -> Option<Self> {
        match base_font.split('-').next()? {
            "Helvetica" => Some(FontFamily::Helvetica),
            "Times" => Some(FontFamily::Times),
            "Courier" => Some(FontFamily::Courier),
            _ => None,
        }
    }
}

/// A standard font at a given style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StandardFont {
    pub family: FontFamily,
    pub style: FontStyle,
}

impl StandardFont {
    pub fn new(family: FontFamily, style: FontStyle) -> Self {
        Self { family, style }
    }

    /// PDF base font name
    pub fn base_font(&self) -> &'static str {
        self.family.base_font(self.style)
    }

    /// Advance width of a WinAnsi character code in 1/1000 em
    pub fn code_width(&self, code: u8) -> f32 {
        let table = match (self.family, self.style.contains(FontStyle::BOLD)) {
            (FontFamily::Courier, _) => return 600.0,
            (FontFamily::Helvetica, false) => &HELVETICA_WIDTHS,
            (FontFamily::Helvetica, true) => &HELVETICA_BOLD_WIDTHS,
            (FontFamily::Times, bold) => {
                match (bold, self.style.contains(FontStyle::ITALIC)) {
                    (false, false) => &TIMES_ROMAN_WIDTHS,
                    (true, false) => &TIMES_BOLD_WIDTHS,
                    (false, true) => &TIMES_ITALIC_WIDTHS,
                    (true, true) => &TIMES_BOLD_ITALIC_WIDTHS,
                }
            }
        };

        match code {
            32..=126 => table[(code - 32) as usize] as f32,
            // Latin-1 and punctuation outside ASCII: approximate with the digit width
            _ => table[(b'0' - 32) as usize] as f32,
        }
    }

    /// Text width in points
    pub fn text_width(&self, text: &str, font_size: f32) -> f64 {
        let units: f32 = encode_win_ansi(text)
            .into_iter()
            .map(|code| self.code_width(code))
            .sum();
        (units * font_size / 1000.0) as f64
    }

    /// Ascender in points
    pub fn ascent(&self, font_size: f32) -> f64 {
        (self.family.ascent() * font_size / 1000.0) as f64
    }

    /// Descender in points (negative)
    pub fn descent(&self, font_size: f32) -> f64 {
        (self.family.descent() * font_size / 1000.0) as f64
    }

    /// Font dictionary referencing the standard font
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font(),
            "Encoding" => "WinAnsiEncoding",
        }
    }
}

/// Split a PDF base font name into a family name and style flags
///
/// Handles subset prefixes (`ABCDEF+Arial-BoldMT`) and both the `-` and `,`
/// style separators (`Arial,Bold`).
///
/// # Example
/// ```ignore
/// let (family, style) = parse_base_font("XYZABC+TimesNewRomanPS-BoldItalicMT");
/// assert_eq!(family, "TimesNewRomanPS");
/// assert_eq!(style, FontStyle::BOLD | FontStyle::ITALIC);
/// ```
pub fn parse_base_font(base_font: &str) -> (String, FontStyle) {
    let name = match base_font.split_once('+') {
        Some((prefix, rest)) if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) => {
            rest
        }
        _ => base_font,
    };

    let (family, suffix) = match name.find(['-', ',']) {
        Some(idx) => (&name[..idx], &name[idx + 1..]),
        None => (name, ""),
    };

    let mut style = FontStyle::empty();
    let lower = name.to_ascii_lowercase();
    if lower.contains("bold") || lower.contains("black") || lower.contains("heavy") {
        style |= FontStyle::BOLD;
    }
    if lower.contains("italic") || lower.contains("oblique") {
        style |= FontStyle::ITALIC;
    }

    // "Times-Roman" and friends keep the family part only
    let family = if family.is_empty() { suffix } else { family };
    (family.to_string(), style)
}

/// Encode text as WinAnsi (CP1252) bytes; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u8,
            _ => WIN_ANSI_HIGH
                .iter()
                .position(|&mapped| mapped == c)
                .map(|idx| 0x80 + idx as u8)
                .unwrap_or(b'?'),
        })
        .collect()
}

/// Decode a single WinAnsi (CP1252) byte
pub fn decode_win_ansi(code: u8) -> char {
    match code {
        0x80..=0x9F => WIN_ANSI_HIGH[(code - 0x80) as usize],
        _ => code as char,
    }
}

/// Hex string operand for WinAnsi-encoded text, e.g. `<48656C6C6F>`
pub fn encode_text_hex(text: &str) -> String {
    let mut hex = String::with_capacity(text.len() * 2 + 2);
    hex.push('<');
    for byte in encode_win_ansi(text) {
        hex.push_str(&format!("{byte:02X}"));
    }
    hex.push('>');
    hex
}

/// CP1252 code points 0x80-0x9F
const WIN_ANSI_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

// AFM advance widths for codes 32..=126

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_ITALIC_WIDTHS: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_font_names() {
        assert_eq!(FontFamily::Helvetica.base_font(FontStyle::empty()), "Helvetica");
        assert_eq!(
            FontFamily::Helvetica.base_font(FontStyle::BOLD | FontStyle::ITALIC),
            "Helvetica-BoldOblique"
        );
        assert_eq!(FontFamily::Times.base_font(FontStyle::empty()), "Times-Roman");
        assert_eq!(FontFamily::Times.base_font(FontStyle::ITALIC), "Times-Italic");
        // Decorations do not change the base font
        assert_eq!(
            FontFamily::Courier.base_font(FontStyle::UNDERLINE | FontStyle::STRIKEOUT),
            "Courier"
        );
    }

    #[test]
    fn test_from_base_font() {
        assert_eq!(FontFamily::from_base_font("Times-Roman"), Some(FontFamily::Times));
        assert_eq!(FontFamily::from_base_font("Courier-Bold"), Some(FontFamily::Courier));
        assert_eq!(FontFamily::from_base_font("Helvetica"), Some(FontFamily::Helvetica));
        assert_eq!(FontFamily::from_base_font("Arial"), None);
    }

    #[test]
    fn test_helvetica_text_width() {
        let font = StandardFont::new(FontFamily::Helvetica, FontStyle::empty());
        // H(722) e(556) l(222) l(222) o(556) = 2278
        let width = font.text_width("Hello", 10.0);
        assert!((width - 22.78).abs() < 1e-4);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let font = StandardFont::new(FontFamily::Courier, FontStyle::BOLD);
        assert_eq!(font.text_width("iiii", 10.0), font.text_width("WWWW", 10.0));
        assert!((font.text_width("abc", 10.0) - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = StandardFont::new(FontFamily::Times, FontStyle::empty());
        let bold = StandardFont::new(FontFamily::Times, FontStyle::BOLD);
        assert!(bold.text_width("Signature", 12.0) > regular.text_width("Signature", 12.0));
    }

    #[test]
    fn test_parse_base_font_plain() {
        assert_eq!(
            parse_base_font("Helvetica"),
            ("Helvetica".to_string(), FontStyle::empty())
        );
    }

    #[test]
    fn test_parse_base_font_subset_and_style() {
        assert_eq!(
            parse_base_font("ABCDEF+Arial-BoldMT"),
            ("Arial".to_string(), FontStyle::BOLD)
        );
        assert_eq!(
            parse_base_font("TimesNewRomanPS-BoldItalicMT"),
            ("TimesNewRomanPS".to_string(), FontStyle::BOLD | FontStyle::ITALIC)
        );
        assert_eq!(
            parse_base_font("Arial,Italic"),
            ("Arial".to_string(), FontStyle::ITALIC)
        );
        assert_eq!(
            parse_base_font("Helvetica-Oblique"),
            ("Helvetica".to_string(), FontStyle::ITALIC)
        );
    }

    #[test]
    fn test_parse_base_font_keeps_non_subset_plus() {
        // Only a six-letter uppercase tag counts as a subset prefix
        let (family, _) = parse_base_font("My+Font");
        assert_eq!(family, "My+Font");
    }

    #[test]
    fn test_win_ansi_roundtrip_specials() {
        let encoded = encode_win_ansi("€“é”");
        assert_eq!(encoded, vec![0x80, 0x93, 0xE9, 0x94]);
        let decoded: String = encoded.into_iter().map(decode_win_ansi).collect();
        assert_eq!(decoded, "€“é”");
    }

    #[test]
    fn test_win_ansi_unmappable() {
        assert_eq!(encode_win_ansi("aสb"), vec![b'a', b'?', b'b']);
    }

    #[test]
    fn test_encode_text_hex() {
        assert_eq!(encode_text_hex("Hi"), "<4869>");
        assert_eq!(encode_text_hex(""), "<>");
    }

    #[test]
    fn test_font_dictionary() {
        let dict = StandardFont::new(FontFamily::Times, FontStyle::BOLD).to_pdf_dictionary();
        assert_eq!(dict.get(b"BaseFont").unwrap().as_name().unwrap(), b"Times-Bold");
        assert_eq!(
            dict.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
    }
}
