//! Text extraction from page content streams
//!
//! A small content stream interpreter tracks the graphics and text state
//! needed to place every shown glyph on the page, then groups the shown
//! strings into lines. Text inside form XObjects is not visited.

use crate::document::{number, PdfDocument};
use crate::font::{decode_win_ansi, parse_base_font, FontFamily, FontStyle, StandardFont};
use crate::geometry::Rect;
use crate::{PdfError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object};
use std::collections::HashMap;

/// A line of text as it appears on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Text content in reading order
    pub text: String,
    /// Bounding box of all glyphs
    pub bounds: Rect,
    /// Family part of the font's base name (e.g. "Arial", "Times")
    pub font_name: String,
    /// Effective font size in points
    pub font_size: f32,
    /// Bold/italic from the font, underline/strikeout from nearby rules
    pub style: FontStyle,
    /// Baseline y in page coordinates
    pub baseline: f64,
    /// One box per character of `text`
    pub glyphs: Vec<Rect>,
}

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn apply(m: &Matrix, x: f64, y: f64) -> (f64, f64) {
    (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
}

/// Font information needed to decode and measure shown strings
struct FontInfo {
    family_name: String,
    style: FontStyle,
    composite: bool,
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: HashMap<u32, f64>,
    default_width: f64,
    standard: Option<StandardFont>,
    to_unicode: HashMap<u32, String>,
    ascent: f64,
    descent: f64,
}

impl FontInfo {
    /// Used when a Tf names a font missing from the resources
    fn fallback() -> Self {
        let standard = StandardFont::default();
        Self {
            family_name: standard.family.name().to_string(),
            style: FontStyle::empty(),
            composite: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: 500.0,
            standard: Some(standard),
            to_unicode: HashMap::new(),
            ascent: standard.family.ascent() as f64,
            descent: standard.family.descent() as f64,
        }
    }

    fn load(doc: &PdfDocument, dict: &Dictionary) -> Self {
        let name_of = |d: &Dictionary, key: &[u8]| -> String {
            d.get(key)
                .and_then(Object::as_name)
                .map(|n| String::from_utf8_lossy(n).into_owned())
                .unwrap_or_default()
        };
        let dict_of = |d: &Dictionary, key: &[u8]| -> Option<Dictionary> {
            let obj = doc.resolve(d.get(key).ok()?).ok()?;
            obj.as_dict().ok().cloned()
        };

        let base_font = name_of(dict, b"BaseFont");
        let composite = name_of(dict, b"Subtype") == "Type0";
        let (family_name, mut style) = parse_base_font(&base_font);

        let descendant = if composite {
            dict.get(b"DescendantFonts")
                .ok()
                .and_then(|obj| doc.resolve(obj).ok())
                .and_then(|obj| obj.as_array().ok())
                .and_then(|arr| arr.first())
                .and_then(|obj| doc.resolve(obj).ok())
                .and_then(|obj| obj.as_dict().ok())
                .cloned()
        } else {
            None
        };
        let metrics_dict = descendant.as_ref().unwrap_or(dict);
        let descriptor = dict_of(metrics_dict, b"FontDescriptor");

        let descriptor_number = |key: &[u8]| -> Option<f64> {
            descriptor
                .as_ref()
                .and_then(|d| d.get(key).ok())
                .and_then(|obj| doc.resolve(obj).ok())
                .and_then(number)
        };

        if let Some(flags) = descriptor_number(b"Flags") {
            let flags = flags as i64;
            if flags & (1 << 6) != 0 {
                style |= FontStyle::ITALIC;
            }
            if flags & (1 << 18) != 0 {
                style |= FontStyle::BOLD;
            }
        }
        if descriptor_number(b"FontWeight").is_some_and(|w| w >= 700.0) {
            style |= FontStyle::BOLD;
        }
        if descriptor_number(b"ItalicAngle").is_some_and(|a| a != 0.0) {
            style |= FontStyle::ITALIC;
        }

        let standard = FontFamily::from_base_font(&family_name)
            .map(|family| StandardFont::new(family, style & (FontStyle::BOLD | FontStyle::ITALIC)));
        let family_metrics = standard.map(|s| s.family).unwrap_or_default();

        let ascent = descriptor_number(b"Ascent")
            .filter(|a| *a > 0.0)
            .unwrap_or(family_metrics.ascent() as f64);
        let descent = descriptor_number(b"Descent")
            .filter(|d| *d < 0.0)
            .unwrap_or(family_metrics.descent() as f64);

        let numbers = |obj: Option<&Object>| -> Vec<f64> {
            obj.and_then(|o| doc.resolve(o).ok())
                .and_then(|o| o.as_array().ok())
                .map(|arr| {
                    arr.iter()
                        .map(|o| doc.resolve(o).ok().and_then(number).unwrap_or(0.0))
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut cid_widths = HashMap::new();
        let (first_char, widths, default_width) = if composite {
            if let Some(w) = metrics_dict.get(b"W").ok().and_then(|o| doc.resolve(o).ok()) {
                parse_cid_widths(doc, w, &mut cid_widths);
            }
            let dw = metrics_dict
                .get(b"DW")
                .ok()
                .and_then(number)
                .unwrap_or(1000.0);
            (0, Vec::new(), dw)
        } else {
            let first_char = dict.get(b"FirstChar").ok().and_then(number).unwrap_or(0.0) as u32;
            let widths = numbers(dict.get(b"Widths").ok());
            let missing = descriptor_number(b"MissingWidth").unwrap_or(500.0);
            (first_char, widths, missing)
        };

        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|obj| doc.resolve(obj).ok())
            .and_then(|obj| obj.as_stream().ok())
            .map(|stream| {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                parse_to_unicode(&data)
            })
            .unwrap_or_default();

        Self {
            family_name,
            style,
            composite,
            first_char,
            widths,
            cid_widths,
            default_width,
            standard,
            to_unicode,
            ascent,
            descent,
        }
    }

    /// Character codes of a shown string
    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }

    /// Advance width in 1/1000 em
    fn width(&self, code: u32) -> f64 {
        if self.composite {
            return self.cid_widths.get(&code).copied().unwrap_or(self.default_width);
        }
        if code >= self.first_char {
            if let Some(w) = self.widths.get((code - self.first_char) as usize) {
                return *w;
            }
        }
        match (self.standard, u8::try_from(code)) {
            (Some(standard), Ok(byte)) => standard.code_width(byte) as f64,
            _ => self.default_width,
        }
    }

    fn text_for(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.get(&code) {
            return text.clone();
        }
        if self.composite {
            return '\u{FFFD}'.to_string();
        }
        decode_win_ansi(code as u8).to_string()
    }
}

/// Largest CID reachable through two-byte codes
const MAX_CID: u32 = 0xFFFF;

/// `/W` array of a CIDFont: `c [w1 w2 ...]` or `c_first c_last w`
///
/// CIDs above [`MAX_CID`] are ignored.
fn parse_cid_widths(doc: &PdfDocument, w: &Object, out: &mut HashMap<u32, f64>) {
    let Ok(items) = w.as_array() else {
        return;
    };

    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(&items[i]) else {
            break;
        };
        // float to int casts saturate; negative CIDs become 0
        let first = first as u32;
        let next = items.get(i + 1).and_then(|o| doc.resolve(o).ok());
        match next {
            Some(Object::Array(list)) => {
                for (offset, width) in list.iter().enumerate() {
                    let cid = u32::try_from(offset)
                        .ok()
                        .and_then(|offset| first.checked_add(offset))
                        .filter(|cid| *cid <= MAX_CID);
                    let Some(cid) = cid else {
                        break;
                    };
                    if let Some(width) = number(width) {
                        out.insert(cid, width);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Some(last), Some(width)) = (number(last), items.get(i + 2).and_then(number))
                else {
                    break;
                };
                for cid in first..=(last as u32).min(MAX_CID) {
                    out.insert(cid, width);
                }
                i += 3;
            }
            None => break,
        }
    }
}

#[derive(Debug, PartialEq)]
enum CMapToken {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Word(String),
    Other,
}

fn tokenize_cmap(data: &[u8]) -> Vec<CMapToken> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let b = data[i];
        match b {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if data.get(i + 1) == Some(&b'<') => {
                tokens.push(CMapToken::Other);
                i += 2;
            }
            b'>' if data.get(i + 1) == Some(&b'>') => {
                tokens.push(CMapToken::Other);
                i += 2;
            }
            b'<' => {
                let mut digits = Vec::new();
                i += 1;
                while i < data.len() && data[i] != b'>' {
                    if data[i].is_ascii_hexdigit() {
                        digits.push(data[i]);
                    }
                    i += 1;
                }
                i += 1;
                if digits.len() % 2 == 1 {
                    digits.push(b'0');
                }
                let bytes = digits
                    .chunks(2)
                    .filter_map(|pair| {
                        std::str::from_utf8(pair)
                            .ok()
                            .and_then(|s| u8::from_str_radix(s, 16).ok())
                    })
                    .collect();
                tokens.push(CMapToken::Hex(bytes));
            }
            b'[' => {
                tokens.push(CMapToken::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(CMapToken::ArrayEnd);
                i += 1;
            }
            b'(' => {
                let mut depth = 0;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
                tokens.push(CMapToken::Other);
            }
            _ if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < data.len()
                    && !data[i].is_ascii_whitespace()
                    && !b"<>[]()%/".contains(&data[i])
                {
                    i += 1;
                }
                if i == start {
                    // A lone '/' starting a name
                    i += 1;
                    tokens.push(CMapToken::Other);
                } else {
                    tokens.push(CMapToken::Word(
                        String::from_utf8_lossy(&data[start..i]).into_owned(),
                    ));
                }
            }
        }
    }

    tokens
}

fn code_value(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    if bytes.len() == 1 {
        return vec![u16::from(bytes[0])];
    }
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from(*hi) << 8 | u16::from(*lo),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

/// Parse the `bfchar`/`bfrange` sections of a ToUnicode CMap
fn parse_to_unicode(data: &[u8]) -> HashMap<u32, String> {
    #[derive(PartialEq)]
    enum Section {
        None,
        Char,
        Range,
    }

    let tokens = tokenize_cmap(data);
    let mut map = HashMap::new();
    let mut section = Section::None;
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            CMapToken::Word(word) => {
                section = match word.as_str() {
                    "beginbfchar" => Section::Char,
                    "beginbfrange" => Section::Range,
                    _ => Section::None,
                };
                i += 1;
            }
            CMapToken::Hex(src) if section == Section::Char => {
                if let Some(CMapToken::Hex(dst)) = tokens.get(i + 1) {
                    map.insert(code_value(src), String::from_utf16_lossy(&utf16_units(dst)));
                }
                i += 2;
            }
            CMapToken::Hex(lo) if section == Section::Range => {
                let (Some(CMapToken::Hex(hi)), Some(dst)) = (tokens.get(i + 1), tokens.get(i + 2))
                else {
                    break;
                };
                let (lo, hi) = (code_value(lo), code_value(hi));
                if hi < lo || hi - lo > 0xFFFF {
                    i += 3;
                    continue;
                }
                match dst {
                    CMapToken::Hex(base) => {
                        let base = utf16_units(base);
                        for (offset, code) in (lo..=hi).enumerate() {
                            let mut units = base.clone();
                            if let Some(last) = units.last_mut() {
                                *last = last.wrapping_add(offset as u16);
                            }
                            map.insert(code, String::from_utf16_lossy(&units));
                        }
                        i += 3;
                    }
                    CMapToken::ArrayStart => {
                        let mut j = i + 3;
                        let mut code = Some(lo);
                        while let Some(CMapToken::Hex(dst)) = tokens.get(j) {
                            if let Some(code) = code.filter(|code| *code <= hi) {
                                map.insert(code, String::from_utf16_lossy(&utf16_units(dst)));
                            }
                            code = code.and_then(|code| code.checked_add(1));
                            j += 1;
                        }
                        // skip the closing bracket
                        i = j + 1;
                    }
                    _ => i += 3,
                }
            }
            _ => i += 1,
        }
    }

    map
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    font: Option<Vec<u8>>,
    font_size: f64,
    rise: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            font: None,
            font_size: 0.0,
            rise: 0.0,
        }
    }
}

/// Text shown by one content stream operator
#[derive(Debug, Clone)]
pub(crate) struct TextRun {
    pub op_index: usize,
    pub text: String,
    pub glyphs: Vec<Rect>,
    pub baseline: f64,
    pub font_name: String,
    pub style: FontStyle,
    pub font_size: f32,
    /// What the operator showed, glyph by glyph
    pub pieces: Vec<ShownPiece>,
    /// `Tf` size and `Tz` scale in effect
    pub text_font_size: f64,
    pub horizontal_scale: f64,
}

/// One element of a shown string
#[derive(Debug, Clone)]
pub(crate) enum ShownPiece {
    /// A glyph: its code bytes, its advance in text space and the centre of
    /// its box in page coordinates
    Glyph {
        bytes: Vec<u8>,
        advance: f64,
        center: (f64, f64),
    },
    /// A `TJ` position adjustment in thousandths of an em
    Adjust(f64),
}

/// A thin horizontal stroke or fill, in page coordinates
#[derive(Debug, Clone, Copy)]
pub(crate) struct HorizontalRule {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

/// Interpreted content of one page
pub(crate) struct PageContent {
    pub operations: Vec<Operation>,
    pub runs: Vec<TextRun>,
    pub rules: Vec<HorizontalRule>,
}

enum Shown<'a> {
    Bytes(&'a [u8]),
    Adjust(f64),
}

struct Interpreter<'d> {
    doc: &'d PdfDocument,
    font_resources: Dictionary,
    fonts: HashMap<Vec<u8>, FontInfo>,
    origin_x: f64,
    top_y: f64,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    runs: Vec<TextRun>,
    rules: Vec<HorizontalRule>,
    current_point: (f64, f64),
    subpath_start: (f64, f64),
    segments: Vec<((f64, f64), (f64, f64))>,
    rects: Vec<[f64; 4]>,
}

impl<'d> Interpreter<'d> {
    fn operands(op: &Operation) -> Vec<f64> {
        op.operands.iter().filter_map(number).collect()
    }

    fn step(&mut self, index: usize, op: &Operation) {
        let nums = Self::operands(op);
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" if nums.len() == 6 => {
                let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                self.state.ctm = multiply(&m, &self.state.ctm);
            }
            "BT" => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    self.state.font = Some(name.clone());
                }
                if let Some(size) = op.operands.get(1).and_then(number) {
                    self.state.font_size = size;
                }
            }
            "Tc" if !nums.is_empty() => self.state.char_spacing = nums[0],
            "Tw" if !nums.is_empty() => self.state.word_spacing = nums[0],
            "Tz" if !nums.is_empty() => self.state.horizontal_scale = nums[0] / 100.0,
            "TL" if !nums.is_empty() => self.state.leading = nums[0],
            "Ts" if !nums.is_empty() => self.state.rise = nums[0],
            "Td" if nums.len() == 2 => self.move_text(nums[0], nums[1]),
            "TD" if nums.len() == 2 => {
                self.state.leading = -nums[1];
                self.move_text(nums[0], nums[1]);
            }
            "Tm" if nums.len() == 6 => {
                let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                self.text_matrix = m;
                self.line_matrix = m;
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show(index, &[Shown::Bytes(bytes)]);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show(index, &[Shown::Bytes(bytes)]);
                }
            }
            "\"" => {
                if let [aw, ac, ..] = nums.as_slice() {
                    self.state.word_spacing = *aw;
                    self.state.char_spacing = *ac;
                }
                self.next_line();
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    self.show(index, &[Shown::Bytes(bytes)]);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let shown: Vec<Shown> = items
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(Shown::Bytes(bytes)),
                            other => number(other).map(Shown::Adjust),
                        })
                        .collect();
                    self.show(index, &shown);
                }
            }
            "m" if nums.len() == 2 => {
                self.current_point = apply(&self.state.ctm, nums[0], nums[1]);
                self.subpath_start = self.current_point;
            }
            "l" if nums.len() == 2 => {
                let point = apply(&self.state.ctm, nums[0], nums[1]);
                self.segments.push((self.current_point, point));
                self.current_point = point;
            }
            "c" if nums.len() == 6 => {
                self.current_point = apply(&self.state.ctm, nums[4], nums[5]);
            }
            "v" | "y" if nums.len() == 4 => {
                self.current_point = apply(&self.state.ctm, nums[2], nums[3]);
            }
            "h" => {
                self.segments.push((self.current_point, self.subpath_start));
                self.current_point = self.subpath_start;
            }
            "re" if nums.len() == 4 => {
                let corners = [
                    apply(&self.state.ctm, nums[0], nums[1]),
                    apply(&self.state.ctm, nums[0] + nums[2], nums[1]),
                    apply(&self.state.ctm, nums[0], nums[1] + nums[3]),
                    apply(&self.state.ctm, nums[0] + nums[2], nums[1] + nums[3]),
                ];
                self.rects.push(bounding(&corners));
                self.current_point = apply(&self.state.ctm, nums[0], nums[1]);
                self.subpath_start = self.current_point;
            }
            "S" | "s" => self.finish_path(true),
            "f" | "F" | "f*" => self.finish_path(false),
            "B" | "B*" | "b" | "b*" => self.finish_path(true),
            "n" => self.finish_path_without_painting(),
            _ => {}
        }
    }

    fn move_text(&mut self, tx: f64, ty: f64) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_text(0.0, -self.state.leading);
    }

    /// Convert a user-space box to page coordinates
    fn page_rect(&self, [min_x, min_y, max_x, max_y]: [f64; 4]) -> Rect {
        Rect::new(min_x - self.origin_x, self.top_y - max_y, max_x - min_x, max_y - min_y)
    }

    fn font(&mut self) -> &FontInfo {
        let key = self.state.font.clone().unwrap_or_default();
        if !self.fonts.contains_key(&key) {
            let info = self
                .font_resources
                .get(&key)
                .ok()
                .and_then(|obj| self.doc.resolve(obj).ok())
                .and_then(|obj| obj.as_dict().ok())
                .map(|dict| FontInfo::load(self.doc, dict))
                .unwrap_or_else(FontInfo::fallback);
            self.fonts.insert(key.clone(), info);
        }
        &self.fonts[&key]
    }

    fn show(&mut self, op_index: usize, shown: &[Shown]) {
        let state = self.state.clone();
        let font = self.font();
        let composite = font.composite;
        let (ascent, descent) = (font.ascent / 1000.0, font.descent / 1000.0);
        let font_name = font.family_name.clone();
        let style = font.style;

        let tfs = state.font_size;
        let th = state.horizontal_scale;
        let low = descent * tfs + state.rise;
        let high = ascent * tfs + state.rise;

        let start = multiply(&self.text_matrix, &state.ctm);
        let (_, baseline_y) = apply(&start, 0.0, state.rise);
        let effective_size = tfs * (start[2] * start[2] + start[3] * start[3]).sqrt();

        let mut text = String::new();
        let mut glyphs = Vec::new();
        let mut pieces = Vec::new();

        for item in shown {
            match item {
                Shown::Bytes(bytes) => {
                    // Measured up front to release the font borrow
                    let decoded: Vec<(u32, f64, String)> = {
                        let font = self.font();
                        font.codes(bytes)
                            .into_iter()
                            .map(|code| (code, font.width(code) / 1000.0, font.text_for(code)))
                            .collect()
                    };

                    for (code, w0, chars) in decoded {
                        let glyph_width = w0 * tfs * th;
                        let trm = multiply(&self.text_matrix, &state.ctm);
                        let corners = [
                            apply(&trm, 0.0, low),
                            apply(&trm, glyph_width, low),
                            apply(&trm, 0.0, high),
                            apply(&trm, glyph_width, high),
                        ];
                        let glyph = self.page_rect(bounding(&corners));
                        let code_bytes = if composite {
                            vec![(code >> 8) as u8, code as u8]
                        } else {
                            vec![code as u8]
                        };

                        let count = chars.chars().count().max(1) as f64;
                        for (i, ch) in chars.chars().enumerate() {
                            let part = glyph.width / count;
                            text.push(ch);
                            glyphs.push(Rect::new(
                                glyph.x + part * i as f64,
                                glyph.y,
                                part,
                                glyph.height,
                            ));
                        }

                        let word_spacing = if !composite && code == 32 {
                            state.word_spacing
                        } else {
                            0.0
                        };
                        let tx = (w0 * tfs + state.char_spacing + word_spacing) * th;
                        self.advance_text(tx);
                        pieces.push(ShownPiece::Glyph {
                            bytes: code_bytes,
                            advance: tx,
                            center: glyph.center(),
                        });
                    }
                }
                Shown::Adjust(amount) => {
                    let tx = -amount / 1000.0 * tfs * th;
                    // Large negative kerning stands in for a word space
                    if *amount < -250.0 && !text.is_empty() && !text.ends_with(' ') {
                        let trm = multiply(&self.text_matrix, &state.ctm);
                        let corners = [
                            apply(&trm, 0.0, low),
                            apply(&trm, tx, low),
                            apply(&trm, 0.0, high),
                            apply(&trm, tx, high),
                        ];
                        text.push(' ');
                        glyphs.push(self.page_rect(bounding(&corners)));
                    }
                    self.advance_text(tx);
                    pieces.push(ShownPiece::Adjust(*amount));
                }
            }
        }

        if text.is_empty() {
            return;
        }

        self.runs.push(TextRun {
            op_index,
            text,
            glyphs,
            baseline: self.top_y - baseline_y,
            font_name,
            style,
            font_size: effective_size as f32,
            pieces,
            text_font_size: tfs,
            horizontal_scale: th,
        });
    }

    fn advance_text(&mut self, tx: f64) {
        self.text_matrix[4] += tx * self.text_matrix[0];
        self.text_matrix[5] += tx * self.text_matrix[1];
    }

    fn finish_path(&mut self, stroked: bool) {
        let mut found = Vec::new();

        if stroked {
            for ((x1, y1), (x2, y2)) in &self.segments {
                if (y1 - y2).abs() < 0.5 && (x1 - x2).abs() > 0.5 {
                    found.push(HorizontalRule {
                        x1: x1.min(*x2) - self.origin_x,
                        x2: x1.max(*x2) - self.origin_x,
                        y: self.top_y - (y1 + y2) / 2.0,
                    });
                }
            }
        }
        for [min_x, min_y, max_x, max_y] in &self.rects {
            if max_y - min_y < 3.0 && max_x - min_x > 0.5 {
                found.push(HorizontalRule {
                    x1: min_x - self.origin_x,
                    x2: max_x - self.origin_x,
                    y: self.top_y - (min_y + max_y) / 2.0,
                });
            }
        }

        self.rules.extend(found);
        self.finish_path_without_painting();
    }

    fn finish_path_without_painting(&mut self) {
        self.segments.clear();
        self.rects.clear();
    }
}

fn bounding(points: &[(f64, f64)]) -> [f64; 4] {
    let mut bbox = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
    for (x, y) in points {
        bbox[0] = bbox[0].min(*x);
        bbox[1] = bbox[1].min(*y);
        bbox[2] = bbox[2].max(*x);
        bbox[3] = bbox[3].max(*y);
    }
    bbox
}

struct LineBuilder {
    text: String,
    glyphs: Vec<Rect>,
    font_name: String,
    font_size: f32,
    style: FontStyle,
    baseline: f64,
}

impl LineBuilder {
    fn start(run: &TextRun) -> Self {
        Self {
            text: run.text.clone(),
            glyphs: run.glyphs.clone(),
            font_name: run.font_name.clone(),
            font_size: run.font_size,
            style: run.style,
            baseline: run.baseline,
        }
    }

    fn right(&self) -> f64 {
        self.glyphs.last().map(Rect::right).unwrap_or_default()
    }

    fn finish(self, rules: &[HorizontalRule]) -> TextLine {
        let bounds = self
            .glyphs
            .iter()
            .skip(1)
            .fold(self.glyphs[0], |acc, glyph| acc.union(glyph));

        let size = self.font_size as f64;
        let mut style = self.style;
        for rule in rules {
            let overlap = rule.x2.min(bounds.right()) - rule.x1.max(bounds.x);
            if overlap < bounds.width * 0.5 {
                continue;
            }
            let below = rule.y - self.baseline;
            if (-0.5..=size * 0.35).contains(&below) {
                style |= FontStyle::UNDERLINE;
            } else if (-size * 0.7..-size * 0.1).contains(&below) {
                style |= FontStyle::STRIKEOUT;
            }
        }

        TextLine {
            text: self.text,
            bounds,
            font_name: self.font_name,
            font_size: self.font_size,
            style,
            baseline: self.baseline,
            glyphs: self.glyphs,
        }
    }
}

/// Group runs sharing a baseline into lines, in reading order
///
/// Runs on one baseline that are separated by more than four em are treated
/// as separate lines (table cells, columns).
pub(crate) fn build_lines(runs: &[TextRun], rules: &[HorizontalRule]) -> Vec<TextLine> {
    let mut sorted: Vec<&TextRun> = runs.iter().collect();
    sorted.sort_by(|a, b| a.baseline.total_cmp(&b.baseline));

    let mut clusters: Vec<Vec<&TextRun>> = Vec::new();
    for run in sorted {
        let tolerance = (run.font_size as f64 * 0.3).max(1.0);
        match clusters.last_mut() {
            Some(cluster) if (run.baseline - cluster[0].baseline).abs() <= tolerance => {
                cluster.push(run)
            }
            _ => clusters.push(vec![run]),
        }
    }

    let mut lines = Vec::new();
    for mut cluster in clusters {
        cluster.sort_by(|a, b| a.glyphs[0].x.total_cmp(&b.glyphs[0].x));

        let mut current: Option<LineBuilder> = None;
        for run in cluster {
            let Some(mut line) = current.take() else {
                current = Some(LineBuilder::start(run));
                continue;
            };

            let size = line.font_size.max(run.font_size) as f64;
            let gap = run.glyphs[0].x - line.right();
            if gap > size * 4.0 {
                lines.push(line.finish(rules));
                current = Some(LineBuilder::start(run));
                continue;
            }

            if gap > size * 0.15 && !line.text.ends_with(' ') && !run.text.starts_with(' ') {
                let previous = line.glyphs[line.glyphs.len() - 1];
                line.text.push(' ');
                line.glyphs
                    .push(Rect::new(previous.right(), previous.y, gap, previous.height));
            }
            line.text.push_str(&run.text);
            line.glyphs.extend_from_slice(&run.glyphs);
            current = Some(line);
        }

        if let Some(line) = current {
            lines.push(line.finish(rules));
        }
    }

    lines
}

impl PdfDocument {
    /// Interpret a page's content stream
    pub(crate) fn interpret_page(&self, page: usize) -> Result<PageContent> {
        let page_id = self.page_id(page)?;
        let [llx, _, _, ury] = self.page_box(page)?;

        let resources = self.page_resources(page_id)?;
        let font_resources = match resources.get(b"Font") {
            Ok(obj) => self.resolve(obj)?.as_dict().map(|d| d.clone()).unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };

        let data = self.page_content(page)?;
        let content = Content::decode(&data)
            .map_err(|e| PdfError::ParseError(format!("page {page} content: {e}")))?;

        let mut interpreter = Interpreter {
            doc: self,
            font_resources,
            fonts: HashMap::new(),
            origin_x: llx,
            top_y: ury,
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            runs: Vec::new(),
            rules: Vec::new(),
            current_point: (0.0, 0.0),
            subpath_start: (0.0, 0.0),
            segments: Vec::new(),
            rects: Vec::new(),
        };
        for (index, op) in content.operations.iter().enumerate() {
            interpreter.step(index, op);
        }

        let Interpreter { runs, rules, .. } = interpreter;
        Ok(PageContent {
            operations: content.operations,
            runs,
            rules,
        })
    }

    /// Extract the text lines of a page (1-indexed) in reading order
    ///
    /// Only content already written to the page is visible; buffered drawing
    /// operations become visible after save or a redaction commit.
    pub fn extract_lines(&self, page: usize) -> Result<Vec<TextLine>> {
        let content = self.interpret_page(page)?;
        Ok(build_lines(&content.runs, &content.rules))
    }

    /// Page text, one line per text line
    pub fn extract_text(&self, page: usize) -> Result<String> {
        let lines = self.extract_lines(page)?;
        Ok(lines
            .into_iter()
            .map(|line| line.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
