//! Token, option and report types

use pdf_core::Rect;
use serde::{Deserialize, Serialize};

/// RGB Color for replacement text and fills
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    /// Red component (0.0 - 1.0)
    pub r: f64,
    /// Green component (0.0 - 1.0)
    pub g: f64,
    /// Blue component (0.0 - 1.0)
    pub b: f64,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for pdf_core::Color {
    fn from(color: Color) -> Self {
        pdf_core::Color::rgb(color.r as f32, color.g as f32, color.b as f32)
    }
}

/// A literal placeholder and the value that replaces it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateToken {
    pub placeholder: String,
    pub value: String,
}

impl TemplateToken {
    pub fn new(placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            value: value.into(),
        }
    }
}

/// How a replaced line is painted over
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Paint the line box with `fillColor`
    #[default]
    Opaque,
    /// Remove the glyphs only
    Transparent,
}

/// Vertical placement of the replacement line
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TextAnchor {
    /// Top of the text at the top of the line box
    #[default]
    RegionOrigin,
    /// On the original line's baseline
    Baseline,
}

/// Which extracted line a match is taken to belong to
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineMatching {
    /// The first line on the page containing the placeholder
    #[default]
    First,
    /// The line containing the placeholder whose box overlaps the match,
    /// falling back to the first one
    Overlapping,
}

/// Substitution options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SubstitutionOptions {
    #[serde(default)]
    pub fill: FillMode,

    #[serde(rename = "fillColor", default = "default_fill_color")]
    pub fill_color: Color,

    #[serde(rename = "textColor", default)]
    pub text_color: Color,

    #[serde(default)]
    pub anchor: TextAnchor,

    #[serde(rename = "lineMatching", default)]
    pub line_matching: LineMatching,
}

fn default_fill_color() -> Color {
    Color::white()
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self {
            fill: FillMode::default(),
            fill_color: default_fill_color(),
            text_color: Color::default(),
            anchor: TextAnchor::default(),
            line_matching: LineMatching::default(),
        }
    }
}

/// A page region in points, top-left origin
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Paragraph alignment inferred from a match's position
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
    Center,
    #[default]
    Unset,
}

/// Why a match was left alone
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// No extracted line on the page contains the placeholder
    NoContainingLine,
    /// The containing line's text could not be found again on the page
    LineNotLocated,
}

/// A recorded replacement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedSubstitution {
    #[serde(rename = "pageIndex")]
    pub page_index: usize,
    /// Region that was cleared (the original line's box)
    pub region: Region,
    /// The line as drawn after substitution
    pub text: String,
    pub alignment: Alignment,
}

/// A match that was not substituted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedMatch {
    #[serde(rename = "pageIndex")]
    pub page_index: usize,
    pub bounds: Region,
    pub reason: SkipReason,
}

/// Result of substituting one token
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubstitutionReport {
    pub placeholder: String,
    /// Occurrences found across the document
    pub matches: usize,
    #[serde(default)]
    pub applied: Vec<AppliedSubstitution>,
    #[serde(default)]
    pub skipped: Vec<SkippedMatch>,
}
