//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents (encrypted input is rejected)
//! - Drawing text in the standard PDF fonts, rectangles and images
//! - Extracting positioned text lines from page content
//! - Searching for literal text and redacting regions
//!
//! Coordinates are in points from the top-left corner of the page.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, FontFamily, PdfDocument};
//!
//! let mut doc = PdfDocument::open("contract.pdf")?;
//! doc.set_font(FontFamily::Helvetica, 12.0);
//! doc.insert_text("Hello, World!", 1, 100.0, 100.0, Align::Left)?;
//! let hits = doc.find_text("{{name}}")?;
//! doc.save("output.pdf")?;
//! ```

mod document;
mod extract;
mod font;
mod geometry;
mod image;
mod redact;
mod search;
mod text;

pub use document::{Color, PdfDocument};
pub use extract::TextLine;
pub use font::{parse_base_font, FontFamily, FontStyle, StandardFont};
pub use geometry::{PageSize, Rect};
pub use image::{display_size, image_size};
pub use redact::{Redaction, RedactionFill, Replacement, ReplacementAnchor};
pub use search::find_in_lines;

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("PDF is password protected")]
    PasswordProtected,

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
