//! Template substitution for existing PDFs
//!
//! This crate provides:
//! - Token types and token set parsing from JSON
//! - Font family and alignment inference for matched lines
//! - Redaction-based substitution that re-renders each matched line with
//!   its placeholder replaced
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::PdfDocument;
//! use template::{parse_tokens, TemplateSubstitutor};
//!
//! let mut doc = PdfDocument::open("offer-letter.pdf")?;
//! let tokens = parse_tokens(r#"{"name": "Ada", "start": "Monday"}"#)?;
//! let reports = TemplateSubstitutor::default().substitute_all(&mut doc, &tokens)?;
//! doc.save("offer-letter-filled.pdf")?;
//! ```

pub mod parser;
mod schema;
pub mod style;
mod substitutor;

pub use parser::{parse_tokens, tokens_from_value};
pub use schema::*;
pub use substitutor::{TemplateSubstitutor, TextLayer};

use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse tokens: {0}")]
    ParseError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
