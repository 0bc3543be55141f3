//! Signature placement for multi-page PDFs
//!
//! This crate provides:
//! - Resolution of stacked (whole-document) coordinates to a page
//! - Adaptive sizing for rendered signature names
//! - Signature marks and a trailing summary page
//! - A request pipeline that substitutes template tokens, places every
//!   signature and returns the edited document
//!
//! # Example
//!
//! ```ignore
//! use signing::{sign_document, SigningOptions, SigningRequest};
//!
//! let request: SigningRequest = serde_json::from_str(&request_json)?;
//! let outcome = sign_document(&pdf_bytes, &request, &SigningOptions::default())?;
//! std::fs::write("signed.pdf", &outcome.document)?;
//! ```

mod config;
pub mod marker;
mod request;
pub mod resolver;
mod service;
pub mod sizing;

pub use config::{MalformedGraphicPolicy, MarkerConfig, SigningOptions};
pub use marker::{Graphic, Placement, SignatureCanvas, SignatureMarker, SkipReason, Signature};
pub use request::{Coordinates, SignatureRequest, SigningOutcome, SigningRequest, SkippedRequest};
pub use resolver::{resolve, resolve_in, GlobalPoint, PageGeometry, ResolvedPosition};
pub use service::sign_document;
pub use sizing::size_for;

use thiserror::Error;

/// Errors that can occur while signing
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("Template error: {0}")]
    Template(#[from] template::TemplateError),

    #[error("Malformed graphic for signature {index}: {reason}")]
    MalformedGraphic { index: usize, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err: SigningError = pdf_core::PdfError::PasswordProtected.into();
        assert_eq!(err.to_string(), "PDF error: PDF is password protected");

        let err = SigningError::MalformedGraphic {
            index: 2,
            reason: "Invalid base64".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed graphic for signature 2: Invalid base64"
        );
    }
}
