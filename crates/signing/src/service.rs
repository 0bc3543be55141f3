//! Signing request pipeline

use crate::marker::{Placement, SignatureMarker, SkipReason};
use crate::{
    MalformedGraphicPolicy, Result, SigningError, SigningOptions, SigningOutcome, SigningRequest,
    SkippedRequest,
};
use pdf_core::PdfDocument;
use template::{tokens_from_value, TemplateSubstitutor};

/// Sign a PDF
///
/// Steps, in order: open the document, substitute the request's template
/// tokens, place every signature, append the summary page and save.
/// Unreadable or password protected documents fail before anything is
/// drawn. Signatures that cannot be placed are listed in
/// [`SigningOutcome::skipped`]; undecodable graphics follow
/// [`SigningOptions::malformed_graphic`].
pub fn sign_document(
    pdf: &[u8],
    request: &SigningRequest,
    options: &SigningOptions,
) -> Result<SigningOutcome> {
    let mut doc = PdfDocument::open_from_bytes(pdf)?;
    log::info!(
        "signing {} ({} pages) with {} signatures",
        request.document_id,
        doc.page_count(),
        request.signatures.len()
    );

    let substitutions = match &request.tokens {
        Some(data) => {
            let tokens = tokens_from_value(data)?;
            TemplateSubstitutor::new(options.substitution).substitute_all(&mut doc, &tokens)?
        }
        None => Vec::new(),
    };

    let marker = SignatureMarker::new(options.marker.clone());
    let mut placed = 0;
    let mut skipped = Vec::new();
    let mut summary = Vec::new();

    for (index, entry) in request.signatures.iter().enumerate() {
        let placement = match entry.to_signature() {
            Ok(signature) => {
                let placement = marker.place(&mut doc, &signature)?;
                if !matches!(placement, Placement::Skipped(SkipReason::MalformedGraphic { .. })) {
                    summary.push(signature);
                }
                placement
            }
            Err(reason) => Placement::Skipped(SkipReason::MalformedGraphic { reason }),
        };

        match placement {
            Placement::Applied { .. } => placed += 1,
            Placement::Skipped(SkipReason::MalformedGraphic { reason })
                if options.malformed_graphic == MalformedGraphicPolicy::Abort =>
            {
                return Err(SigningError::MalformedGraphic { index, reason });
            }
            Placement::Skipped(reason) => {
                log::warn!(
                    "signature {} of {} skipped: {:?}",
                    index,
                    request.document_id,
                    reason
                );
                skipped.push(SkippedRequest { index, reason });
            }
        }
    }

    let summary_page = if options.summary_page {
        Some(marker.append_summary_page(&mut doc, &summary)?)
    } else {
        None
    };

    let document = doc.to_bytes()?;
    log::info!(
        "signed {}: {} placed, {} skipped",
        request.document_id,
        placed,
        skipped.len()
    );

    Ok(SigningOutcome {
        success: true,
        document,
        placed,
        skipped,
        substitutions,
        summary_page,
    })
}
