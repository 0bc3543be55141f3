//! Redaction-based token substitution

use crate::style::reconstruct_font;
use crate::{
    Alignment, AppliedSubstitution, FillMode, LineMatching, Region, Result, SkipReason,
    SkippedMatch, SubstitutionOptions, SubstitutionReport, TemplateToken, TextAnchor,
};
use pdf_core::{PdfDocument, Rect, Redaction, RedactionFill, Replacement, ReplacementAnchor, TextLine};
use std::collections::BTreeMap;

/// Text search, extraction and redaction over a document
///
/// Pages are addressed by 0-based index.
pub trait TextLayer {
    fn page_width(&self, page_index: usize) -> Result<f64>;

    /// Boxes of every occurrence of `literal`, keyed by page index
    fn find_text(&self, literal: &str) -> Result<BTreeMap<usize, Vec<Rect>>>;

    fn find_text_on_page(&self, page_index: usize, literal: &str) -> Result<Vec<Rect>>;

    fn extract_lines(&self, page_index: usize) -> Result<Vec<TextLine>>;

    fn record_redaction(&mut self, page_index: usize, redaction: Redaction) -> Result<()>;

    /// Apply all recorded redactions, returning how many were applied
    fn commit_redactions(&mut self) -> Result<usize>;
}

impl TextLayer for PdfDocument {
    fn page_width(&self, page_index: usize) -> Result<f64> {
        Ok(self.page_size(page_index + 1)?.width)
    }

    fn find_text(&self, literal: &str) -> Result<BTreeMap<usize, Vec<Rect>>> {
        let hits = PdfDocument::find_text(self, literal)?;
        Ok(hits.into_iter().map(|(page, boxes)| (page - 1, boxes)).collect())
    }

    fn find_text_on_page(&self, page_index: usize, literal: &str) -> Result<Vec<Rect>> {
        Ok(PdfDocument::find_text_on_page(self, page_index + 1, literal)?)
    }

    fn extract_lines(&self, page_index: usize) -> Result<Vec<TextLine>> {
        Ok(PdfDocument::extract_lines(self, page_index + 1)?)
    }

    fn record_redaction(&mut self, page_index: usize, redaction: Redaction) -> Result<()> {
        Ok(PdfDocument::record_redaction(self, page_index + 1, redaction)?)
    }

    fn commit_redactions(&mut self) -> Result<usize> {
        Ok(PdfDocument::commit_redactions(self)?)
    }
}

/// Replaces placeholder tokens with values, keeping the look of the line
/// they sit in
///
/// # Example
///
/// ```ignore
/// use template::{TemplateSubstitutor, TemplateToken};
///
/// let substitutor = TemplateSubstitutor::default();
/// let report = substitutor.substitute(&mut doc, &TemplateToken::new("{{name}}", "Ada"))?;
/// println!("{} of {} matches replaced", report.applied.len(), report.matches);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateSubstitutor {
    options: SubstitutionOptions,
}

impl TemplateSubstitutor {
    pub fn new(options: SubstitutionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SubstitutionOptions {
        &self.options
    }

    /// Substitute every occurrence of one token
    ///
    /// Each occurrence re-renders its whole line with the placeholder
    /// replaced. Redactions are committed once, after all pages.
    pub fn substitute<L>(&self, layer: &mut L, token: &TemplateToken) -> Result<SubstitutionReport>
    where
        L: TextLayer + ?Sized,
    {
        let placeholder = token.placeholder.as_str();
        let matches = layer.find_text(placeholder)?;

        let mut report = SubstitutionReport {
            placeholder: token.placeholder.clone(),
            matches: matches.values().map(Vec::len).sum(),
            ..Default::default()
        };
        log::debug!(
            "{:?}: {} matches on {} pages",
            placeholder,
            report.matches,
            matches.len()
        );

        for (&page_index, boxes) in &matches {
            if boxes.is_empty() {
                continue;
            }

            let lines = layer.extract_lines(page_index)?;
            let page_width = layer.page_width(page_index)?;

            for bounds in boxes {
                match self.prepare(layer, page_index, page_width, &lines, bounds, token)? {
                    Ok((redaction, applied)) => {
                        layer.record_redaction(page_index, redaction)?;
                        report.applied.push(applied);
                    }
                    Err(reason) => {
                        log::warn!(
                            "skipping {:?} on page {}: {:?}",
                            placeholder,
                            page_index,
                            reason
                        );
                        report.skipped.push(SkippedMatch {
                            page_index,
                            bounds: Region::from(*bounds),
                            reason,
                        });
                    }
                }
            }
        }

        if !report.applied.is_empty() {
            let committed = layer.commit_redactions()?;
            log::info!("{:?}: {} lines replaced", placeholder, committed);
        }

        Ok(report)
    }

    /// Substitute tokens one after another, committing after each
    pub fn substitute_all<L>(
        &self,
        layer: &mut L,
        tokens: &[TemplateToken],
    ) -> Result<Vec<SubstitutionReport>>
    where
        L: TextLayer + ?Sized,
    {
        tokens
            .iter()
            .map(|token| self.substitute(layer, token))
            .collect()
    }

    /// Build the redaction for one match, or the reason it is skipped
    #[allow(clippy::type_complexity)]
    fn prepare<L>(
        &self,
        layer: &L,
        page_index: usize,
        page_width: f64,
        lines: &[TextLine],
        bounds: &Rect,
        token: &TemplateToken,
    ) -> Result<std::result::Result<(Redaction, AppliedSubstitution), SkipReason>>
    where
        L: TextLayer + ?Sized,
    {
        let Some(line) = self.containing_line(lines, bounds, &token.placeholder) else {
            return Ok(Err(SkipReason::NoContainingLine));
        };

        let font = reconstruct_font(&line.font_name, line.style);
        let alignment = Alignment::infer(bounds, page_width);
        let text = line.text.replace(token.placeholder.as_str(), &token.value);

        let candidates = layer.find_text_on_page(page_index, &line.text)?;
        let Some(region) = candidates
            .iter()
            .find(|candidate| candidate.intersects(bounds))
            .or_else(|| candidates.first())
            .copied()
        else {
            return Ok(Err(SkipReason::LineNotLocated));
        };

        let anchor = match self.options.anchor {
            TextAnchor::RegionOrigin => ReplacementAnchor::RegionOrigin,
            TextAnchor::Baseline => ReplacementAnchor::Baseline(line.baseline),
        };
        let fill = match self.options.fill {
            FillMode::Opaque => RedactionFill::Opaque(self.options.fill_color.into()),
            FillMode::Transparent => RedactionFill::Transparent,
        };

        let redaction = Redaction::new(region).with_fill(fill).with_replacement(Replacement {
            text: text.clone(),
            font,
            font_size: line.font_size,
            align: alignment.to_align(),
            color: self.options.text_color.into(),
            anchor,
        });
        let applied = AppliedSubstitution {
            page_index,
            region: Region::from(region),
            text,
            alignment,
        };

        Ok(Ok((redaction, applied)))
    }

    fn containing_line<'a>(
        &self,
        lines: &'a [TextLine],
        bounds: &Rect,
        placeholder: &str,
    ) -> Option<&'a TextLine> {
        let mut containing = lines.iter().filter(|line| line.text.contains(placeholder));
        match self.options.line_matching {
            LineMatching::First => containing.next(),
            LineMatching::Overlapping => {
                let candidates: Vec<&TextLine> = containing.collect();
                candidates
                    .iter()
                    .find(|line| line.bounds.intersects(bounds))
                    .or_else(|| candidates.first())
                    .copied()
            }
        }
    }
}
