//! Region redaction with optional replacement text
//!
//! Redactions are recorded first and applied together by
//! [`PdfDocument::commit_redactions`]. Applying one removes the glyphs whose
//! boxes are centred inside the region from the page content, paints the
//! region over and draws the replacement text, if any.

use crate::document::{Color, PdfDocument};
use crate::extract::{ShownPiece, TextRun};
use crate::font::StandardFont;
use crate::geometry::Rect;
use crate::text::calculate_x_offset;
use crate::{Align, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use std::collections::{BTreeMap, HashMap};

/// How the redacted region is painted over
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RedactionFill {
    /// Paint the region with a solid color
    Opaque(Color),
    /// Leave the background visible; only the glyphs are removed
    Transparent,
}

impl Default for RedactionFill {
    fn default() -> Self {
        RedactionFill::Opaque(Color::white())
    }
}

/// Where replacement text is placed vertically
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ReplacementAnchor {
    /// Top of the text box at the top of the region
    #[default]
    RegionOrigin,
    /// Baseline at the given page y
    Baseline(f64),
}

/// Text drawn after a region is cleared
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub text: String,
    pub font: StandardFont,
    pub font_size: f32,
    /// Alignment within the region's width
    pub align: Align,
    pub color: Color,
    pub anchor: ReplacementAnchor,
}

impl Replacement {
    /// Black 12pt Helvetica, left aligned at the region origin
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: StandardFont::default(),
            font_size: 12.0,
            align: Align::Left,
            color: Color::black(),
            anchor: ReplacementAnchor::RegionOrigin,
        }
    }
}

/// A region to clear, with optional new content
#[derive(Debug, Clone, PartialEq)]
pub struct Redaction {
    pub region: Rect,
    pub fill: RedactionFill,
    pub replacement: Option<Replacement>,
}

impl Redaction {
    pub fn new(region: Rect) -> Self {
        Self {
            region,
            fill: RedactionFill::default(),
            replacement: None,
        }
    }

    pub fn with_fill(mut self, fill: RedactionFill) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = Some(replacement);
        self
    }
}

impl PdfDocument {
    /// Record a redaction on a page (1-indexed)
    ///
    /// Nothing changes until [`commit_redactions`](Self::commit_redactions).
    pub fn record_redaction(&mut self, page: usize, redaction: Redaction) -> Result<()> {
        self.page_id(page)?;
        self.pending_redactions.push((page, redaction));
        Ok(())
    }

    /// Number of recorded, uncommitted redactions
    pub fn pending_redactions(&self) -> usize {
        self.pending_redactions.len()
    }

    /// Apply every recorded redaction
    ///
    /// Returns how many were applied. Text inserted before this call is
    /// subject to the redactions as well.
    pub fn commit_redactions(&mut self) -> Result<usize> {
        let pending = std::mem::take(&mut self.pending_redactions);
        let count = pending.len();

        let mut by_page: BTreeMap<usize, Vec<Redaction>> = BTreeMap::new();
        for (page, redaction) in pending {
            by_page.entry(page).or_default().push(redaction);
        }

        for (page, redactions) in &by_page {
            self.redact_page(*page, redactions)?;
            log::debug!("applied {} redactions on page {}", redactions.len(), page);
        }

        Ok(count)
    }

    fn redact_page(&mut self, page: usize, redactions: &[Redaction]) -> Result<()> {
        self.flush_page(page)?;

        let content = self.interpret_page(page)?;
        let regions: Vec<Rect> = redactions.iter().map(|r| r.region).collect();

        let mut rewritten: HashMap<usize, Vec<Operation>> = HashMap::new();
        for run in &content.runs {
            if let Some(ops) = blank_glyphs(run, &content.operations[run.op_index], &regions) {
                rewritten.insert(run.op_index, ops);
            }
        }

        if !rewritten.is_empty() {
            let operations: Vec<Operation> = content
                .operations
                .into_iter()
                .enumerate()
                .flat_map(|(index, op)| rewritten.remove(&index).unwrap_or_else(|| vec![op]))
                .collect();
            let data = Content { operations }.encode()?;
            self.replace_page_content(page, data)?;
        }

        for redaction in redactions {
            if let RedactionFill::Opaque(color) = redaction.fill {
                self.fill_rectangle(page, redaction.region, color)?;
            }
            if let Some(replacement) = &redaction.replacement {
                self.draw_replacement(page, redaction.region, replacement)?;
            }
        }

        self.flush_page(page)
    }

    fn draw_replacement(&mut self, page: usize, region: Rect, replacement: &Replacement) -> Result<()> {
        // anchor of the aligned text inside the region
        let x = region.x + calculate_x_offset(0.0, region.width, replacement.align);
        let y = match replacement.anchor {
            ReplacementAnchor::RegionOrigin => region.y,
            ReplacementAnchor::Baseline(baseline) => {
                baseline - replacement.font.ascent(replacement.font_size)
            }
        };

        self.draw_text(
            &replacement.text,
            page,
            x,
            y,
            replacement.align,
            replacement.font,
            replacement.font_size,
            replacement.color,
        )
    }
}

/// Rewrite a text-showing operator without the glyphs inside `regions`
///
/// Removed glyphs become `TJ` adjustments of the same advance, so the glyphs
/// that stay keep their positions. Returns `None` when nothing is removed.
fn blank_glyphs(run: &TextRun, op: &Operation, regions: &[Rect]) -> Option<Vec<Operation>> {
    let inside = |(x, y): (f64, f64)| regions.iter().any(|r| r.contains_point(x, y));

    let hit = run.pieces.iter().any(|piece| match piece {
        ShownPiece::Glyph { center, .. } => inside(*center),
        ShownPiece::Adjust(_) => false,
    });
    if !hit {
        return None;
    }

    let scale = run.text_font_size * run.horizontal_scale;
    let to_adjustment = |advance: f64| {
        let amount = if scale != 0.0 { -advance * 1000.0 / scale } else { 0.0 };
        Object::Real(amount as f32)
    };

    let mut items = Vec::new();
    let mut kept: Vec<u8> = Vec::new();
    let mut removed = 0.0;

    for piece in &run.pieces {
        match piece {
            ShownPiece::Glyph { bytes, center, .. } if !inside(*center) => {
                if removed != 0.0 {
                    items.push(to_adjustment(removed));
                    removed = 0.0;
                }
                kept.extend_from_slice(bytes);
            }
            ShownPiece::Glyph { advance, .. } => {
                if !kept.is_empty() {
                    items.push(Object::String(std::mem::take(&mut kept), StringFormat::Hexadecimal));
                }
                removed += advance;
            }
            ShownPiece::Adjust(amount) => {
                if !kept.is_empty() {
                    items.push(Object::String(std::mem::take(&mut kept), StringFormat::Hexadecimal));
                }
                if removed != 0.0 {
                    items.push(to_adjustment(removed));
                    removed = 0.0;
                }
                items.push(Object::Real(*amount as f32));
            }
        }
    }
    if !kept.is_empty() {
        items.push(Object::String(kept, StringFormat::Hexadecimal));
    }
    if removed != 0.0 {
        items.push(to_adjustment(removed));
    }

    let mut ops = Vec::new();
    match op.operator.as_str() {
        "'" => ops.push(Operation::new("T*", vec![])),
        "\"" => {
            if let [word_spacing, char_spacing, ..] = op.operands.as_slice() {
                ops.push(Operation::new("Tw", vec![word_spacing.clone()]));
                ops.push(Operation::new("Tc", vec![char_spacing.clone()]));
            }
            ops.push(Operation::new("T*", vec![]));
        }
        _ => {}
    }
    ops.push(Operation::new("TJ", vec![Object::Array(items)]));

    Some(ops)
}
