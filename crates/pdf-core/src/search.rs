//! Literal text search over extracted lines

use crate::document::PdfDocument;
use crate::extract::TextLine;
use crate::geometry::Rect;
use crate::Result;
use std::collections::BTreeMap;

/// Find every occurrence of `needle` in the given lines
///
/// Matching is exact and case-sensitive, and never spans two lines. Each hit
/// is the union of the boxes of the matched characters.
pub fn find_in_lines(lines: &[TextLine], needle: &str) -> Vec<Rect> {
    if needle.is_empty() {
        return Vec::new();
    }

    let needle_chars = needle.chars().count();
    let mut hits = Vec::new();

    for line in lines {
        for (byte_offset, _) in line.text.match_indices(needle) {
            let start = line.text[..byte_offset].chars().count();
            let Some(first) = line.glyphs.get(start) else {
                continue;
            };
            let matched = line.glyphs.iter().skip(start + 1).take(needle_chars - 1);
            hits.push(matched.fold(*first, |acc, glyph| acc.union(glyph)));
        }
    }

    hits
}

impl PdfDocument {
    /// Search one page (1-indexed) for `needle`
    pub fn find_text_on_page(&self, page: usize, needle: &str) -> Result<Vec<Rect>> {
        let lines = self.extract_lines(page)?;
        Ok(find_in_lines(&lines, needle))
    }

    /// Search every page for `needle`
    ///
    /// Returns hits keyed by page number; pages without hits are absent.
    pub fn find_text(&self, needle: &str) -> Result<BTreeMap<usize, Vec<Rect>>> {
        let mut results = BTreeMap::new();

        for page in 1..=self.page_count() {
            let hits = self.find_text_on_page(page, needle)?;
            if !hits.is_empty() {
                results.insert(page, hits);
            }
        }

        log::debug!(
            "found {:?} on {} of {} pages",
            needle,
            results.len(),
            self.page_count()
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::document_with_content;
    use crate::font::FontStyle;
    use pretty_assertions::assert_eq;

    fn line(text: &str, x: f64, y: f64) -> TextLine {
        let glyphs: Vec<Rect> = text
            .chars()
            .enumerate()
            .map(|(i, _)| Rect::new(x + i as f64 * 6.0, y, 6.0, 12.0))
            .collect();
        TextLine {
            text: text.to_string(),
            bounds: Rect::new(x, y, glyphs.len() as f64 * 6.0, 12.0),
            font_name: "Helvetica".to_string(),
            font_size: 12.0,
            style: FontStyle::empty(),
            baseline: y + 9.0,
            glyphs,
        }
    }

    #[test]
    fn test_find_in_lines_single_hit() {
        let lines = vec![line("Dear {{name}},", 10.0, 100.0)];
        let hits = find_in_lines(&lines, "{{name}}");

        assert_eq!(hits, vec![Rect::new(40.0, 100.0, 48.0, 12.0)]);
    }

    #[test]
    fn test_find_in_lines_repeated_and_multiline() {
        let lines = vec![line("{{a}} and {{a}}", 0.0, 0.0), line("{{a}}", 0.0, 20.0)];
        let hits = find_in_lines(&lines, "{{a}}");

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[1].x, 60.0);
        assert_eq!(hits[2].y, 20.0);
    }

    #[test]
    fn test_find_in_lines_is_case_sensitive() {
        let lines = vec![line("Total", 0.0, 0.0)];
        assert!(find_in_lines(&lines, "total").is_empty());
    }

    #[test]
    fn test_find_in_lines_empty_needle() {
        let lines = vec![line("anything", 0.0, 0.0)];
        assert!(find_in_lines(&lines, "").is_empty());
    }

    #[test]
    fn test_find_in_lines_multibyte_offsets() {
        let lines = vec![line("Café {{x}}", 0.0, 0.0)];
        let hits = find_in_lines(&lines, "{{x}}");

        // five characters precede the token
        assert_eq!(hits, vec![Rect::new(30.0, 0.0, 30.0, 12.0)]);
    }

    #[test]
    fn test_find_text_on_document() {
        let doc = document_with_content(
            "BT /F1 12 Tf 72 700 Td (Name: {{name}}) Tj ET BT /F1 12 Tf 72 600 Td (No token) Tj ET",
        );

        let results = doc.find_text("{{name}}").unwrap();
        assert_eq!(results.len(), 1);
        let hits = &results[&1];
        assert_eq!(hits.len(), 1);
        assert!(hits[0].x > 72.0);
        assert!((hits[0].y - (92.0 - 8.616)).abs() < 0.01);

        assert!(doc.find_text("missing").unwrap().is_empty());
    }

    #[test]
    fn test_find_text_on_invalid_page() {
        let doc = document_with_content("");
        assert!(doc.find_text_on_page(3, "x").is_err());
    }
}
