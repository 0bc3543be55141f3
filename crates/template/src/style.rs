//! Style inference for matched lines

use crate::Alignment;
use pdf_core::{Align, FontFamily, FontStyle, Rect, StandardFont};

/// Distance in points within which a match counts as aligned
pub const ALIGNMENT_TOLERANCE: f64 = 5.0;

/// Normalized family names and the standard family that replaces them
static FAMILY_ALIASES: &[(&str, FontFamily)] = &[
    ("helvetica", FontFamily::Helvetica),
    ("helveticaneue", FontFamily::Helvetica),
    ("arial", FontFamily::Helvetica),
    ("arialmt", FontFamily::Helvetica),
    ("arimo", FontFamily::Helvetica),
    ("liberationsans", FontFamily::Helvetica),
    ("nimbussans", FontFamily::Helvetica),
    ("nimbussansl", FontFamily::Helvetica),
    ("sansserif", FontFamily::Helvetica),
    ("times", FontFamily::Times),
    ("timesroman", FontFamily::Times),
    ("timesnewroman", FontFamily::Times),
    ("timesnewromanps", FontFamily::Times),
    ("timesnewromanpsmt", FontFamily::Times),
    ("tinos", FontFamily::Times),
    ("liberationserif", FontFamily::Times),
    ("nimbusroman", FontFamily::Times),
    ("nimbusromno9l", FontFamily::Times),
    ("serif", FontFamily::Times),
    ("courier", FontFamily::Courier),
    ("couriernew", FontFamily::Courier),
    ("couriernewps", FontFamily::Courier),
    ("couriernewpsmt", FontFamily::Courier),
    ("cousine", FontFamily::Courier),
    ("liberationmono", FontFamily::Courier),
    ("nimbusmono", FontFamily::Courier),
    ("nimbusmonol", FontFamily::Courier),
    ("monospace", FontFamily::Courier),
];

/// Map an extracted font family name to a standard family
///
/// Matching ignores case, spaces, hyphens and underscores. Unknown names
/// map to Helvetica.
pub fn canonical_family(name: &str) -> FontFamily {
    let normalized: String = name
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect();

    FAMILY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, family)| *family)
        .unwrap_or(FontFamily::Helvetica)
}

/// Standard font reproducing an extracted line's look
pub fn reconstruct_font(family_name: &str, style: FontStyle) -> StandardFont {
    let flags = FontStyle::BOLD | FontStyle::ITALIC | FontStyle::UNDERLINE | FontStyle::STRIKEOUT;
    StandardFont::new(canonical_family(family_name), style & flags)
}

fn is_left_aligned(bounds: &Rect, _page_width: f64) -> bool {
    bounds.x.abs() < ALIGNMENT_TOLERANCE
}

fn is_right_aligned(bounds: &Rect, page_width: f64) -> bool {
    (bounds.x + bounds.width - page_width).abs() < ALIGNMENT_TOLERANCE
}

fn is_centered(bounds: &Rect, page_width: f64) -> bool {
    (bounds.x - (page_width - bounds.width) / 2.0).abs() < ALIGNMENT_TOLERANCE
}

impl Alignment {
    /// Infer alignment from a match box; the first predicate that holds wins,
    /// checked in the order left, right, center
    pub fn infer(bounds: &Rect, page_width: f64) -> Self {
        let checks: [(fn(&Rect, f64) -> bool, Alignment); 3] = [
            (is_left_aligned, Alignment::Left),
            (is_right_aligned, Alignment::Right),
            (is_centered, Alignment::Center),
        ];

        checks
            .iter()
            .find(|(check, _)| check(bounds, page_width))
            .map(|(_, alignment)| *alignment)
            .unwrap_or(Alignment::Unset)
    }

    /// Alignment used for drawing; unset draws left aligned
    pub fn to_align(self) -> Align {
        match self {
            Alignment::Left | Alignment::Unset => Align::Left,
            Alignment::Right => Align::Right,
            Alignment::Center => Align::Center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_family_aliases() {
        assert_eq!(canonical_family("Arial"), FontFamily::Helvetica);
        assert_eq!(canonical_family("ArialMT"), FontFamily::Helvetica);
        assert_eq!(canonical_family("helvetica"), FontFamily::Helvetica);
        assert_eq!(canonical_family("Times New Roman"), FontFamily::Times);
        assert_eq!(canonical_family("TimesNewRomanPSMT"), FontFamily::Times);
        assert_eq!(canonical_family("TIMES"), FontFamily::Times);
        assert_eq!(canonical_family("Courier New"), FontFamily::Courier);
        assert_eq!(canonical_family("courier"), FontFamily::Courier);
    }

    #[test]
    fn test_canonical_family_defaults_to_helvetica() {
        assert_eq!(canonical_family("Garamond"), FontFamily::Helvetica);
        assert_eq!(canonical_family(""), FontFamily::Helvetica);
    }

    #[test]
    fn test_reconstruct_font() {
        let font = reconstruct_font("Times New Roman", FontStyle::BOLD | FontStyle::UNDERLINE);
        assert_eq!(font.family, FontFamily::Times);
        assert_eq!(font.style, FontStyle::BOLD | FontStyle::UNDERLINE);
    }

    #[test]
    fn test_left_alignment_only() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 10.0);
        // on a page exactly as wide as the box every predicate holds
        assert!(is_right_aligned(&bounds, 100.0));
        assert!(is_centered(&bounds, 100.0));
        assert_eq!(Alignment::infer(&bounds, 100.0), Alignment::Left);
    }

    #[test]
    fn test_center_alignment() {
        let bounds = Rect::new(45.0, 0.0, 10.0, 10.0);
        assert_eq!(Alignment::infer(&bounds, 100.0), Alignment::Center);
    }

    #[test]
    fn test_right_alignment() {
        let bounds = Rect::new(496.0, 0.0, 100.0, 10.0);
        assert_eq!(Alignment::infer(&bounds, 600.0), Alignment::Right);
    }

    #[test]
    fn test_unset_alignment() {
        let bounds = Rect::new(72.0, 0.0, 100.0, 10.0);
        assert_eq!(Alignment::infer(&bounds, 612.0), Alignment::Unset);
        assert_eq!(Alignment::Unset.to_align(), Align::Left);
    }

    #[test]
    fn test_tolerance_is_strict() {
        let bounds = Rect::new(5.0, 0.0, 10.0, 10.0);
        assert_eq!(Alignment::infer(&bounds, 600.0), Alignment::Unset);
    }
}
