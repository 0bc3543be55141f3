//! Signing configuration

use crate::Result;
use pdf_core::{FontFamily, FontStyle, PageSize, StandardFont};
use serde::{Deserialize, Serialize};
use template::style::canonical_family;
use template::SubstitutionOptions;

/// Layout of signature marks and the summary page
///
/// Offsets are in points from the top-left corner of the summary page.
/// Each signature row starts at a running cursor; its lines sit at the
/// cursor plus the corresponding offset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerConfig {
    pub page_width: f64,
    pub page_height: f64,

    /// Top-left corner of the border; the border is as large as the page
    pub border_inset: f64,
    pub border_width: f64,

    pub heading: String,
    pub heading_x: f64,
    pub heading_y: f64,

    /// Standard font family for the heading and row labels
    pub label_font: String,
    pub label_size: f32,
    pub margin_x: f64,

    pub origin_label: String,
    pub signer_label: String,
    pub signature_label: String,

    pub origin_offset: f64,
    pub signer_offset: f64,
    pub signature_label_offset: f64,
    pub mark_offset: f64,
    pub row_height: f64,

    /// Standard font family for rendered names
    pub name_font: String,
    pub name_italic: bool,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            page_width: PageSize::A4.width,
            page_height: PageSize::A4.height,
            border_inset: 2.0,
            border_width: 1.0,
            heading: "Summary Page".to_string(),
            heading_x: 10.0,
            heading_y: 10.0,
            label_font: "Helvetica".to_string(),
            label_size: 16.0,
            margin_x: 10.0,
            origin_label: "IP Address:".to_string(),
            signer_label: "Signed By:".to_string(),
            signature_label: "Signature:".to_string(),
            origin_offset: 40.0,
            signer_offset: 80.0,
            signature_label_offset: 120.0,
            mark_offset: 140.0,
            row_height: 200.0,
            name_font: "Times".to_string(),
            name_italic: true,
        }
    }
}

impl MarkerConfig {
    pub fn page_size(&self) -> PageSize {
        PageSize::new(self.page_width, self.page_height)
    }

    pub fn label_family(&self) -> FontFamily {
        canonical_family(&self.label_font)
    }

    /// Font for rendered signature names
    pub fn name_font(&self) -> StandardFont {
        let style = if self.name_italic {
            FontStyle::ITALIC
        } else {
            FontStyle::empty()
        };
        StandardFont::new(canonical_family(&self.name_font), style)
    }
}

/// What happens when a signature graphic cannot be decoded
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MalformedGraphicPolicy {
    /// Fail the whole request
    #[default]
    Abort,
    /// Skip that signature and continue
    Skip,
}

/// Options for [`sign_document`](crate::sign_document)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SigningOptions {
    pub marker: MarkerConfig,
    pub substitution: SubstitutionOptions,
    pub malformed_graphic: MalformedGraphicPolicy,
    /// Append the summary page after placing signatures
    pub summary_page: bool,
}

impl Default for SigningOptions {
    fn default() -> Self {
        Self {
            marker: MarkerConfig::default(),
            substitution: SubstitutionOptions::default(),
            malformed_graphic: MalformedGraphicPolicy::default(),
            summary_page: true,
        }
    }
}

impl SigningOptions {
    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_marker_defaults() {
        let config = MarkerConfig::default();
        assert_eq!(config.page_size(), PageSize::A4);
        assert_eq!(config.heading, "Summary Page");
        assert_eq!(config.label_family(), FontFamily::Helvetica);
        assert_eq!(config.row_height, 200.0);
        assert_eq!(
            config.name_font(),
            StandardFont::new(FontFamily::Times, FontStyle::ITALIC)
        );
    }

    #[test]
    fn test_options_from_partial_json() {
        let options = SigningOptions::from_json(
            r#"{
                "malformedGraphic": "skip",
                "marker": { "rowHeight": 150, "nameFont": "Courier New", "nameItalic": false },
                "substitution": { "fill": "transparent" }
            }"#,
        )
        .unwrap();

        assert_eq!(options.malformed_graphic, MalformedGraphicPolicy::Skip);
        assert_eq!(options.marker.row_height, 150.0);
        assert_eq!(options.marker.heading, "Summary Page");
        assert_eq!(
            options.marker.name_font(),
            StandardFont::new(FontFamily::Courier, FontStyle::empty())
        );
        assert_eq!(options.substitution.fill, template::FillMode::Transparent);
        assert!(options.summary_page);
    }

    #[test]
    fn test_options_reject_bad_json() {
        assert!(matches!(
            SigningOptions::from_json("{ nope"),
            Err(crate::SigningError::Json(_))
        ));
    }
}
