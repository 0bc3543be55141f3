//! Integration tests for token substitution on real PDFs

use lopdf::dictionary;
use pdf_core::{FontStyle, PdfDocument};
use pretty_assertions::assert_eq;
use template::{
    parse_tokens, Alignment, SubstitutionOptions, TemplateSubstitutor, TemplateToken,
    TextAnchor,
};

/// Build a PDF with one Letter page per content string
///
/// Fonts: /F1 Helvetica, /F2 a non-embedded "Arial,Bold" TrueType font.
fn create_template_pdf(contents: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let arial_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => "Arial,Bold",
        "FirstChar" => 32,
        "LastChar" => 32,
        "Widths" => vec![278.into()],
    });

    let mut page_ids = Vec::new();
    for content in contents {
        let contents_id = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            content.as_bytes().to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => helvetica, "F2" => arial_bold },
            },
            "Contents" => contents_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.into_iter().map(|id| id.into()).collect::<Vec<lopdf::Object>>(),
            "Count" => contents.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("Failed to build template PDF");
    buffer
}

fn open(contents: &[&str]) -> PdfDocument {
    PdfDocument::open_from_bytes(&create_template_pdf(contents)).expect("Failed to open PDF")
}

#[test]
fn test_substitute_line_in_place() {
    let mut doc = open(&[
        "BT /F1 12 Tf 72 700 Td (Dear {{name}},) Tj ET BT /F1 12 Tf 72 670 Td (Thank you.) Tj ET",
    ]);

    let report = TemplateSubstitutor::default()
        .substitute(&mut doc, &TemplateToken::new("{{name}}", "Ada Lovelace"))
        .expect("Failed to substitute");

    assert_eq!(report.matches, 1);
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].text, "Dear Ada Lovelace,");
    assert_eq!(report.applied[0].page_index, 0);

    let lines = doc.extract_lines(1).expect("Failed to extract lines");
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["Dear Ada Lovelace,", "Thank you."]);
    assert_eq!(lines[0].font_name, "Helvetica");
    assert_eq!(lines[0].font_size, 12.0);
}

#[test]
fn test_resubstitution_is_noop() {
    let mut doc = open(&["BT /F1 12 Tf 72 700 Td ({{name}}) Tj ET"]);
    let substitutor = TemplateSubstitutor::default();
    let token = TemplateToken::new("{{name}}", "Ada");

    substitutor.substitute(&mut doc, &token).expect("Failed to substitute");
    let lines_before = doc.extract_lines(1).expect("Failed to extract lines");
    let content_before = first_page_content(&doc.to_bytes().expect("Failed to save PDF"));

    let report = substitutor.substitute(&mut doc, &token).expect("Failed to substitute");
    assert_eq!(report.matches, 0);
    assert!(report.applied.is_empty());
    assert!(report.skipped.is_empty());
    assert_eq!(doc.pending_redactions(), 0);

    // Saved bytes are not stable across saves, so compare what the page shows
    assert_eq!(doc.extract_lines(1).expect("Failed to extract lines"), lines_before);
    assert_eq!(
        first_page_content(&doc.to_bytes().expect("Failed to save PDF")),
        content_before
    );
}

fn first_page_content(pdf: &[u8]) -> Vec<u8> {
    let doc = lopdf::Document::load_mem(pdf).expect("Failed to parse PDF");
    let page_id = doc.get_pages()[&1];
    doc.get_page_content(page_id).expect("Failed to read page content")
}

#[test]
fn test_style_is_reconstructed_from_font_name() {
    let mut doc = open(&["BT /F2 14 Tf 72 700 Td (Total: {{amount}}) Tj ET"]);

    TemplateSubstitutor::default()
        .substitute(&mut doc, &TemplateToken::new("{{amount}}", "$1,200"))
        .expect("Failed to substitute");

    let bytes = doc.to_bytes().expect("Failed to save PDF");
    let doc = PdfDocument::open_from_bytes(&bytes).expect("Failed to re-open PDF");
    let lines = doc.extract_lines(1).expect("Failed to extract lines");

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "Total: $1,200");
    // Arial maps to Helvetica; bold is kept
    assert_eq!(lines[0].font_name, "Helvetica");
    assert_eq!(lines[0].style, FontStyle::BOLD);
    assert_eq!(lines[0].font_size, 14.0);
}

#[test]
fn test_centered_title_stays_centered() {
    // "{{title}}" is 34.704pt wide in Helvetica 12
    let mut doc = open(&["BT /F1 12 Tf 288.648 750 Td ({{title}}) Tj ET"]);

    let report = TemplateSubstitutor::default()
        .substitute(&mut doc, &TemplateToken::new("{{title}}", "Service Agreement"))
        .expect("Failed to substitute");
    assert_eq!(report.applied[0].alignment, Alignment::Center);

    let line = doc.extract_lines(1).expect("Failed to extract lines")[0].clone();
    assert_eq!(line.text, "Service Agreement");
    let (center_x, _) = line.bounds.center();
    assert!((center_x - 306.0).abs() < 0.01);
}

#[test]
fn test_baseline_anchor_keeps_baseline() {
    let mut doc = open(&["BT /F2 14 Tf 72 700 Td (Ref {{ref}}) Tj ET"]);
    let original = doc.extract_lines(1).expect("Failed to extract lines")[0].clone();

    let options = SubstitutionOptions {
        anchor: TextAnchor::Baseline,
        ..Default::default()
    };
    TemplateSubstitutor::new(options)
        .substitute(&mut doc, &TemplateToken::new("{{ref}}", "A-17"))
        .expect("Failed to substitute");

    let line = doc.extract_lines(1).expect("Failed to extract lines")[0].clone();
    assert_eq!(line.text, "Ref A-17");
    assert!((line.baseline - original.baseline).abs() < 0.01);
}

#[test]
fn test_placeholder_split_across_lines_is_not_matched() {
    let mut doc = open(&[
        "BT /F1 12 Tf 72 700 Td ({{na) Tj ET BT /F1 12 Tf 72 680 Td (me}}) Tj ET",
    ]);
    let report = TemplateSubstitutor::default()
        .substitute(&mut doc, &TemplateToken::new("{{name}}", "x"))
        .expect("Failed to substitute");

    assert_eq!(report.matches, 0);
    assert!(report.applied.is_empty());
    assert!(report.skipped.is_empty());
    assert_eq!(
        doc.extract_text(1).expect("Failed to extract text"),
        "{{na\nme}}"
    );
}

#[test]
fn test_substitute_all_from_json_across_pages() {
    let mut doc = open(&[
        "BT /F1 12 Tf 72 700 Td (Client: {{client.name}}) Tj ET",
        "BT /F1 12 Tf 72 700 Td (Signed on {{date}} by {{client.name}}) Tj ET",
    ]);
    let tokens =
        parse_tokens(r#"{"client": {"name": "Jane Roe"}, "date": "2024-05-01"}"#)
            .expect("Failed to parse tokens");

    let reports = TemplateSubstitutor::default()
        .substitute_all(&mut doc, &tokens)
        .expect("Failed to substitute");

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].matches, 2);
    assert_eq!(reports[1].matches, 1);

    assert_eq!(
        doc.extract_text(1).expect("Failed to extract text"),
        "Client: Jane Roe"
    );
    assert_eq!(
        doc.extract_text(2).expect("Failed to extract text"),
        "Signed on 2024-05-01 by Jane Roe"
    );
}
