//! Integration tests for pdf-core
//!
//! These tests verify end-to-end functionality with real PDF operations.

use lopdf::dictionary;
use pdf_core::{
    Align, Color, FontFamily, FontStyle, PageSize, PdfDocument, PdfError, Rect, Redaction,
    RedactionFill, Replacement,
};
use pretty_assertions::assert_eq;

/// Create a PDF with one Letter page per content string
///
/// Every page shares a Helvetica resource named /F1.
fn create_test_pdf_with_content(contents: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
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
                "Font" => dictionary! { "F1" => font_id },
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
    doc.save_to(&mut buffer).expect("Failed to build test PDF");
    buffer
}

/// Create a minimal valid PDF with one empty page
fn create_test_pdf() -> Vec<u8> {
    create_test_pdf_with_content(&[""])
}

/// Create a minimal JPEG image for testing
fn create_test_jpeg() -> Vec<u8> {
    // Minimal JPEG with SOI, SOF0, and EOI markers
    vec![
        0xFF, 0xD8, // SOI marker
        0xFF, 0xC0, // SOF0 marker (baseline DCT)
        0x00, 0x11, // Length (17 bytes)
        0x08, // Precision (8 bits)
        0x00, 0x10, // Height (16 pixels)
        0x00, 0x20, // Width (32 pixels)
        0x03, // Number of components (RGB)
        0x01, 0x22, 0x00, // Component 1 (Y, subsampling 2x2)
        0x02, 0x11, 0x01, // Component 2 (Cb, subsampling 2x1)
        0x03, 0x11, 0x01, // Component 3 (Cr, subsampling 2x1)
        0xFF, 0xD9, // EOI marker
    ]
}

/// Create a 40x20 RGBA PNG with a transparent half
fn create_test_png() -> Vec<u8> {
    use image::{ImageBuffer, Rgba};

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(40, 20, |x, _| {
        if x < 20 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let mut buffer = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )
    .expect("Failed to create PNG");
    buffer
}

fn reopen(doc: &mut PdfDocument) -> PdfDocument {
    let bytes = doc.to_bytes().expect("Failed to save PDF");
    PdfDocument::open_from_bytes(&bytes).expect("Failed to re-open PDF")
}

#[test]
fn test_open_save_roundtrip() {
    let pdf_data = create_test_pdf();

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).expect("Failed to open PDF");
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.page_size(1).expect("Failed to read page size"), PageSize::LETTER);

    let doc2 = reopen(&mut doc);
    assert_eq!(doc2.page_count(), 1);
}

#[test]
fn test_open_garbage_fails() {
    let result = PdfDocument::open_from_bytes(b"definitely not a pdf");
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_password_protected_rejected() {
    let mut doc = lopdf::Document::load_mem(&create_test_pdf()).expect("Failed to parse PDF");
    doc.trailer.set(
        "Encrypt",
        dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
        },
    );
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("Failed to save PDF");

    let result = PdfDocument::open_from_bytes(&buffer);
    assert!(matches!(result, Err(PdfError::PasswordProtected)));
}

#[test]
fn test_encrypt_in_page_text_is_not_encryption() {
    let pdf =
        create_test_pdf_with_content(&["BT /F1 12 Tf 72 700 Td (See /Encrypt entry) Tj ET"]);

    let doc = PdfDocument::open_from_bytes(&pdf).expect("Failed to open unencrypted PDF");
    assert_eq!(
        doc.extract_text(1).expect("Failed to extract text"),
        "See /Encrypt entry"
    );
}

#[test]
fn test_inserted_text_is_extractable() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    doc.set_font(FontFamily::Times, 14.0);
    doc.set_font_style(FontStyle::ITALIC | FontStyle::UNDERLINE);
    doc.insert_text("Signed copy", 1, 100.0, 50.0, Align::Left)
        .expect("Failed to insert text");

    let doc = reopen(&mut doc);
    let lines = doc.extract_lines(1).expect("Failed to extract lines");

    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line.text, "Signed copy");
    assert_eq!(line.font_name, "Times");
    assert_eq!(line.font_size, 14.0);
    assert_eq!(line.style, FontStyle::ITALIC | FontStyle::UNDERLINE);
    assert!((line.bounds.x - 100.0).abs() < 0.01);
    assert!((line.bounds.y - 50.0).abs() < 0.01);
}

#[test]
fn test_insert_text_alignment() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    doc.set_font(FontFamily::Helvetica, 12.0);
    let width = doc.get_text_width("Total");

    doc.insert_text("Total", 1, 300.0, 100.0, Align::Center)
        .expect("Failed to insert centered text");
    doc.insert_text("Total", 1, 300.0, 200.0, Align::Right)
        .expect("Failed to insert right-aligned text");

    let doc = reopen(&mut doc);
    let lines = doc.extract_lines(1).expect("Failed to extract lines");
    assert_eq!(lines.len(), 2);
    assert!((lines[0].bounds.x - (300.0 - width / 2.0)).abs() < 0.01);
    assert!((lines[1].bounds.right() - 300.0).abs() < 0.01);
}

#[test]
fn test_text_color() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    doc.set_text_color(Color::red());
    doc.insert_text("Void", 1, 72.0, 72.0, Align::Left)
        .expect("Failed to insert text");

    let bytes = doc.to_bytes().expect("Failed to save PDF");
    let content = String::from_utf8_lossy(&bytes);
    assert!(content.contains("1 0 0 rg"));
}

#[test]
fn test_invalid_page_number() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");

    let result = doc.insert_text("Test", 999, 100.0, 700.0, Align::Left);
    match result {
        Err(PdfError::InvalidPage(page, total)) => {
            assert_eq!(page, 999);
            assert_eq!(total, 1);
        }
        other => panic!("Expected InvalidPage error, got {other:?}"),
    }

    assert!(doc.insert_text("Test", 0, 1.0, 1.0, Align::Left).is_err());
}

#[test]
fn test_empty_text() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    doc.insert_text("", 1, 100.0, 700.0, Align::Left)
        .expect("Failed to insert empty text");

    let doc = reopen(&mut doc);
    assert!(doc.extract_lines(1).expect("Failed to extract lines").is_empty());
}

#[test]
fn test_insert_image_jpeg() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    let (width, height) = doc
        .insert_image(&create_test_jpeg(), 1, 10.0, 10.0, None, None)
        .expect("Failed to insert JPEG image");

    assert_eq!((width, height), (32.0, 16.0));
    assert!(!doc.to_bytes().expect("Failed to save PDF").is_empty());
}

#[test]
fn test_insert_image_png_with_alpha() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    doc.insert_image(&create_test_png(), 1, 100.0, 100.0, Some(80.0), Some(40.0))
        .expect("Failed to insert PNG image");

    let bytes = doc.to_bytes().expect("Failed to save PDF");
    let saved = lopdf::Document::load_mem(&bytes).expect("Failed to parse saved PDF");
    let has_soft_mask = saved.objects.values().any(|obj| {
        obj.as_stream()
            .map(|s| s.dict.get(b"SMask").is_ok())
            .unwrap_or(false)
    });
    assert!(has_soft_mask);
}

#[test]
fn test_insert_image_keeps_aspect_ratio() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    let drawn = doc
        .insert_image(&create_test_png(), 1, 0.0, 0.0, Some(80.0), None)
        .expect("Failed to insert PNG image");
    assert_eq!(drawn, (80.0, 40.0));
}

#[test]
fn test_invalid_image_data() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    let result = doc.insert_image(b"not an image", 1, 0.0, 0.0, Some(10.0), Some(10.0));
    assert!(matches!(result, Err(PdfError::ImageError(_))));
}

#[test]
fn test_embedded_image_is_reused() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");
    let png = create_test_png();

    let page = doc.add_page(PageSize::A4).expect("Failed to add page");
    for page in [1, page] {
        let drawn = doc
            .insert_image(&png, page, 10.0, 10.0, None, None)
            .expect("Failed to insert PNG image");
        assert_eq!(drawn, (40.0, 20.0));
    }

    let bytes = doc.to_bytes().expect("Failed to save PDF");
    let saved = lopdf::Document::load_mem(&bytes).expect("Failed to parse saved PDF");
    // the image and its soft mask
    let images = saved
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|s| matches!(s.dict.get(b"Subtype").and_then(|o| o.as_name()), Ok(b"Image")))
        .count();
    assert_eq!(images, 2);
}

#[test]
fn test_add_page_and_draw() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).expect("Failed to open PDF");

    let page = doc.add_page(PageSize::new(300.0, 400.0)).expect("Failed to add page");
    assert_eq!(page, 2);
    assert_eq!(doc.page_count(), 2);
    assert_eq!(
        doc.page_sizes().expect("Failed to read sizes"),
        vec![PageSize::LETTER, PageSize::new(300.0, 400.0)]
    );

    doc.draw_rectangle(page, Rect::new(2.0, 2.0, 296.0, 396.0), 1.0, Color::black())
        .expect("Failed to draw rectangle");
    doc.insert_text("New page", page, 10.0, 10.0, Align::Left)
        .expect("Failed to insert text");

    let doc = reopen(&mut doc);
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.extract_text(2).expect("Failed to extract text"), "New page");
}

#[test]
fn test_existing_text_keeps_its_state() {
    // The page content leaves a scaled CTM behind; appended text must not inherit it
    let pdf_data = create_test_pdf_with_content(&["2 0 0 2 0 0 cm BT /F1 10 Tf 36 350 Td (Old) Tj ET"]);
    let mut doc = PdfDocument::open_from_bytes(&pdf_data).expect("Failed to open PDF");
    doc.set_font(FontFamily::Helvetica, 10.0);
    doc.insert_text("New", 1, 72.0, 300.0, Align::Left)
        .expect("Failed to insert text");

    let doc = reopen(&mut doc);
    let lines = doc.extract_lines(1).expect("Failed to extract lines");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].font_size, 20.0);
    assert_eq!(lines[1].text, "New");
    assert_eq!(lines[1].font_size, 10.0);
}

#[test]
fn test_find_text_across_pages() {
    let pdf_data = create_test_pdf_with_content(&[
        "BT /F1 12 Tf 72 700 Td (Client: {{client}}) Tj ET",
        "BT /F1 12 Tf 72 700 Td (Nothing here) Tj ET",
        "BT /F1 12 Tf 72 700 Td ({{client}} and {{client}}) Tj ET",
    ]);
    let doc = PdfDocument::open_from_bytes(&pdf_data).expect("Failed to open PDF");

    let hits = doc.find_text("{{client}}").expect("Failed to search");
    assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(hits[&3].len(), 2);
}

#[test]
fn test_redact_and_replace_line() {
    let pdf_data = create_test_pdf_with_content(&[
        "BT /F1 12 Tf 72 700 Td (Dear {{name}},) Tj ET BT /F1 12 Tf 72 680 Td (Regards) Tj ET",
    ]);
    let mut doc = PdfDocument::open_from_bytes(&pdf_data).expect("Failed to open PDF");

    let line = doc.extract_lines(1).expect("Failed to extract")[0].clone();
    doc.record_redaction(
        1,
        Redaction::new(line.bounds)
            .with_fill(RedactionFill::Opaque(Color::white()))
            .with_replacement(Replacement::new("Dear Ada Lovelace,")),
    )
    .expect("Failed to record redaction");
    assert_eq!(doc.commit_redactions().expect("Failed to commit"), 1);

    let doc = reopen(&mut doc);
    assert_eq!(
        doc.extract_text(1).expect("Failed to extract text"),
        "Dear Ada Lovelace,\nRegards"
    );
    assert!(doc.find_text("{{name}}").expect("Failed to search").is_empty());
}

#[test]
fn test_uncommitted_redactions_are_not_applied() {
    let pdf_data = create_test_pdf_with_content(&["BT /F1 12 Tf 72 700 Td (Secret) Tj ET"]);
    let mut doc = PdfDocument::open_from_bytes(&pdf_data).expect("Failed to open PDF");

    doc.record_redaction(1, Redaction::new(Rect::new(0.0, 0.0, 612.0, 792.0)))
        .expect("Failed to record redaction");
    assert_eq!(doc.pending_redactions(), 1);

    let doc = reopen(&mut doc);
    assert_eq!(doc.extract_text(1).expect("Failed to extract text"), "Secret");
}
