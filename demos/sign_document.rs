//! Sign Document - runs a signing request against a PDF
//!
//! This example shows:
//! - Template token substitution from request data
//! - Signatures placed by stacked document coordinates
//! - The trailing summary page
//!
//! Run with:
//!   cargo run --example sign_document -p signing
//!   cargo run --example sign_document -p signing -- input.pdf request.json [options.json]
//!
//! Set RUST_LOG=debug to see every placement and substitution.

use lopdf::dictionary;
use signing::{sign_document, SigningOptions, SigningRequest};

const SAMPLE_REQUEST: &str = r#"{
    "documentId": "sample-lease",
    "certificate": "",
    "tokens": {
        "tenant": { "name": "Ada Lovelace" },
        "start": "1 June 2024"
    },
    "signatures": [
        {
            "signerId": "1",
            "signerName": "Ada Lovelace",
            "ipAddress": "192.0.2.10",
            "coordinates": { "x": 72, "y": 600 }
        },
        {
            "signerId": "2",
            "signerName": "Jonathan Livingston Seagull",
            "ipAddress": "192.0.2.11",
            "coordinates": { "x": 72, "y": 1000 }
        }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (pdf, request_json, options) = match args.as_slice() {
        [] => (create_sample_pdf()?, SAMPLE_REQUEST.to_string(), SigningOptions::default()),
        [pdf, request] => (
            std::fs::read(pdf)?,
            std::fs::read_to_string(request)?,
            SigningOptions::default(),
        ),
        [pdf, request, options] => (
            std::fs::read(pdf)?,
            std::fs::read_to_string(request)?,
            SigningOptions::from_json(&std::fs::read_to_string(options)?)?,
        ),
        _ => return Err("usage: sign_document [input.pdf request.json [options.json]]".into()),
    };

    let request: SigningRequest = serde_json::from_str(&request_json)?;
    let outcome = sign_document(&pdf, &request, &options)?;

    for report in &outcome.substitutions {
        println!(
            "{}: {} of {} matches replaced",
            report.placeholder,
            report.applied.len(),
            report.matches
        );
    }
    println!("{} signatures placed", outcome.placed);
    for skipped in &outcome.skipped {
        println!("signature {} skipped: {:?}", skipped.index, skipped.reason);
    }

    std::fs::create_dir_all("output")?;
    std::fs::write("output/signed.pdf", &outcome.document)?;
    println!("Saved output/signed.pdf");
    Ok(())
}

/// Two Letter pages of template text
fn create_sample_pdf() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let pages = [
        "BT /F1 20 Tf 223.3 740 Td (Residential Lease) Tj ET \
         BT /F1 12 Tf 72 680 Td (This lease is made with {{tenant.name}}, starting {{start}}.) Tj ET",
        "BT /F1 12 Tf 72 700 Td (Signed by the tenant {{tenant.name}}:) Tj ET",
    ];

    let mut page_ids = Vec::new();
    for content in pages {
        let contents_id = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            content.as_bytes().to_vec(),
        ));
        page_ids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => contents_id,
        }));
    }

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_ids.len() as i64,
            "Kids" => page_ids.into_iter().map(|id| id.into()).collect::<Vec<lopdf::Object>>(),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
