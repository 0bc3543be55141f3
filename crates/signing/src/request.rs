//! Inbound request and outbound result shapes

use crate::marker::{Graphic, Signature, SkipReason};
use crate::resolver::GlobalPoint;
use base64::Engine;
use serde::{Deserialize, Serialize, Serializer};
use template::SubstitutionReport;

/// Stacked placement of a signature, as sent by callers
pub type Coordinates = GlobalPoint;

/// A request to sign one document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
    pub document_id: String,
    pub signatures: Vec<SignatureRequest>,
    /// Carried through untouched; never verified
    #[serde(default)]
    pub certificate: String,
    /// Template data substituted before signing, see [`template::tokens_from_value`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<serde_json::Value>,
}

/// One signature as sent by callers
///
/// The mark is `base64Graphic` when present, otherwise `displayName`, and
/// otherwise the signer's name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    pub signer_id: String,
    #[serde(default)]
    pub signer_name: String,
    pub ip_address: String,
    pub coordinates: Coordinates,
    /// Base64 JPEG or PNG, optionally as a `data:` URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_graphic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SignatureRequest {
    /// Name shown for this signer
    pub fn display_name(&self) -> &str {
        [self.display_name.as_deref(), Some(self.signer_name.as_str())]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or(&self.signer_id)
    }

    /// Decode into a [`Signature`]
    ///
    /// Fails with a description when the graphic is not valid base64.
    pub fn to_signature(&self) -> std::result::Result<Signature, String> {
        let graphic = match &self.base64_graphic {
            Some(encoded) => Graphic::Image {
                data: decode_graphic(encoded)?,
                width: self.width,
                height: self.height,
            },
            None => Graphic::Name(self.display_name().to_string()),
        };

        Ok(Signature {
            signer_id: self.signer_id.clone(),
            signer_name: self.display_name().to_string(),
            origin: self.ip_address.clone(),
            placement: self.coordinates,
            graphic,
        })
    }
}

fn decode_graphic(encoded: &str) -> std::result::Result<Vec<u8>, String> {
    let payload = match encoded.split_once(',') {
        Some((header, payload)) if header.starts_with("data:") => payload,
        _ => encoded,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim().as_bytes())
        .map_err(|e| format!("Invalid base64: {e}"))
}

/// A signature that was not drawn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedRequest {
    /// Position of the signature in the request
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of a signing request
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SigningOutcome {
    pub success: bool,
    /// The edited PDF; base64 in JSON
    #[serde(serialize_with = "serialize_base64")]
    pub document: Vec<u8>,
    pub placed: usize,
    pub skipped: Vec<SkippedRequest>,
    pub substitutions: Vec<SubstitutionReport>,
    /// Index of the appended summary page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_page: Option<usize>,
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}
