//! Textual wire form of model artifacts.
//!
//! A single artifact crosses the wire as the base64 text of its opaque
//! payload. The whole pool crosses the wire as one base64 string wrapping a
//! JSON list of `{producer, model_b64}` entries.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::CodecErr;

/// An opaque serialized trained model plus the identity of its producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub producer: String,
    pub payload: Vec<u8>,
}

impl Artifact {
    pub fn new(producer: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            producer: producer.into(),
            payload,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct BundleEntry {
    producer: String,
    model_b64: String,
}

/// Encodes an opaque payload as text.
pub fn encode_payload(payload: &[u8]) -> String {
    STANDARD.encode(payload)
}

/// Decodes the text produced by `encode_payload`.
///
/// # Errors
/// A `CodecErr` if the text is not valid base64.
pub fn decode_payload(text: &str) -> Result<Vec<u8>, CodecErr> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Encodes the full pool into a single string.
///
/// # Returns
/// The encoded bundle, or an empty string if there are no artifacts.
pub fn encode_bundle(artifacts: &[Artifact]) -> String {
    if artifacts.is_empty() {
        return String::new();
    }

    let entries: Vec<_> = artifacts
        .iter()
        .map(|a| BundleEntry {
            producer: a.producer.clone(),
            model_b64: encode_payload(&a.payload),
        })
        .collect();

    let json = serde_json::to_vec(&entries).expect("bundle entries only hold strings");
    STANDARD.encode(json)
}

/// Decodes a bundle produced by `encode_bundle`.
///
/// # Errors
/// A `CodecErr` if the outer text or any inner payload is malformed.
pub fn decode_bundle(text: &str) -> Result<Vec<Artifact>, CodecErr> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let json = STANDARD.decode(text.trim())?;
    let entries: Vec<BundleEntry> = serde_json::from_slice(&json)?;

    entries
        .into_iter()
        .map(|e| {
            Ok(Artifact {
                producer: e.producer,
                payload: decode_payload(&e.model_b64)?,
            })
        })
        .collect()
}
