//! Payload classification
//!
//! Turns an inbound payload into the display string, type tag, and raw
//! serialization stored in the message log.

use crate::message::payload::{BinaryKind, DONE_SENTINEL, InboundPayload};
use crate::message::preview::PreviewResource;
use crate::session::DataType;

/// Bytes shown in the display content of a binary payload
pub const CONTENT_HEX_BYTES: usize = 20;
/// Bytes included in the raw string of a binary payload
pub const RAW_HEX_BYTES: usize = 50;

const ELLIPSIS: &str = "…";
const DONE_CONTENT: &str = "Done";

/// Result of classifying one payload
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub content: String,
    pub data_type: DataType,
    pub raw_string: String,
    /// Present for binary and blob payloads; the caller registers it
    pub preview: Option<PreviewResource>,
}

impl Classification {
    fn plain(content: String, data_type: DataType) -> Self {
        Self {
            raw_string: content.clone(),
            content,
            data_type,
            preview: None,
        }
    }
}

/// Classify a payload received from the editor
pub fn classify(payload: InboundPayload) -> Classification {
    match payload {
        InboundPayload::Text { value } if value == DONE_SENTINEL => Classification {
            content: DONE_CONTENT.to_string(),
            data_type: DataType::Done,
            raw_string: value,
            preview: None,
        },
        InboundPayload::Text { value } => Classification::plain(value, DataType::String),
        InboundPayload::Binary { kind, bytes } => classify_binary(kind, bytes),
        InboundPayload::Blob { bytes, media_type } => classify_blob(bytes, media_type),
        InboundPayload::Object { value, repr } => classify_object(value, repr),
        InboundPayload::Number { value } => Classification::plain(number_literal(value), DataType::Number),
        InboundPayload::Boolean { value } => Classification::plain(value.to_string(), DataType::Boolean),
        InboundPayload::Other { type_name, repr } => Classification::plain(repr, DataType::from(type_name)),
    }
}

fn classify_binary(kind: BinaryKind, bytes: Vec<u8>) -> Classification {
    let preview_hex = hex_preview(&bytes, CONTENT_HEX_BYTES);
    let content = if preview_hex.is_empty() {
        format!("{} bytes", bytes.len())
    } else {
        format!("{} bytes: {}", bytes.len(), preview_hex)
    };

    Classification {
        content,
        data_type: DataType::Binary(kind),
        raw_string: hex_preview(&bytes, RAW_HEX_BYTES),
        preview: Some(PreviewResource::sniffed(bytes, kind.name())),
    }
}

fn classify_blob(bytes: Vec<u8>, media_type: Option<String>) -> Classification {
    let declared = media_type.as_deref().filter(|m| !m.trim().is_empty());
    let content = format!(
        "Blob: {} bytes, type {}",
        bytes.len(),
        declared.unwrap_or("unknown type")
    );

    Classification {
        raw_string: content.clone(),
        content,
        data_type: DataType::Blob,
        preview: Some(PreviewResource::declared(bytes, declared, "Blob")),
    }
}

fn classify_object(value: Option<serde_json::Value>, repr: Option<String>) -> Classification {
    let Some(value) = value else {
        let coerced = repr.unwrap_or_else(|| "[object Object]".to_string());
        return Classification::plain(coerced, DataType::Unknown);
    };

    match serde_json::to_string_pretty(&value) {
        Ok(pretty) => Classification::plain(pretty, DataType::Object),
        Err(_) => Classification::plain(repr.unwrap_or_else(|| value.to_string()), DataType::Unknown),
    }
}

/// Lowercase space-separated hex of the first `limit` bytes, with an
/// ellipsis when the input is longer
pub fn hex_preview(bytes: &[u8], limit: usize) -> String {
    let mut out = bytes
        .iter()
        .take(limit)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");
    if bytes.len() > limit {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Textual form of a number as the editor's runtime prints it: shortest
/// round-trip digits, exponent notation outside `[1e-6, 1e21)`
fn number_literal(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if value == 0.0 {
        "0".to_string()
    } else if (1e-6..1e21).contains(&value.abs()) {
        value.to_string()
    } else {
        let scientific = format!("{:e}", value);
        match scientific.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => scientific,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_text() {
        let c = classify(InboundPayload::text("hello"));
        assert_eq!(c.content, "hello");
        assert_eq!(c.data_type, DataType::String);
        assert_eq!(c.raw_string, "hello");
        assert!(c.preview.is_none());
    }

    #[test]
    fn test_classify_done_sentinel() {
        let c = classify(InboundPayload::text("done"));
        assert_eq!(c.data_type, DataType::Done);
        assert_eq!(c.content, "Done");

        // Only the exact sentinel counts
        assert_eq!(classify(InboundPayload::text("done ")).data_type, DataType::String);
        assert_eq!(classify(InboundPayload::text("Done")).data_type, DataType::String);
    }

    #[test]
    fn test_classify_empty_binary() {
        let c = classify(InboundPayload::binary(BinaryKind::ArrayBuffer, Vec::new()));
        assert_eq!(c.data_type, DataType::Binary(BinaryKind::ArrayBuffer));
        assert_eq!(c.raw_string, "");
        assert_eq!(c.content, "0 bytes");
        assert!(!c.content.contains(ELLIPSIS));
        assert!(c.preview.is_some());
    }

    #[test]
    fn test_classify_short_binary() {
        let c = classify(InboundPayload::binary(BinaryKind::Uint8Array, vec![0x00, 0x0f, 0xff]));
        assert_eq!(c.content, "3 bytes: 00 0f ff");
        assert_eq!(c.raw_string, "00 0f ff");
        assert_eq!(c.data_type.as_str(), "Uint8Array");
    }

    #[test]
    fn test_classify_long_binary_truncates() {
        let bytes: Vec<u8> = (0..60).collect();
        let c = classify(InboundPayload::binary(BinaryKind::ArrayBuffer, bytes.clone()));

        assert!(c.content.starts_with("60 bytes: 00 01 02"));
        assert!(c.content.ends_with("13…"));
        assert_eq!(c.content.matches(' ').count(), 2 + (CONTENT_HEX_BYTES - 1));

        assert!(c.raw_string.ends_with("31…"));
        assert_eq!(c.raw_string.split(' ').count(), RAW_HEX_BYTES);

        let preview = c.preview.unwrap();
        assert_eq!(preview.bytes, bytes);
        assert_eq!(preview.label, "arraybuffer");
    }

    #[test]
    fn test_hex_preview_exact_limit() {
        let bytes = vec![0xab; CONTENT_HEX_BYTES];
        let hex = hex_preview(&bytes, CONTENT_HEX_BYTES);
        assert!(!hex.ends_with(ELLIPSIS));
        assert_eq!(hex.split(' ').count(), CONTENT_HEX_BYTES);
    }

    #[test]
    fn test_classify_blob() {
        let c = classify(InboundPayload::blob(vec![1, 2, 3, 4], Some("image/png")));
        assert_eq!(c.data_type, DataType::Blob);
        assert_eq!(c.content, "Blob: 4 bytes, type image/png");
        assert_eq!(c.preview.unwrap().media_type, mime::IMAGE_PNG);

        let untyped = classify(InboundPayload::blob(vec![], None));
        assert_eq!(untyped.content, "Blob: 0 bytes, type unknown type");
        assert_eq!(untyped.preview.unwrap().media_type, mime::APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn test_classify_object() {
        let c = classify(InboundPayload::object(json!({"layers": 2, "name": "doc"})));
        assert_eq!(c.data_type, DataType::Object);
        assert!(c.content.contains("\n"));
        assert!(c.content.contains("\"layers\": 2"));
        assert_eq!(c.raw_string, c.content);

        let array = classify(InboundPayload::object(json!([1, 2])));
        assert_eq!(array.data_type, DataType::Object);
    }

    #[test]
    fn test_classify_unserializable_object() {
        let c = classify(InboundPayload::Object {
            value: None,
            repr: Some("[object Window]".to_string()),
        });
        assert_eq!(c.data_type, DataType::Unknown);
        assert_eq!(c.content, "[object Window]");

        let bare = classify(InboundPayload::Object { value: None, repr: None });
        assert_eq!(bare.content, "[object Object]");
    }

    #[test]
    fn test_classify_primitives() {
        let n = classify(InboundPayload::Number { value: 42.0 });
        assert_eq!(n.data_type, DataType::Number);
        assert_eq!(n.content, "42");
        assert_eq!(classify(InboundPayload::Number { value: 1.5 }).content, "1.5");
        assert_eq!(classify(InboundPayload::Number { value: -0.0 }).content, "0");
        assert_eq!(classify(InboundPayload::Number { value: 0.000001 }).content, "0.000001");
        assert_eq!(classify(InboundPayload::Number { value: 1e20 }).content, "100000000000000000000");
        assert_eq!(classify(InboundPayload::Number { value: f64::NAN }).content, "NaN");
        assert_eq!(classify(InboundPayload::Number { value: f64::NEG_INFINITY }).content, "-Infinity");

        let b = classify(InboundPayload::Boolean { value: true });
        assert_eq!(b.data_type, DataType::Boolean);
        assert_eq!(b.content, "true");
    }

    #[test]
    fn test_number_exponent_form() {
        assert_eq!(number_literal(1e21), "1e+21");
        assert_eq!(number_literal(-2.5e30), "-2.5e+30");
        assert_eq!(number_literal(1e-7), "1e-7");
        assert_eq!(number_literal(1.5e-7), "1.5e-7");
    }

    #[test]
    fn test_other_type_name_matching_known_tag() {
        let c = classify(InboundPayload::Other {
            type_name: "string".to_string(),
            repr: "x".to_string(),
        });
        assert_eq!(c.data_type, DataType::String);

        let blob = classify(InboundPayload::Other {
            type_name: "Blob".to_string(),
            repr: "[object Blob]".to_string(),
        });
        assert_eq!(blob.data_type, DataType::Blob);
    }

    #[test]
    fn test_classify_other() {
        let c = classify(InboundPayload::Other {
            type_name: "undefined".to_string(),
            repr: "undefined".to_string(),
        });
        assert_eq!(c.data_type, DataType::Other("undefined".to_string()));
        assert_eq!(c.content, "undefined");
    }
}
