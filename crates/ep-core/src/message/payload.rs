//! Inbound payload types
//!
//! The browser relay forwards every `message` event from the editor as a
//! tagged JSON envelope; binary content travels base64-encoded.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Value the editor posts when it has finished running a script
pub const DONE_SENTINEL: &str = "done";

/// Concrete kind of a fixed-size binary buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryKind {
    ArrayBuffer,
    DataView,
    Int8Array,
    Uint8Array,
    Uint8ClampedArray,
    Int16Array,
    Uint16Array,
    Int32Array,
    Uint32Array,
    Float32Array,
    Float64Array,
    BigInt64Array,
    BigUint64Array,
}

impl BinaryKind {
    pub const ALL: [BinaryKind; 13] = [
        Self::ArrayBuffer,
        Self::DataView,
        Self::Int8Array,
        Self::Uint8Array,
        Self::Uint8ClampedArray,
        Self::Int16Array,
        Self::Uint16Array,
        Self::Int32Array,
        Self::Uint32Array,
        Self::Float32Array,
        Self::Float64Array,
        Self::BigInt64Array,
        Self::BigUint64Array,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ArrayBuffer => "ArrayBuffer",
            Self::DataView => "DataView",
            Self::Int8Array => "Int8Array",
            Self::Uint8Array => "Uint8Array",
            Self::Uint8ClampedArray => "Uint8ClampedArray",
            Self::Int16Array => "Int16Array",
            Self::Uint16Array => "Uint16Array",
            Self::Int32Array => "Int32Array",
            Self::Uint32Array => "Uint32Array",
            Self::Float32Array => "Float32Array",
            Self::Float64Array => "Float64Array",
            Self::BigInt64Array => "BigInt64Array",
            Self::BigUint64Array => "BigUint64Array",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// A payload received from the editor, one variant per runtime shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundPayload {
    /// Text, including the completion sentinel
    #[serde(rename = "string")]
    Text { value: String },

    /// ArrayBuffer or typed array
    Binary {
        #[serde(rename = "type")]
        kind: BinaryKind,
        #[serde(rename = "base64", with = "base64_bytes")]
        bytes: Vec<u8>,
    },

    /// Generic blob with an optional declared media type
    Blob {
        #[serde(rename = "base64", with = "base64_bytes")]
        bytes: Vec<u8>,
        #[serde(default, rename = "mediaType", skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
    },

    /// Structured value. `value` is absent when the sender could not
    /// serialize it; `repr` then carries its string coercion.
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        repr: Option<String>,
    },

    /// Non-finite values arrive as their literal (`"NaN"`, `"-Infinity"`),
    /// or as `null` from a plain `JSON.stringify`
    Number {
        #[serde(with = "number_literal")]
        value: f64,
    },

    Boolean { value: bool },

    /// Anything else (`undefined`, `null`, functions, symbols, ...)
    Other {
        #[serde(rename = "typeName")]
        type_name: String,
        repr: String,
    },
}

impl InboundPayload {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { value: value.into() }
    }

    pub fn binary(kind: BinaryKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Binary {
            kind,
            bytes: bytes.into(),
        }
    }

    pub fn blob(bytes: impl Into<Vec<u8>>, media_type: Option<&str>) -> Self {
        Self::Blob {
            bytes: bytes.into(),
            media_type: media_type.map(str::to_string),
        }
    }

    pub fn object(value: serde_json::Value) -> Self {
        Self::Object {
            value: Some(value),
            repr: None,
        }
    }

    /// Decode a relay envelope. Envelopes that do not match any variant
    /// become an opaque object carrying the raw JSON as its coercion.
    pub fn from_envelope(envelope: serde_json::Value) -> Self {
        match serde_json::from_value(envelope.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Unrecognized payload envelope: {}", e);
                Self::Object {
                    value: None,
                    repr: Some(envelope.to_string()),
                }
            }
        }
    }

    /// Whether this is the completion sentinel
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Text { value } if value == DONE_SENTINEL)
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(D::Error::custom)
    }
}

mod number_literal {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Finite(f64),
        Literal(String),
        Null(()),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value > 0.0 {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Wire::deserialize(deserializer)? {
            Wire::Finite(value) => Ok(value),
            Wire::Null(()) => Ok(f64::NAN),
            Wire::Literal(literal) => match literal.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid number literal {:?}", other))),
            },
        }
    }
}
