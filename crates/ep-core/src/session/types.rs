//! Session types

use std::fmt;

use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

use crate::message::BinaryKind;

/// Length of a generated session identifier
pub const SESSION_ID_LEN: usize = 16;

const MAX_SESSION_ID_LEN: usize = 128;

/// Generate a random lowercase alphanumeric session identifier
pub fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Whether `id` can be used as a session file stem.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Which way a message travelled relative to the playground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Script posted into the editor iframe
    Sent,
    /// Payload posted back by the editor
    Received,
}

/// Coarse classification tag of a logged payload
///
/// Serialized as a bare string (`"done"`, `"Uint8Array"`, `"script"`, ...).
/// Tags this build does not know are kept verbatim in [`DataType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Done,
    String,
    Binary(BinaryKind),
    Blob,
    Object,
    Unknown,
    Number,
    Boolean,
    Script,
    Other(String),
}

impl DataType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Done => "done",
            Self::String => "string",
            Self::Binary(kind) => kind.name(),
            Self::Blob => "Blob",
            Self::Object => "object",
            Self::Unknown => "unknown",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Script => "script",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "done" => Self::Done,
            "string" => Self::String,
            "Blob" => Self::Blob,
            "object" => Self::Object,
            "unknown" => Self::Unknown,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "script" => Self::Script,
            other => match BinaryKind::from_name(other) {
                Some(kind) => Self::Binary(kind),
                None => Self::Other(value),
            },
        }
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        match value {
            DataType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded unit of communication with the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageLogEntry {
    /// Strictly increasing within a session
    pub id: u64,
    pub direction: Direction,
    /// Display rendering of the payload
    pub content: String,
    /// Best-effort full serialization of the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_string: Option<String>,
    pub data_type: DataType,
}

/// Editor configuration remembered with a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// Images handed to the editor on launch, in order
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Last editor source URL, launch configuration included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_url: Option<String>,
}

/// A persisted playground session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Unique session identifier, also the file stem on disk
    pub id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Message log in arrival order
    #[serde(default)]
    pub messages: Vec<MessageLogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SessionMetadata>,
}

impl SessionRecord {
    /// Create an empty session with a fresh random id
    pub fn new() -> Self {
        Self::with_id(generate_session_id())
    }

    /// Create an empty session with a caller-chosen id
    pub fn with_id(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            metadata: None,
        }
    }

    /// Get message count
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Highest message id in the log, if any
    pub fn last_message_id(&self) -> Option<u64> {
        self.messages.iter().map(|m| m.id).max()
    }

    /// Summary used by session listings
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.messages.len(),
            editor_url: self.metadata.as_ref().and_then(|m| m.editor_url.clone()),
        }
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Session information for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = SessionRecord::new();
        assert_eq!(session.id.len(), SESSION_ID_LEN);
        assert!(is_valid_session_id(&session.id));
        assert!(session.messages.is_empty());
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate_session_id(), generate_session_id());
    }

    #[test]
    fn test_session_id_validation() {
        assert!(is_valid_session_id("abc123"));
        assert!(is_valid_session_id("a-b_c"));
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id("../etc"));
        assert!(!is_valid_session_id("a/b"));
        assert!(!is_valid_session_id("a.json"));
        assert!(!is_valid_session_id(&"x".repeat(129)));
    }

    #[test]
    fn test_data_type_strings() {
        assert_eq!(DataType::from("done".to_string()), DataType::Done);
        assert_eq!(DataType::from("Uint8Array".to_string()), DataType::Binary(BinaryKind::Uint8Array));
        assert_eq!(DataType::from("custom".to_string()), DataType::Other("custom".to_string()));
        assert_eq!(String::from(DataType::Script), "script");
        assert_eq!(DataType::Binary(BinaryKind::ArrayBuffer).to_string(), "ArrayBuffer");
    }

    #[test]
    fn test_record_json_shape() {
        let json = r#"{
            "id": "abc123",
            "messages": [{"id": 1, "direction": "sent", "content": "x", "dataType": "script"}]
        }"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "abc123");
        assert_eq!(record.messages[0].direction, Direction::Sent);
        assert_eq!(record.messages[0].data_type, DataType::Script);
        assert!(record.messages[0].raw_string.is_none());

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["messages"][0]["dataType"], "script");
        assert!(value["messages"][0].get("rawString").is_none());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_summary() {
        let mut session = SessionRecord::with_id("s1");
        session.messages.push(MessageLogEntry {
            id: 7,
            direction: Direction::Received,
            content: "hi".to_string(),
            raw_string: Some("hi".to_string()),
            data_type: DataType::String,
        });
        session.metadata = Some(SessionMetadata {
            image_urls: vec![],
            editor_url: Some("https://www.photopea.com".to_string()),
        });

        let summary = session.summary();
        assert_eq!(summary.message_count, 1);
        assert_eq!(session.last_message_id(), Some(7));
        assert_eq!(summary.editor_url.as_deref(), Some("https://www.photopea.com"));
    }
}
