//! ep-core: Editor Playground Core Library
//!
//! Session persistence, the message-log data model, and classification of
//! payloads exchanged with the embedded image editor.

pub mod config;
pub mod editor;
pub mod error;
pub mod message;
pub mod session;

pub use config::{AutosaveConfig, Config, EditorConfig, ServerConfig, StorageConfig};
pub use editor::EditorLaunchConfig;
pub use error::{Error, Result};
pub use message::{BinaryKind, Classification, InboundPayload, OriginFilter, PreviewRegistry, PreviewResource, classify};
pub use session::{
    AutosaveScheduler, DataType, Direction, LiveSession, MessageLogEntry, SessionMetadata, SessionRecord,
    SessionStore, SessionSummary,
};
