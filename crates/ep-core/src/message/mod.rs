//! Messages exchanged with the embedded editor
//!
//! Provides the inbound payload model, classification into log entries,
//! preview handles for binary content, and origin filtering.

mod classify;
mod origin;
mod payload;
mod preview;

pub use classify::{CONTENT_HEX_BYTES, Classification, RAW_HEX_BYTES, classify, hex_preview};
pub use origin::OriginFilter;
pub use payload::{BinaryKind, DONE_SENTINEL, InboundPayload};
pub use preview::{PreviewRegistry, PreviewResource, sniff_media_type};
