//! Session management module
//!
//! Provides the session record model, directory-backed persistence, the live
//! session attached to the editor, and deferred autosave.

mod autosave;
mod live;
mod store;
mod types;

pub use autosave::AutosaveScheduler;
pub use live::{LiveEntry, LiveSession};
pub use store::SessionStore;
pub use types::{
    DataType, Direction, MessageLogEntry, SESSION_ID_LEN, SessionMetadata, SessionRecord, SessionSummary,
    generate_session_id, is_valid_session_id,
};
