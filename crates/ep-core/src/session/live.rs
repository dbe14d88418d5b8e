//! Live session state
//!
//! The session currently attached to the editor: its persistable record, the
//! message id counter, and the transient per-entry data (arrival time,
//! preview handle) that never reaches disk.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::Result;
use crate::editor::EditorLaunchConfig;
use crate::message::{InboundPayload, PreviewRegistry, classify};
use crate::session::{DataType, Direction, MessageLogEntry, SessionMetadata, SessionRecord};

#[derive(Debug, Clone, Default)]
struct Transient {
    at: Option<DateTime<Utc>>,
    preview: Option<String>,
}

/// Read-only view of one log entry with its transient data
#[derive(Debug, Clone, Copy)]
pub struct LiveEntry<'a> {
    pub entry: &'a MessageLogEntry,
    /// Arrival time; unknown for entries loaded from disk
    pub at: Option<DateTime<Utc>>,
    pub preview: Option<&'a str>,
}

/// The session currently attached to the editor
#[derive(Debug)]
pub struct LiveSession {
    record: SessionRecord,
    next_id: u64,
    transient: HashMap<u64, Transient>,
}

impl LiveSession {
    /// Start a fresh session pointed at `editor_url`
    pub fn new(editor_url: impl Into<String>) -> Self {
        let mut record = SessionRecord::new();
        record.metadata = Some(SessionMetadata {
            image_urls: Vec::new(),
            editor_url: Some(editor_url.into()),
        });
        Self::resume(record)
    }

    /// Continue a stored session; new ids follow the highest stored one
    pub fn resume(record: SessionRecord) -> Self {
        let next_id = record.last_message_id().map_or(1, |id| id + 1);
        Self {
            record,
            next_id,
            transient: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Persistable copy of the current state
    pub fn snapshot(&self) -> SessionRecord {
        self.record.clone()
    }

    pub fn editor_url(&self) -> Option<&str> {
        self.record.metadata.as_ref().and_then(|m| m.editor_url.as_deref())
    }

    /// Entries in arrival order with their transient data
    pub fn entries(&self) -> impl Iterator<Item = LiveEntry<'_>> {
        self.record.messages.iter().map(|entry| {
            let transient = self.transient.get(&entry.id);
            LiveEntry {
                entry,
                at: transient.and_then(|t| t.at),
                preview: transient.and_then(|t| t.preview.as_deref()),
            }
        })
    }

    pub fn preview_handle(&self, id: u64) -> Option<&str> {
        self.transient.get(&id).and_then(|t| t.preview.as_deref())
    }

    fn push(&mut self, direction: Direction, content: String, raw_string: String, data_type: DataType) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.record.messages.push(MessageLogEntry {
            id,
            direction,
            content,
            raw_string: Some(raw_string),
            data_type,
        });
        self.record.updated_at = Utc::now();
        self.transient.insert(
            id,
            Transient {
                at: Some(Utc::now()),
                preview: None,
            },
        );
        id
    }

    fn entry(&self, id: u64) -> Option<&MessageLogEntry> {
        self.record.messages.iter().rev().find(|m| m.id == id)
    }

    /// Record a script posted to the editor
    pub fn record_sent(&mut self, script: impl Into<String>) -> LiveEntry<'_> {
        let script = script.into();
        let id = self.push(Direction::Sent, script.clone(), script, DataType::Script);
        debug!("Session {}: sent message {}", self.record.id, id);
        self.last()
    }

    /// Classify and record a payload from the editor, registering a preview
    /// for binary content
    pub fn record_received(&mut self, payload: InboundPayload, previews: &PreviewRegistry) -> LiveEntry<'_> {
        let classification = classify(payload);
        let id = self.push(
            Direction::Received,
            classification.content,
            classification.raw_string,
            classification.data_type,
        );
        if let Some(resource) = classification.preview {
            let handle = previews.register(resource);
            if let Some(t) = self.transient.get_mut(&id) {
                t.preview = Some(handle);
            }
        }
        debug!("Session {}: received message {}", self.record.id, id);
        self.last()
    }

    fn last(&self) -> LiveEntry<'_> {
        let entry = &self.record.messages[self.record.messages.len() - 1];
        let transient = self.transient.get(&entry.id);
        LiveEntry {
            entry,
            at: transient.and_then(|t| t.at),
            preview: transient.and_then(|t| t.preview.as_deref()),
        }
    }

    /// Remove one entry, releasing its preview. Returns whether it existed.
    pub fn remove_entry(&mut self, id: u64, previews: &PreviewRegistry) -> bool {
        if self.entry(id).is_none() {
            return false;
        }
        self.record.messages.retain(|m| m.id != id);
        if let Some(handle) = self.transient.remove(&id).and_then(|t| t.preview) {
            previews.release(&handle);
        }
        self.record.updated_at = Utc::now();
        true
    }

    /// Drop every entry and release all previews. The id counter keeps
    /// counting so ids stay unique across the session's lifetime.
    pub fn clear(&mut self, previews: &PreviewRegistry) -> usize {
        let removed = self.record.messages.len();
        self.release_previews(previews);
        self.record.messages.clear();
        self.record.updated_at = Utc::now();
        removed
    }

    /// Release preview handles without touching the log. Call before the
    /// session is dropped or replaced.
    pub fn release_previews(&mut self, previews: &PreviewRegistry) -> usize {
        let handles: Vec<String> = self.transient.values_mut().filter_map(|t| t.preview.take()).collect();
        previews.release_all(handles.iter().map(String::as_str))
    }

    /// Replace the image list and rebuild the editor URL so its launch
    /// configuration opens them. Other launch settings are kept.
    pub fn set_images(&mut self, urls: Vec<String>, default_editor_url: &str) -> Result<&SessionMetadata> {
        let current = self.editor_url().unwrap_or(default_editor_url).to_string();
        let (base, config) = EditorLaunchConfig::parse_url(&current)?;
        let config = EditorLaunchConfig {
            files: urls.clone(),
            ..config.unwrap_or_default()
        };
        let editor_url = config.build_url(&base)?;

        let metadata = self.record.metadata.get_or_insert_with(SessionMetadata::default);
        metadata.image_urls = urls;
        metadata.editor_url = Some(editor_url);
        self.record.updated_at = Utc::now();
        Ok(metadata)
    }
}
