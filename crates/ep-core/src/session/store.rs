//! Session persistence as one JSON file per session

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::session::types::is_valid_session_id;
use crate::session::{SessionRecord, SessionSummary};
use crate::{Error, Result};

const SESSION_FILE_EXT: &str = "json";

/// Directory-backed session store
///
/// Each session lives in `<dir>/<id>.json`. There is no locking: two writers
/// saving the same id race and the later write wins.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the session files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, SESSION_FILE_EXT))
    }

    /// List all sessions, most recently updated first.
    ///
    /// A missing or unreadable directory yields an empty list; files that
    /// cannot be parsed are skipped.
    pub fn list(&self) -> Vec<SessionRecord> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Sessions directory {} not readable: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut sessions = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SESSION_FILE_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match read_record(&path) {
                Ok(record) if record.id == stem => sessions.push(record),
                Ok(record) => {
                    warn!("Skipping {}: stored id {:?} does not match file name", path.display(), record.id);
                }
                Err(e) => warn!("Skipping unreadable session file {}: {}", path.display(), e),
            }
        }

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        sessions
    }

    /// List summaries of all sessions, most recently updated first
    pub fn list_summaries(&self) -> Vec<SessionSummary> {
        self.list().iter().map(SessionRecord::summary).collect()
    }

    /// Load a session by id. Missing, unreadable, or malformed files are all
    /// reported as `None`.
    pub fn get(&self, id: &str) -> Option<SessionRecord> {
        if !is_valid_session_id(id) {
            return None;
        }

        let path = self.path_for(id);
        match read_record(&path) {
            Ok(record) if record.id == id => Some(record),
            Ok(record) => {
                warn!("Session file {} holds id {:?}", path.display(), record.id);
                None
            }
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read session {}: {}", id, e);
                None
            }
        }
    }

    /// Persist a session, overwriting any prior content for the same id.
    ///
    /// `updated_at` is set to now and `created_at` is carried over from the
    /// existing file, if there is one. Returns the record as written.
    pub fn put(&self, session: &SessionRecord) -> Result<SessionRecord> {
        if !is_valid_session_id(&session.id) {
            return Err(Error::InvalidSessionId(session.id.clone()));
        }

        fs::create_dir_all(&self.dir)?;

        let mut record = session.clone();
        if let Some(existing) = self.get(&record.id) {
            record.created_at = existing.created_at;
        }
        record.updated_at = Utc::now().max(record.created_at);

        let json = serde_json::to_string_pretty(&record)?;
        fs::write(self.path_for(&record.id), json)?;
        debug!("Saved session {} ({} messages)", record.id, record.messages.len());

        Ok(record)
    }

    /// Delete a session by id. Returns whether a file was removed.
    pub fn delete(&self, id: &str) -> bool {
        if !is_valid_session_id(id) {
            return false;
        }

        match fs::remove_file(self.path_for(id)) {
            Ok(()) => {
                debug!("Deleted session {}", id);
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Failed to delete session {}: {}", id, e);
                false
            }
        }
    }
}

fn read_record(path: &Path) -> Result<SessionRecord> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
