//! Deferred session saving
//!
//! Every change re-arms a per-session timer; the store is only written once
//! the session has been quiet for the configured delay.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::session::{SessionRecord, SessionStore};
use crate::{Error, Result};

struct Pending {
    generation: u64,
    record: SessionRecord,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct PendingSaves {
    next_generation: u64,
    by_session: HashMap<String, Pending>,
}

/// Debounced writer in front of a [`SessionStore`]
///
/// Must be used from within a tokio runtime.
pub struct AutosaveScheduler {
    store: SessionStore,
    delay: Duration,
    pending: Arc<Mutex<PendingSaves>>,
}

impl AutosaveScheduler {
    pub fn new(store: SessionStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: Arc::new(Mutex::new(PendingSaves::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn lock(&self) -> MutexGuard<'_, PendingSaves> {
        lock_pending(&self.pending)
    }

    /// Arm (or re-arm) the save timer for `record.id` with this snapshot
    pub fn schedule(&self, record: SessionRecord) {
        let id = record.id.clone();
        let mut pending = self.lock();

        pending.next_generation += 1;
        let generation = pending.next_generation;

        if let Some(previous) = pending.by_session.remove(&id) {
            previous.handle.abort();
            debug!("Autosave for session {} re-armed", id);
        }

        let handle = tokio::spawn(fire_after(
            self.store.clone(),
            Arc::clone(&self.pending),
            id.clone(),
            generation,
            self.delay,
        ));
        pending.by_session.insert(
            id,
            Pending {
                generation,
                record,
                handle,
            },
        );
    }

    /// Disarm a pending save. Returns whether one was pending.
    pub fn cancel(&self, session_id: &str) -> bool {
        match self.lock().by_session.remove(session_id) {
            Some(previous) => {
                previous.handle.abort();
                debug!("Autosave for session {} cancelled", session_id);
                true
            }
            None => false,
        }
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.lock().by_session.len()
    }

    /// Write every pending snapshot now. Returns how many were saved.
    pub async fn flush(&self) -> usize {
        let drained: Vec<Pending> = self.lock().by_session.drain().map(|(_, p)| p).collect();

        let mut saved = 0;
        for pending in drained {
            pending.handle.abort();
            if write(self.store.clone(), pending.record).await.is_ok() {
                saved += 1;
            }
        }
        if saved > 0 {
            info!("Flushed {} pending session save(s)", saved);
        }
        saved
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        for (_, pending) in self.lock().by_session.drain() {
            pending.handle.abort();
        }
    }
}

fn lock_pending(pending: &Mutex<PendingSaves>) -> MutexGuard<'_, PendingSaves> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn fire_after(
    store: SessionStore,
    pending: Arc<Mutex<PendingSaves>>,
    session_id: String,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    let record = {
        let mut pending = lock_pending(&pending);
        match pending.by_session.get(&session_id) {
            Some(p) if p.generation == generation => pending.by_session.remove(&session_id).map(|p| p.record),
            _ => None,
        }
    };

    if let Some(record) = record {
        let _ = write(store, record).await;
    }
}

async fn write(store: SessionStore, record: SessionRecord) -> Result<SessionRecord> {
    let session_id = record.id.clone();
    let result = tokio::task::spawn_blocking(move || store.put(&record))
        .await
        .map_err(|e| Error::Other(format!("Autosave task failed: {}", e)))
        .and_then(|r| r);

    match &result {
        Ok(saved) => debug!("Autosaved session {} ({} messages)", session_id, saved.messages.len()),
        Err(e) => error!("Autosave failed for session {}: {}", session_id, e),
    }
    result
}
