//! In-memory local note store.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use mapnotes_core::{CommitAction, CommitOutcome, NoteBackend, NoteRecord, NoteTarget};

#[derive(Debug)]
struct StoreState {
    records: BTreeMap<i64, NoteRecord>,
    next_id: i64,
}

/// Local offline store holding one record per note.
///
/// New notes get negative ids counting down from -1. Committing again to
/// a note already held replaces its record.
#[derive(Debug)]
pub struct MemoryNoteStore {
    state: Mutex<StoreState>,
}

impl Default for MemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                records: BTreeMap::new(),
                next_id: -1,
            }),
        }
    }

    /// All held records, ordered by id.
    pub fn records(&self) -> Vec<NoteRecord> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.records.values().cloned().collect()
    }

    pub fn get(&self, id: i64) -> Option<NoteRecord> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.records.get(&id).cloned()
    }
}

#[async_trait]
impl NoteBackend for MemoryNoteStore {
    async fn commit(&self, target: NoteTarget, message: &str, action: CommitAction) -> CommitOutcome {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let id = if target.id != 0 {
            target.id
        } else {
            let id = state.next_id;
            state.next_id -= 1;
            id
        };
        let record = NoteRecord {
            id,
            latitude: target.latitude,
            longitude: target.longitude,
            opened: action != CommitAction::Close,
            description: Some(message.to_string()),
            local: true,
            ..Default::default()
        };
        state.records.insert(id, record.clone());
        debug!(note_id = id, action = %action, "Stored note locally");
        CommitOutcome::stored_locally(record)
    }

    async fn modify(&self, local_record_id: i64, message: &str) -> CommitOutcome {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.records.get_mut(&local_record_id) {
            Some(record) => {
                record.description = Some(message.to_string());
                debug!(note_id = local_record_id, "Modified local note");
                CommitOutcome::stored_locally(record.clone())
            }
            None => CommitOutcome::failed(format!("No local note with id {}", local_record_id)),
        }
    }
}
