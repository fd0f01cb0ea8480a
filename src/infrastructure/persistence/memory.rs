//! In-memory call history store

use crate::domain::campaign::history::{CallHistoryStore, HistoryError, HistoryFilter, HistoryView};
use crate::domain::campaign::record::{CallRecord, CallRecordPatch};
use crate::domain::shared::value_objects::CallRecordId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct HistoryLog {
    records: Vec<CallRecord>,
    index: HashMap<CallRecordId, usize>,
    /// Position of the single in-progress record, if any
    active: Option<usize>,
}

/// Call history kept in process memory
///
/// Mutations are serialized by one writer lock and applied in a single step,
/// so readers see a record either before or after its transition.
pub struct MemoryCallHistoryStore {
    log: Arc<RwLock<HistoryLog>>,
}

impl MemoryCallHistoryStore {
    pub fn new() -> Self {
        Self {
            log: Arc::new(RwLock::new(HistoryLog::default())),
        }
    }

    /// Number of records in the store
    pub async fn len(&self) -> usize {
        self.log.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryCallHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallHistoryStore for MemoryCallHistoryStore {
    async fn append(&self, record: CallRecord) -> Result<(), HistoryError> {
        let mut log = self.log.write().await;

        if log.index.contains_key(&record.id()) {
            return Err(HistoryError::DuplicateId(record.id()));
        }

        if record.is_in_progress() {
            if let Some(active) = log.active {
                return Err(HistoryError::LineBusy {
                    active: log.records[active].id(),
                });
            }
        }

        let position = log.records.len();
        if record.is_in_progress() {
            log.active = Some(position);
        }
        log.index.insert(record.id(), position);
        debug!("Appended call record {} ({})", record.id(), record.status());
        log.records.push(record);

        Ok(())
    }

    async fn update(&self, id: CallRecordId, patch: CallRecordPatch) -> Result<CallRecord, HistoryError> {
        let mut log = self.log.write().await;

        let position = *log.index.get(&id).ok_or(HistoryError::NotFound(id))?;
        let record = &mut log.records[position];
        record
            .apply(patch)
            .map_err(|e| HistoryError::InvalidTransition {
                id,
                reason: e.to_string(),
            })?;
        let updated = record.clone();

        if log.active == Some(position) {
            log.active = None;
        }
        debug!("Finalized call record {} as {}", id, updated.status());

        Ok(updated)
    }

    async fn get(&self, id: CallRecordId) -> Result<Option<CallRecord>, HistoryError> {
        let log = self.log.read().await;
        Ok(log.index.get(&id).map(|&position| log.records[position].clone()))
    }

    async fn list(&self, filter: HistoryFilter) -> Result<HistoryView, HistoryError> {
        let log = self.log.read().await;
        let snapshot: Arc<[CallRecord]> = log.records.as_slice().into();
        Ok(HistoryView::new(snapshot, filter))
    }

    async fn in_progress(&self) -> Result<Option<CallRecord>, HistoryError> {
        let log = self.log.read().await;
        Ok(log.active.map(|position| log.records[position].clone()))
    }
}
