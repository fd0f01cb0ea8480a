//! Call history store interface
//!
//! The history is the source of truth for the dashboard and reports. The
//! orchestrator is its only writer.

use crate::domain::campaign::record::{CallRecord, CallRecordPatch};
use crate::domain::campaign::value_object::CallStatus;
use crate::domain::shared::value_objects::CallRecordId;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// History store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Call record already exists: {0}")]
    DuplicateId(CallRecordId),

    #[error("Call record not found: {0}")]
    NotFound(CallRecordId),

    #[error("Invalid transition for call record {id}: {reason}")]
    InvalidTransition { id: CallRecordId, reason: String },

    #[error("Call record {active} is already in progress")]
    LineBusy { active: CallRecordId },

    #[error("History backend unavailable: {0}")]
    Unavailable(String),
}

impl HistoryError {
    /// Errors that mean the history invariants were violated, as opposed to
    /// a backend hiccup
    pub fn is_invariant_violation(&self) -> bool {
        !matches!(self, HistoryError::Unavailable(_))
    }
}

/// Filters for history queries
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub status: Option<CallStatus>,
    /// Only records whose case id belongs to this target set
    pub case_ids: Option<HashSet<String>>,
    pub handel: Option<String>,
}

impl HistoryFilter {
    pub fn with_status(mut self, status: CallStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_case_ids<I, S>(mut self, case_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.case_ids = Some(case_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_handel(mut self, handel: impl Into<String>) -> Self {
        self.handel = Some(handel.into());
        self
    }

    pub fn matches(&self, record: &CallRecord) -> bool {
        if let Some(status) = self.status {
            if record.status() != status {
                return false;
            }
        }

        if let Some(ref case_ids) = self.case_ids {
            if !case_ids.contains(record.case_id()) {
                return false;
            }
        }

        if let Some(ref handel) = self.handel {
            if record.handel() != handel {
                return false;
            }
        }

        true
    }
}

/// Point-in-time view of the history
///
/// The view holds an immutable snapshot; iterating it never blocks writers
/// and can be repeated any number of times with the same result.
#[derive(Debug, Clone)]
pub struct HistoryView {
    records: Arc<[CallRecord]>,
    filter: HistoryFilter,
}

impl HistoryView {
    pub fn new(records: Arc<[CallRecord]>, filter: HistoryFilter) -> Self {
        Self { records, filter }
    }

    /// Records in insertion order, filtered lazily
    pub fn iter(&self) -> impl Iterator<Item = &CallRecord> + '_ {
        self.records.iter().filter(|record| self.filter.matches(record))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<CallRecord> {
        self.iter().cloned().collect()
    }
}

/// Call history repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallHistoryStore: Send + Sync {
    /// Append a new record
    async fn append(&self, record: CallRecord) -> Result<(), HistoryError>;

    /// Apply the terminal transition to an existing record
    async fn update(&self, id: CallRecordId, patch: CallRecordPatch) -> Result<CallRecord, HistoryError>;

    /// Get a record by id
    async fn get(&self, id: CallRecordId) -> Result<Option<CallRecord>, HistoryError>;

    /// List records matching `filter`, in insertion order
    async fn list(&self, filter: HistoryFilter) -> Result<HistoryView, HistoryError>;

    /// The record currently in progress, if any
    async fn in_progress(&self) -> Result<Option<CallRecord>, HistoryError>;
}
