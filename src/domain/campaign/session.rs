//! Dial session - run state for one start/stop cycle

use crate::domain::campaign::target::CallTarget;
use crate::domain::campaign::value_object::SessionState;
use crate::domain::shared::value_objects::{CallRecordId, SessionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Mutable run state owned by the orchestrator
#[derive(Debug, Clone)]
pub struct DialSession {
    id: SessionId,
    state: SessionState,
    queue: Arc<[CallTarget]>,
    position: usize,
    current_record_id: Option<CallRecordId>,
    cancel: CancellationToken,
}

/// Read-only view of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub current_record_id: Option<CallRecordId>,
    pub position: usize,
    pub queue_length: usize,
}

impl DialSession {
    /// The session the orchestrator holds between runs
    pub fn idle() -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Idle,
            queue: Arc::from(Vec::new()),
            position: 0,
            current_record_id: None,
            cancel: CancellationToken::new(),
        }
    }

    /// A fresh running session over `queue`
    pub fn running(queue: Arc<[CallTarget]>) -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Running,
            queue,
            position: 0,
            current_record_id: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_record_id(&self) -> Option<CallRecordId> {
        self.current_record_id
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Take the next target and advance the position
    pub fn advance(&mut self) -> Option<CallTarget> {
        let target = self.queue.get(self.position).cloned()?;
        self.position += 1;
        Some(target)
    }

    pub fn set_current_record(&mut self, id: CallRecordId) {
        self.current_record_id = Some(id);
    }

    /// Request cancellation; returns false unless a running session moved
    /// to stopping
    pub fn request_stop(&mut self) -> bool {
        if !self.state.can_transition_to(SessionState::Stopping) {
            return false;
        }
        self.cancel.cancel();
        self.state = SessionState::Stopping;
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            current_record_id: self.current_record_id,
            position: self.position,
            queue_length: self.queue.len(),
        }
    }
}

impl Default for DialSession {
    fn default() -> Self {
        Self::idle()
    }
}
