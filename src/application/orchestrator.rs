//! Call orchestrator - sequences a campaign's call attempts
//!
//! The orchestrator owns exactly one [`DialSession`] at a time and runs a
//! single dial task per session, so at most one call is ever in flight:
//!
//! ```text
//! Idle --start--> Running --queue exhausted--> Idle
//!                    |
//!                    +--stop--> Stopping --in-flight call done--> Idle
//! ```
//!
//! Cancellation is cooperative. `stop()` never interrupts a call that is
//! already being placed; it prevents the next target from being dialled and
//! cuts the inter-call delay short.

use crate::application::clock::{Clock, SystemClock};
use crate::domain::campaign::history::{CallHistoryStore, HistoryError};
use crate::domain::campaign::record::{CallRecord, CallRecordPatch};
use crate::domain::campaign::session::{DialSession, SessionSnapshot};
use crate::domain::campaign::target::CallTarget;
use crate::domain::campaign::value_object::{CallOutcome, SessionState};
use crate::domain::shared::value_objects::{CallRecordId, SessionId};
use crate::domain::telephony::TelephonyAdapter;
use crate::infrastructure::metrics;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default pause between two call attempts
pub const DEFAULT_INTER_CALL_DELAY: Duration = Duration::from_secs(5);

/// Reasons `start` can be rejected
///
/// A rejected start never touches the session or the history.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Telephony device is not connected")]
    NotConnected,

    #[error("No targets selected for dialing")]
    EmptyQueue,

    #[error("A dial session is already running")]
    AlreadyRunning,
}

/// Dial loop tuning
#[derive(Debug, Clone)]
pub struct DialerSettings {
    pub inter_call_delay: Duration,
}

impl Default for DialerSettings {
    fn default() -> Self {
        Self {
            inter_call_delay: DEFAULT_INTER_CALL_DELAY,
        }
    }
}

/// Drives one campaign at a time through a telephony adapter
pub struct CallOrchestrator {
    telephony: Arc<dyn TelephonyAdapter>,
    history: Arc<dyn CallHistoryStore>,
    clock: Arc<dyn Clock>,
    settings: DialerSettings,
    session: Arc<watch::Sender<DialSession>>,
}

impl CallOrchestrator {
    /// Create an orchestrator with the system clock and default settings
    pub fn new(telephony: Arc<dyn TelephonyAdapter>, history: Arc<dyn CallHistoryStore>) -> Self {
        let (session, _) = watch::channel(DialSession::idle());
        Self {
            telephony,
            history,
            clock: Arc::new(SystemClock),
            settings: DialerSettings::default(),
            session: Arc::new(session),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: DialerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &DialerSettings {
        &self.settings
    }

    pub fn telephony(&self) -> &Arc<dyn TelephonyAdapter> {
        &self.telephony
    }

    pub fn history(&self) -> &Arc<dyn CallHistoryStore> {
        &self.history
    }

    /// Start dialing `targets` in order
    ///
    /// Returns as soon as the dial task is spawned; progress is observable
    /// through [`snapshot`](Self::snapshot) and the history store. Must be
    /// called from within a tokio runtime.
    pub fn start(&self, targets: Vec<CallTarget>) -> Result<SessionId, PreconditionError> {
        if !self.telephony.is_connected() {
            warn!("Rejecting dial session: telephony device is not connected");
            return Err(PreconditionError::NotConnected);
        }

        if targets.is_empty() {
            warn!("Rejecting dial session: no targets selected");
            return Err(PreconditionError::EmptyQueue);
        }

        let queue: Arc<[CallTarget]> = targets.into();
        let mut started: Option<(SessionId, CancellationToken)> = None;

        self.session.send_if_modified(|session| {
            if !session.state().can_transition_to(SessionState::Running) {
                return false;
            }
            let next = DialSession::running(queue.clone());
            started = Some((next.id(), next.cancel_token()));
            *session = next;
            true
        });

        let Some((session_id, cancel)) = started else {
            warn!("Rejecting dial session: a session is already running");
            return Err(PreconditionError::AlreadyRunning);
        };

        info!(
            "Starting dial session {} for {} targets",
            session_id,
            queue.len()
        );
        metrics::record_session_started();

        let dial_loop = DialLoop {
            session_id,
            telephony: self.telephony.clone(),
            history: self.history.clone(),
            clock: self.clock.clone(),
            delay: self.settings.inter_call_delay,
            session: self.session.clone(),
            cancel,
        };
        tokio::spawn(dial_loop.run());

        Ok(session_id)
    }

    /// Request the running session to stop
    ///
    /// Lets an in-flight call finish, skips the remaining delay and asks the
    /// device to hang up. A no-op while idle or already stopping.
    pub async fn stop(&self) {
        let mut stopping = None;
        self.session.send_if_modified(|session| {
            if session.request_stop() {
                stopping = Some(session.id());
                true
            } else {
                false
            }
        });

        let Some(session_id) = stopping else {
            debug!("Stop requested with no active dial session");
            return;
        };

        info!("Stop requested for dial session {}", session_id);
        if let Err(e) = self.telephony.end_call().await {
            warn!("Failed to end call while stopping session {}: {}", session_id, e);
        }
    }

    /// Current session state, never blocks on the dial loop
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.borrow().snapshot()
    }

    pub fn is_dialing(&self) -> bool {
        self.session.borrow().state().is_active()
    }

    /// Follow session changes as they happen
    pub fn subscribe(&self) -> watch::Receiver<DialSession> {
        self.session.subscribe()
    }

    /// Wait until the current session, if any, has returned to idle
    pub async fn wait_until_idle(&self) {
        let mut rx = self.session.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|s| s.state() == SessionState::Idle).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinishReason {
    Completed,
    Stopped,
    Aborted,
}

/// The sequential dial task of one session
struct DialLoop {
    session_id: SessionId,
    telephony: Arc<dyn TelephonyAdapter>,
    history: Arc<dyn CallHistoryStore>,
    clock: Arc<dyn Clock>,
    delay: Duration,
    session: Arc<watch::Sender<DialSession>>,
    cancel: CancellationToken,
}

impl DialLoop {
    async fn run(self) {
        let mut attempts = 0usize;

        let reason = loop {
            if self.cancel.is_cancelled() {
                break FinishReason::Stopped;
            }

            let Some(target) = self.next_target() else {
                break FinishReason::Completed;
            };
            attempts += 1;

            match AssertUnwindSafe(self.dial(&target)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(
                        "Aborting dial session {} after history invariant violation: {}",
                        self.session_id, e
                    );
                    break FinishReason::Aborted;
                }
                Err(_) => {
                    error!(
                        "Aborting dial session {}: call attempt for case {} panicked",
                        self.session_id,
                        target.case_id()
                    );
                    if let Err(e) = self.telephony.end_call().await {
                        warn!("Failed to hang up after aborted call attempt: {}", e);
                    }
                    break FinishReason::Aborted;
                }
            }

            if self.cancel.is_cancelled() {
                break FinishReason::Stopped;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break FinishReason::Stopped,
                _ = tokio::time::sleep(self.delay) => {}
            }
        };

        self.finish(reason, attempts);
    }

    fn next_target(&self) -> Option<CallTarget> {
        let mut next = None;
        self.session.send_if_modified(|session| {
            next = session.advance();
            next.is_some()
        });
        next
    }

    /// One attempt: record, place, finalize, hang up if answered
    ///
    /// Only history invariant violations are returned; everything else is
    /// folded into an `Error` record so the session moves on.
    async fn dial(&self, target: &CallTarget) -> Result<(), HistoryError> {
        let record = CallRecord::begin(target, self.clock.now());
        let record_id = record.id();

        if let Err(e) = self.history.append(record).await {
            if e.is_invariant_violation() {
                return Err(e);
            }
            warn!(
                "Skipping case {}: could not record call attempt: {}",
                target.case_id(),
                e
            );
            return Ok(());
        }

        self.session
            .send_modify(|session| session.set_current_record(record_id));
        info!(
            "Dialing {} ({}) for case {}",
            target.phone_number(),
            target.customer_name(),
            target.case_id()
        );

        let started = Instant::now();
        let placed = AssertUnwindSafe(self.telephony.place_call(target.phone_number()))
            .catch_unwind()
            .await;
        let elapsed = started.elapsed();

        let patch = match placed {
            Ok(Ok(CallOutcome::Error)) => CallRecordPatch::failed(self.clock.now()),
            Ok(Ok(outcome)) => {
                CallRecordPatch::finished(outcome, self.clock.now(), elapsed.as_secs())
            }
            Ok(Err(e)) => {
                warn!("Call to {} failed: {}", target.phone_number(), e);
                CallRecordPatch::failed(self.clock.now())
            }
            Err(_) => {
                error!("Telephony adapter panicked while calling {}", target.phone_number());
                CallRecordPatch::failed(self.clock.now())
            }
        };

        let stored = self.history.update(record_id, patch).await;

        // Auto-hangup: answered calls are always terminated by us
        if patch.status == CallOutcome::Answered {
            if let Err(e) = self.telephony.end_call().await {
                warn!("Failed to hang up answered call {}: {}", record_id, e);
            }
        }

        match stored {
            Ok(record) => {
                metrics::record_call_outcome(
                    patch.status,
                    Duration::from_secs(record.duration_seconds()),
                );
                info!(
                    "Call to {} finished: {} after {}s",
                    record.phone_number(),
                    record.status(),
                    record.duration_seconds()
                );
                Ok(())
            }
            Err(e) if e.is_invariant_violation() => Err(e),
            Err(e) => {
                warn!("Failed to finalize call record {}: {}", record_id, e);
                self.finalize_as_error(record_id).await
            }
        }
    }

    async fn finalize_as_error(&self, record_id: CallRecordId) -> Result<(), HistoryError> {
        match self
            .history
            .update(record_id, CallRecordPatch::failed(self.clock.now()))
            .await
        {
            Ok(_) => {
                metrics::record_call_outcome(CallOutcome::Error, Duration::ZERO);
                Ok(())
            }
            Err(e) if e.is_invariant_violation() => Err(e),
            Err(e) => {
                error!("Call record {} left in progress: {}", record_id, e);
                Ok(())
            }
        }
    }

    fn finish(&self, reason: FinishReason, attempts: usize) {
        self.session.send_modify(|session| *session = DialSession::idle());
        metrics::record_session_finished();

        match reason {
            FinishReason::Completed => info!(
                "Dial session {} completed after {} calls",
                self.session_id, attempts
            ),
            FinishReason::Stopped => info!(
                "Dial session {} stopped after {} calls",
                self.session_id, attempts
            ),
            FinishReason::Aborted => error!(
                "Dial session {} aborted after {} calls",
                self.session_id, attempts
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::RuntimeClock;
    use crate::domain::campaign::history::{HistoryFilter, MockCallHistoryStore};
    use crate::domain::campaign::value_object::CallStatus;
    use crate::domain::telephony::{MockTelephonyAdapter, TelephonyError};
    use crate::infrastructure::persistence::MemoryCallHistoryStore;
    use mockall::predicate::eq;

    fn targets(cases: &[(&str, &str)]) -> Vec<CallTarget> {
        cases
            .iter()
            .map(|(case_id, phone)| CallTarget::new(*case_id, "Customer", *phone, "H").unwrap())
            .collect()
    }

    fn orchestrator(
        telephony: MockTelephonyAdapter,
        history: Arc<dyn CallHistoryStore>,
    ) -> CallOrchestrator {
        CallOrchestrator::new(Arc::new(telephony), history)
            .with_clock(Arc::new(RuntimeClock::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_placement_error_recorded_and_session_continues() {
        let mut telephony = MockTelephonyAdapter::new();
        telephony.expect_is_connected().return_const(true);
        telephony
            .expect_place_call()
            .with(eq("100"))
            .times(1)
            .returning(|_| Err(TelephonyError::Unreachable("no route".to_string())));
        telephony
            .expect_place_call()
            .with(eq("200"))
            .times(1)
            .returning(|_| Ok(CallOutcome::NotAnswered));
        telephony.expect_end_call().never();

        let history = Arc::new(MemoryCallHistoryStore::new());
        let orchestrator = orchestrator(telephony, history.clone());

        orchestrator
            .start(targets(&[("A", "100"), ("B", "200")]))
            .unwrap();
        orchestrator.wait_until_idle().await;

        let records = history.list(HistoryFilter::default()).await.unwrap().to_vec();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status(), CallStatus::Error);
        assert_eq!(records[0].duration_seconds(), 0);
        assert!(records[0].end_time().is_some());
        assert_eq!(records[1].status(), CallStatus::NotAnswered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnected_adapter_rejects_start() {
        let mut telephony = MockTelephonyAdapter::new();
        telephony.expect_is_connected().return_const(false);
        telephony.expect_place_call().never();

        let history = Arc::new(MemoryCallHistoryStore::new());
        let orchestrator = orchestrator(telephony, history.clone());
        let before = orchestrator.snapshot();

        let result = orchestrator.start(targets(&[("A", "100")]));
        assert_eq!(result, Err(PreconditionError::NotConnected));
        assert_eq!(orchestrator.snapshot(), before);
        assert!(history.list(HistoryFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_idle_does_not_touch_device() {
        let mut telephony = MockTelephonyAdapter::new();
        telephony.expect_end_call().never();

        let orchestrator = orchestrator(telephony, Arc::new(MemoryCallHistoryStore::new()));
        orchestrator.stop().await;
        orchestrator.stop().await;

        assert_eq!(orchestrator.snapshot().state, SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_invariant_violation_aborts_session() {
        let mut telephony = MockTelephonyAdapter::new();
        telephony.expect_is_connected().return_const(true);
        telephony.expect_place_call().never();

        let mut history = MockCallHistoryStore::new();
        history
            .expect_append()
            .times(1)
            .returning(|record| Err(HistoryError::DuplicateId(record.id())));

        let orchestrator = orchestrator(telephony, Arc::new(history));
        orchestrator
            .start(targets(&[("A", "100"), ("B", "200")]))
            .unwrap();
        orchestrator.wait_until_idle().await;

        assert_eq!(orchestrator.snapshot().state, SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_history_skips_target() {
        let mut telephony = MockTelephonyAdapter::new();
        telephony.expect_is_connected().return_const(true);
        telephony
            .expect_place_call()
            .with(eq("200"))
            .times(1)
            .returning(|_| Ok(CallOutcome::VoiceMail));

        let backing = Arc::new(MemoryCallHistoryStore::new());
        let mut history = MockCallHistoryStore::new();
        let mut first = true;
        let append_to = backing.clone();
        history.expect_append().times(2).returning(move |record| {
            if std::mem::take(&mut first) {
                return Err(HistoryError::Unavailable("disk full".to_string()));
            }
            futures::executor::block_on(append_to.append(record))
        });
        let update_in = backing.clone();
        history
            .expect_update()
            .times(1)
            .returning(move |id, patch| futures::executor::block_on(update_in.update(id, patch)));

        let orchestrator = orchestrator(telephony, Arc::new(history));
        orchestrator
            .start(targets(&[("A", "100"), ("B", "200")]))
            .unwrap();
        orchestrator.wait_until_idle().await;

        let records = backing.list(HistoryFilter::default()).await.unwrap().to_vec();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].case_id(), "B");
        assert_eq!(records[0].status(), CallStatus::VoiceMail);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_finalize_retried_as_error() {
        let mut telephony = MockTelephonyAdapter::new();
        telephony.expect_is_connected().return_const(true);
        telephony
            .expect_place_call()
            .with(eq("100"))
            .times(1)
            .returning(|_| Ok(CallOutcome::NotAnswered));
        telephony
            .expect_place_call()
            .with(eq("200"))
            .times(1)
            .returning(|_| Ok(CallOutcome::NotAnswered));
        telephony.expect_end_call().never();

        let backing = Arc::new(MemoryCallHistoryStore::new());
        let mut history = MockCallHistoryStore::new();
        let append_to = backing.clone();
        history
            .expect_append()
            .times(2)
            .returning(move |record| futures::executor::block_on(append_to.append(record)));
        let mut first = true;
        let update_in = backing.clone();
        history.expect_update().times(3).returning(move |id, patch| {
            if std::mem::take(&mut first) {
                return Err(HistoryError::Unavailable("write timed out".to_string()));
            }
            futures::executor::block_on(update_in.update(id, patch))
        });

        let orchestrator = orchestrator(telephony, Arc::new(history));
        orchestrator
            .start(targets(&[("A", "100"), ("B", "200")]))
            .unwrap();
        orchestrator.wait_until_idle().await;

        let records: Vec<_> = backing
            .list(HistoryFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|r| (r.case_id().to_string(), r.status(), r.duration_seconds()))
            .collect();
        assert_eq!(
            records,
            vec![
                ("A".to_string(), CallStatus::Error, 0),
                ("B".to_string(), CallStatus::NotAnswered, 0),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_tracks_current_record() {
        let mut telephony = MockTelephonyAdapter::new();
        telephony.expect_is_connected().return_const(true);
        telephony
            .expect_place_call()
            .returning(|_| Ok(CallOutcome::NotActive));

        let history = Arc::new(MemoryCallHistoryStore::new());
        let orchestrator = orchestrator(telephony, history.clone())
            .with_settings(DialerSettings {
                inter_call_delay: Duration::from_secs(30),
            });
        let mut updates = orchestrator.subscribe();

        orchestrator.start(targets(&[("A", "100")])).unwrap();

        let snapshot = updates
            .wait_for(|s| s.current_record_id().is_some())
            .await
            .unwrap()
            .snapshot();
        assert_eq!(snapshot.state, SessionState::Running);
        assert_eq!(snapshot.position, 1);
        assert_eq!(snapshot.queue_length, 1);

        let record = history
            .get(snapshot.current_record_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.case_id(), "A");

        orchestrator.wait_until_idle().await;
        let idle = orchestrator.snapshot();
        assert_eq!(idle.current_record_id, None);
        assert_eq!(idle.queue_length, 0);
    }
}
