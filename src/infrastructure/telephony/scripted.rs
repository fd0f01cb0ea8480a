//! Deterministic telephony adapter driven by per-number scripts
//!
//! Every number gets a queue of scripted replies; once a queue runs dry the
//! default reply is used. All device interactions are journaled so callers
//! can assert on exact ordering.

use crate::domain::campaign::value_object::CallOutcome;
use crate::domain::telephony::{TelephonyAdapter, TelephonyError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// One scripted reply to `place_call`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedReply {
    pub result: Result<CallOutcome, TelephonyError>,
    /// Simulated time until the outcome is known
    pub latency: Duration,
}

impl ScriptedReply {
    pub fn outcome(outcome: CallOutcome) -> Self {
        Self {
            result: Ok(outcome),
            latency: Duration::ZERO,
        }
    }

    pub fn error(error: TelephonyError) -> Self {
        Self {
            result: Err(error),
            latency: Duration::ZERO,
        }
    }

    pub fn after(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Device interaction journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    Connected,
    Disconnected,
    Placed(String),
    Resolved(String, Result<CallOutcome, TelephonyError>),
    Ended,
}

struct ScriptState {
    scripts: HashMap<String, VecDeque<ScriptedReply>>,
    default_reply: ScriptedReply,
    journal: Vec<AdapterEvent>,
    active_call: Option<String>,
}

/// Scripted telephony adapter
pub struct ScriptedTelephonyAdapter {
    connected: AtomicBool,
    state: Mutex<ScriptState>,
}

impl ScriptedTelephonyAdapter {
    /// A connected adapter answering `NotAnswered` to unscripted numbers
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            state: Mutex::new(ScriptState {
                scripts: HashMap::new(),
                default_reply: ScriptedReply::outcome(CallOutcome::NotAnswered),
                journal: Vec::new(),
                active_call: None,
            }),
        }
    }

    pub fn disconnected() -> Self {
        let adapter = Self::new();
        adapter.connected.store(false, Ordering::SeqCst);
        adapter
    }

    /// Queue replies for `phone_number`, consumed in order
    pub fn script<I>(&self, phone_number: &str, replies: I)
    where
        I: IntoIterator<Item = ScriptedReply>,
    {
        let mut state = self.lock();
        state
            .scripts
            .entry(phone_number.to_string())
            .or_default()
            .extend(replies);
    }

    pub fn with_default(self, reply: ScriptedReply) -> Self {
        self.lock().default_reply = reply;
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn journal(&self) -> Vec<AdapterEvent> {
        self.lock().journal.clone()
    }

    /// Numbers dialled so far, in order
    pub fn placed_numbers(&self) -> Vec<String> {
        self.lock()
            .journal
            .iter()
            .filter_map(|event| match event {
                AdapterEvent::Placed(number) => Some(number.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn end_call_count(&self) -> usize {
        self.lock()
            .journal
            .iter()
            .filter(|event| matches!(event, AdapterEvent::Ended))
            .count()
    }

    /// Number whose line is still open, if any
    pub fn active_call(&self) -> Option<String> {
        self.lock().active_call.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        // A poisoned journal is still readable; the panic is reported elsewhere
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ScriptedTelephonyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelephonyAdapter for ScriptedTelephonyAdapter {
    async fn connect(&self) -> Result<(), TelephonyError> {
        self.connected.store(true, Ordering::SeqCst);
        self.lock().journal.push(AdapterEvent::Connected);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TelephonyError> {
        self.connected.store(false, Ordering::SeqCst);
        let mut state = self.lock();
        state.active_call = None;
        state.journal.push(AdapterEvent::Disconnected);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn place_call(&self, phone_number: &str) -> Result<CallOutcome, TelephonyError> {
        if !self.is_connected() {
            return Err(TelephonyError::NotConnected);
        }

        let reply = {
            let mut state = self.lock();
            let scripted = state
                .scripts
                .get_mut(phone_number)
                .and_then(|replies| replies.pop_front());
            let reply = scripted.unwrap_or_else(|| state.default_reply.clone());
            state.journal.push(AdapterEvent::Placed(phone_number.to_string()));
            state.active_call = Some(phone_number.to_string());
            reply
        };

        debug!("Scripted call to {} resolves in {:?}", phone_number, reply.latency);
        if !reply.latency.is_zero() {
            tokio::time::sleep(reply.latency).await;
        }

        let mut state = self.lock();
        state
            .journal
            .push(AdapterEvent::Resolved(phone_number.to_string(), reply.result.clone()));
        if reply.result != Ok(CallOutcome::Answered) {
            state.active_call = None;
        }
        reply.result
    }

    async fn end_call(&self) -> Result<(), TelephonyError> {
        let mut state = self.lock();
        state.active_call = None;
        state.journal.push(AdapterEvent::Ended);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
