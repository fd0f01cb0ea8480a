//! Campaign value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal classification of a single call attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallOutcome {
    /// Remote party picked up
    #[serde(rename = "Answer")]
    Answered,
    /// Rang out without pickup
    #[serde(rename = "Not Answer")]
    NotAnswered,
    /// Number not in service or unreachable
    #[serde(rename = "Not Active")]
    NotActive,
    /// Diverted to voice mail
    #[serde(rename = "Voice Mail")]
    VoiceMail,
    /// Attempt could not be placed or classified
    #[serde(rename = "Error")]
    Error,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Answered => "Answer",
            CallOutcome::NotAnswered => "Not Answer",
            CallOutcome::NotActive => "Not Active",
            CallOutcome::VoiceMail => "Voice Mail",
            CallOutcome::Error => "Error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Answer" => Some(CallOutcome::Answered),
            "Not Answer" => Some(CallOutcome::NotAnswered),
            "Not Active" => Some(CallOutcome::NotActive),
            "Voice Mail" => Some(CallOutcome::VoiceMail),
            "Error" => Some(CallOutcome::Error),
            _ => None,
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a call record
///
/// A record starts `InProgress` and moves exactly once to one of the
/// terminal statuses, which mirror [`CallOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "Answer")]
    Answered,
    #[serde(rename = "Not Answer")]
    NotAnswered,
    #[serde(rename = "Not Active")]
    NotActive,
    #[serde(rename = "Voice Mail")]
    VoiceMail,
    #[serde(rename = "Error")]
    Error,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::InProgress => "in progress",
            CallStatus::Answered => "Answer",
            CallStatus::NotAnswered => "Not Answer",
            CallStatus::NotActive => "Not Active",
            CallStatus::VoiceMail => "Voice Mail",
            CallStatus::Error => "Error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in progress" => Some(CallStatus::InProgress),
            other => CallOutcome::from_str(other).map(CallStatus::from),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CallStatus::InProgress)
    }

    /// The outcome this status represents, `None` while in progress
    pub fn outcome(&self) -> Option<CallOutcome> {
        match self {
            CallStatus::InProgress => None,
            CallStatus::Answered => Some(CallOutcome::Answered),
            CallStatus::NotAnswered => Some(CallOutcome::NotAnswered),
            CallStatus::NotActive => Some(CallOutcome::NotActive),
            CallStatus::VoiceMail => Some(CallOutcome::VoiceMail),
            CallStatus::Error => Some(CallOutcome::Error),
        }
    }
}

impl From<CallOutcome> for CallStatus {
    fn from(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Answered => CallStatus::Answered,
            CallOutcome::NotAnswered => CallStatus::NotAnswered,
            CallOutcome::NotActive => CallStatus::NotActive,
            CallOutcome::VoiceMail => CallStatus::VoiceMail,
            CallOutcome::Error => CallStatus::Error,
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dial session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No campaign running
    Idle,
    /// Dial loop is consuming the queue
    Running,
    /// Stop requested, waiting for the in-flight attempt to finish
    Stopping,
}

impl SessionState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, next),
            (Idle, Running) | (Running, Idle) | (Running, Stopping) | (Stopping, Idle)
        )
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}
