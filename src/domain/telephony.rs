//! Telephony adapter port
//!
//! The dial loop only depends on this contract. Production adapters wrap a
//! softphone or SIP stack; tests use the scripted adapter from
//! `infrastructure::telephony`.

use crate::domain::campaign::value_object::CallOutcome;
use async_trait::async_trait;
use thiserror::Error;

/// Telephony errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelephonyError {
    #[error("Telephony device is not connected")]
    NotConnected,

    #[error("Telephony device unreachable: {0}")]
    Unreachable(String),

    #[error("Timed out waiting for call outcome")]
    Timeout,
}

/// Single-line telephony device
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelephonyAdapter: Send + Sync {
    /// Connect to the device or SIP server
    async fn connect(&self) -> Result<(), TelephonyError>;

    /// Disconnect, dropping any active call
    async fn disconnect(&self) -> Result<(), TelephonyError>;

    fn is_connected(&self) -> bool;

    /// Place a call and resolve once its outcome is known
    ///
    /// The adapter owns the timeout policy for an unresponsive remote end.
    async fn place_call(&self, phone_number: &str) -> Result<CallOutcome, TelephonyError>;

    /// Hang up the active call; a no-op when the line is idle
    async fn end_call(&self) -> Result<(), TelephonyError>;

    /// Adapter name for logs and the settings endpoint
    fn name(&self) -> &'static str {
        "telephony"
    }
}
