//! Telephony adapter implementations

pub mod scripted;
pub mod simulated;

pub use scripted::{AdapterEvent, ScriptedReply, ScriptedTelephonyAdapter};
pub use simulated::SimulatedTelephonyAdapter;
