//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - Call history store implementations
//! - Telephony adapters (scripted, simulated softphone)
//! - Metrics exporter setup

pub mod metrics;
pub mod persistence;
pub mod telephony;
