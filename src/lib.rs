//! Autodial - outbound calling campaign engine
//!
//! Places calls one at a time through a telephony adapter, records the
//! outcome of every attempt and lets the operator halt the run at any point.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use application::{CallOrchestrator, DialerSettings, PreconditionError};
pub use crate::config::Config;
pub use domain::shared::error::{DomainError, Result};
