//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Entities and value objects for campaign targets and call records
//! - The dial session state owned by the orchestrator
//! - Ports: the call history store and the telephony adapter

pub mod campaign;
pub mod shared;
pub mod telephony;

// Re-export commonly used types
pub use shared::{DomainError, Result};
