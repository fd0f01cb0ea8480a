//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - Sequencing call attempts for a campaign
//! - Owning the single dial session
//! - Stamping records with wall-clock time

pub mod clock;
pub mod orchestrator;

pub use clock::{Clock, RuntimeClock, SystemClock};
pub use orchestrator::{CallOrchestrator, DialerSettings, PreconditionError, DEFAULT_INTER_CALL_DELAY};
