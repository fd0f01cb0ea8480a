//! Control API

pub mod campaign_handler;
pub mod dto;
pub mod history_handler;
pub mod metrics_handler;
pub mod router;
pub mod state;
pub mod telephony_handler;

pub use dto::ApiResponse;
pub use router::build_router;
pub use state::AppState;
