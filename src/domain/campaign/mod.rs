//! Campaign bounded context - targets, call records and dial sessions

pub mod history;
pub mod record;
pub mod session;
pub mod status_view;
pub mod target;
pub mod value_object;

pub use history::{CallHistoryStore, HistoryError, HistoryFilter, HistoryView};
pub use record::{CallRecord, CallRecordPatch};
pub use session::{DialSession, SessionSnapshot};
pub use status_view::{recent_calls, CampaignStats};
pub use target::{CallTarget, TargetInput};
pub use value_object::{CallOutcome, CallStatus, SessionState};
