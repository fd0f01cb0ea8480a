//! Control API DTOs

use crate::config::TelephonyMode;
use crate::domain::campaign::record::CallRecord;
use crate::domain::campaign::session::SessionSnapshot;
use crate::domain::campaign::status_view::CampaignStats;
use crate::domain::campaign::target::TargetInput;
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Generic API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Error half of a handler result: status code plus the error envelope
pub type ApiError<T> = (StatusCode, Json<ApiResponse<T>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError<T>>;

pub fn reject<T>(status: StatusCode, message: impl Into<String>) -> ApiError<T> {
    (status, Json(ApiResponse::error(message.into())))
}

/// Start request, targets as exported by the upload page
#[derive(Debug, Deserialize)]
pub struct StartAutodialRequest {
    #[serde(default)]
    pub customers: Vec<TargetInput>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAutodialResponse {
    pub session_id: String,
    pub queued: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub connected: bool,
    pub adapter: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub connected: bool,
    pub is_dialing: bool,
    pub session: SessionSnapshot,
    /// Record of the call being placed, if any
    pub current_call: Option<CallRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub call_delay_secs: u64,
    pub auto_hangup: bool,
    pub telephony_mode: TelephonyMode,
    pub server: String,
    pub port: u16,
    pub username: String,
    pub domain: String,
}

/// Call history query parameters
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
    pub handel: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub records: Vec<CallRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CampaignStats,
    pub completion_rate: f64,
    pub answer_rate: f64,
    pub recent_calls: Vec<CallRecord>,
}

impl StatsResponse {
    pub fn new(stats: CampaignStats, recent_calls: Vec<CallRecord>) -> Self {
        Self {
            completion_rate: stats.completion_rate(),
            answer_rate: stats.answer_rate(),
            stats,
            recent_calls,
        }
    }
}
