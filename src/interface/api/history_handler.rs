//! Call history handlers

use super::dto::{reject, ApiResponse, ApiResult, HistoryQuery, HistoryResponse};
use super::state::AppState;
use crate::domain::campaign::history::HistoryFilter;
use crate::domain::campaign::record::CallRecord;
use crate::domain::campaign::value_object::CallStatus;
use crate::domain::shared::value_objects::CallRecordId;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

/// List call records, optionally filtered by status label and handel
pub async fn list_call_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<HistoryResponse> {
    info!("API: Listing call history with filters: {:?}", query);

    let mut filter = HistoryFilter::default();
    if let Some(label) = query.status.as_deref().filter(|s| !s.is_empty()) {
        let Some(status) = CallStatus::from_str(label) else {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                format!("Unknown call status: {}", label),
            ));
        };
        filter = filter.with_status(status);
    }
    if let Some(handel) = query.handel.filter(|h| !h.is_empty()) {
        filter = filter.with_handel(handel);
    }

    let view = match state.orchestrator.history().list(filter).await {
        Ok(view) => view,
        Err(e) => {
            error!("API: Failed to list call history: {}", e);
            return Err(reject(StatusCode::SERVICE_UNAVAILABLE, e.to_string()));
        }
    };

    let records = view.to_vec();
    let total = records.len();
    Ok(Json(ApiResponse::success(HistoryResponse { records, total })))
}

/// Get a call record by ID
pub async fn get_call_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CallRecord> {
    info!("API: Getting call record ID: {}", id);

    let Ok(record_id) = id.parse::<CallRecordId>() else {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            format!("Invalid call record id: {}", id),
        ));
    };

    match state.orchestrator.history().get(record_id).await {
        Ok(Some(record)) => Ok(Json(ApiResponse::success(record))),
        Ok(None) => Err(reject(
            StatusCode::NOT_FOUND,
            format!("Call record {} not found", id),
        )),
        Err(e) => {
            error!("API: Failed to get call record: {}", e);
            Err(reject(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
    }
}
