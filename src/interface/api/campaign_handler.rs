//! Autodial campaign handlers

use super::dto::{
    reject, ApiResponse, ApiResult, StartAutodialRequest, StartAutodialResponse, StatsResponse,
};
use super::state::AppState;
use crate::domain::campaign::history::HistoryFilter;
use crate::domain::campaign::status_view::{recent_calls, CampaignStats};
use crate::domain::campaign::target::CallTarget;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Start dialing the given customers in order
pub async fn start_autodial(
    State(state): State<AppState>,
    Json(request): Json<StartAutodialRequest>,
) -> ApiResult<StartAutodialResponse> {
    info!("API: Starting autodial for {} customers", request.customers.len());

    let targets = match request
        .customers
        .into_iter()
        .map(CallTarget::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(targets) => targets,
        Err(e) => {
            warn!("API: Invalid customer list: {}", e);
            return Err(reject(StatusCode::BAD_REQUEST, e.to_string()));
        }
    };

    // Held across start so stats never pair a new session with old targets
    let mut selected = state.selected.write().await;
    let queue: Arc<[CallTarget]> = targets.clone().into();

    match state.orchestrator.start(targets) {
        Ok(session_id) => {
            *selected = queue.clone();
            Ok(Json(ApiResponse::success(StartAutodialResponse {
                session_id: session_id.to_string(),
                queued: queue.len(),
            })))
        }
        Err(e) => {
            warn!("API: Autodial rejected: {}", e);
            Err(reject(StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

/// Stop the running session; always succeeds
pub async fn stop_autodial(State(state): State<AppState>) -> Json<ApiResponse<&'static str>> {
    info!("API: Stopping autodial");
    state.orchestrator.stop().await;
    Json(ApiResponse::success("Autodial stopped"))
}

/// Statistics for the most recently started target set
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    let selected = state.selected_targets().await;
    let snapshot = state.orchestrator.snapshot();

    let history = match state.orchestrator.history().list(HistoryFilter::default()).await {
        Ok(history) => history,
        Err(e) => {
            error!("API: Failed to load call history: {}", e);
            return Err(reject(StatusCode::SERVICE_UNAVAILABLE, e.to_string()));
        }
    };

    let stats = CampaignStats::compute(&selected, &history, &snapshot);
    let recent = recent_calls(&history, state.recent_calls_limit);

    Ok(Json(ApiResponse::success(StatsResponse::new(stats, recent))))
}
