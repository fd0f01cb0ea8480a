//! Device connection and status handlers

use super::dto::{ApiResponse, ApiResult, ConnectionResponse, SettingsResponse, StatusResponse, reject};
use super::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info, warn};

/// Health check
pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("OK"))
}

/// Connect the telephony device
pub async fn connect(State(state): State<AppState>) -> ApiResult<ConnectionResponse> {
    info!("API: Connecting telephony device");

    let telephony = state.orchestrator.telephony();
    match telephony.connect().await {
        Ok(()) => Ok(Json(ApiResponse::success(ConnectionResponse {
            connected: telephony.is_connected(),
            adapter: telephony.name().to_string(),
        }))),
        Err(e) => {
            error!("API: Failed to connect telephony device: {}", e);
            Err(reject(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

/// Disconnect the telephony device, stopping any running session first
pub async fn disconnect(State(state): State<AppState>) -> ApiResult<ConnectionResponse> {
    info!("API: Disconnecting telephony device");

    if state.orchestrator.is_dialing() {
        warn!("API: Stopping running dial session before disconnect");
        state.orchestrator.stop().await;
    }

    let telephony = state.orchestrator.telephony();
    match telephony.disconnect().await {
        Ok(()) => Ok(Json(ApiResponse::success(ConnectionResponse {
            connected: telephony.is_connected(),
            adapter: telephony.name().to_string(),
        }))),
        Err(e) => {
            error!("API: Failed to disconnect telephony device: {}", e);
            Err(reject(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

/// Device and session status
pub async fn get_status(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let snapshot = state.orchestrator.snapshot();

    let current_call = match snapshot.current_record_id {
        Some(id) => match state.orchestrator.history().get(id).await {
            Ok(record) => record,
            Err(e) => {
                error!("API: Failed to load current call {}: {}", id, e);
                return Err(reject(StatusCode::SERVICE_UNAVAILABLE, e.to_string()));
            }
        },
        None => None,
    };

    Ok(Json(ApiResponse::success(StatusResponse {
        connected: state.orchestrator.telephony().is_connected(),
        is_dialing: snapshot.state.is_active(),
        session: snapshot,
        current_call,
    })))
}

/// Dialer and device settings
pub async fn get_settings(State(state): State<AppState>) -> Json<ApiResponse<SettingsResponse>> {
    let telephony = &state.telephony;
    Json(ApiResponse::success(SettingsResponse {
        call_delay_secs: state.orchestrator.settings().inter_call_delay.as_secs(),
        auto_hangup: true,
        telephony_mode: telephony.mode,
        server: telephony.server.clone(),
        port: telephony.port,
        username: telephony.username.clone(),
        domain: telephony.domain.clone(),
    }))
}
