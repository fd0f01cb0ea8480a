//! Control API Integration Tests

use autodial::application::{CallOrchestrator, DialerSettings, RuntimeClock};
use autodial::config::Config;
use autodial::domain::campaign::CallOutcome;
use autodial::domain::telephony::TelephonyAdapter;
use autodial::infrastructure::persistence::MemoryCallHistoryStore;
use autodial::infrastructure::telephony::{ScriptedReply, ScriptedTelephonyAdapter};
use autodial::interface::api::{build_router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // For `oneshot`

fn setup() -> (Router, Arc<ScriptedTelephonyAdapter>, Arc<CallOrchestrator>) {
    let telephony = Arc::new(ScriptedTelephonyAdapter::disconnected());
    let history = Arc::new(MemoryCallHistoryStore::new());
    let orchestrator = Arc::new(
        CallOrchestrator::new(telephony.clone(), history)
            .with_clock(Arc::new(RuntimeClock::new()))
            .with_settings(DialerSettings {
                inter_call_delay: Duration::from_secs(5),
            }),
    );

    let state = AppState::new(orchestrator.clone(), &Config::default());
    (build_router(state, None), telephony, orchestrator)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn customers() -> Value {
    json!({
        "customers": [
            {"caseId": "A-1", "customerName": "Alice", "phoneNumber": "100", "handel": "north"},
            {"caseId": "B-2", "customerName": "Bob", "phoneNumber": "200", "handel": "south"}
        ]
    })
}

#[tokio::test]
async fn test_api_health_check() {
    let (app, _, _) = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "OK");
}

#[tokio::test]
async fn test_api_settings() {
    let (app, _, _) = setup();

    let (status, json) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["callDelaySecs"], 5);
    assert_eq!(json["data"]["autoHangup"], true);
    assert_eq!(json["data"]["telephonyMode"], "simulated");
    assert!(json["data"].get("password").is_none());
}

#[tokio::test]
async fn test_api_start_requires_connection() {
    let (app, telephony, _) = setup();

    let (status, json) = send(&app, "POST", "/api/start-autodial", Some(customers())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("not connected"));
    assert!(telephony.placed_numbers().is_empty());

    let (status, json) = send(&app, "POST", "/api/connect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["connected"], true);
    assert_eq!(json["data"]["adapter"], "scripted");

    let (status, json) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["connected"], true);
    assert_eq!(json["data"]["isDialing"], false);
    assert_eq!(json["data"]["session"]["state"], "idle");
}

#[tokio::test]
async fn test_api_start_rejects_bad_customer_lists() {
    let (app, _, _) = setup();
    send(&app, "POST", "/api/connect", None).await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/start-autodial",
        Some(json!({"customers": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/start-autodial",
        Some(json!({"customers": [{"caseId": "A-1", "customerName": "Alice"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_api_full_campaign() {
    let (app, telephony, orchestrator) = setup();
    telephony.script(
        "100",
        [ScriptedReply::outcome(CallOutcome::Answered).after(Duration::from_secs(3))],
    );
    telephony.script(
        "200",
        [ScriptedReply::outcome(CallOutcome::VoiceMail).after(Duration::from_secs(2))],
    );
    send(&app, "POST", "/api/connect", None).await;

    let (status, json) = send(&app, "POST", "/api/start-autodial", Some(customers())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["queued"], 2);

    // A second start while dialing is refused
    let (status, _) = send(&app, "POST", "/api/start-autodial", Some(customers())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let (_, json) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(json["data"]["isDialing"], true);
    assert_eq!(json["data"]["currentCall"]["caseId"], "A-1");
    assert_eq!(json["data"]["currentCall"]["status"], "in progress");
    assert_eq!(json["data"]["currentCall"]["endTime"], "");

    orchestrator.wait_until_idle().await;

    let (status, json) = send(&app, "GET", "/api/call-history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["records"][0]["status"], "Answer");
    assert_eq!(json["data"]["records"][0]["durationSeconds"], 3);
    assert_eq!(json["data"]["records"][1]["status"], "Voice Mail");

    let (_, json) = send(&app, "GET", "/api/call-history?status=Voice%20Mail", None).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["records"][0]["caseId"], "B-2");

    let (_, json) = send(&app, "GET", "/api/call-history?handel=north", None).await;
    assert_eq!(json["data"]["total"], 1);
    let id = json["data"]["records"][0]["id"].as_str().unwrap().to_string();

    let (status, json) = send(&app, "GET", &format!("/api/call-history/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["phoneNumber"], "100");

    let (status, json) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &json["data"];
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["completed"], 2);
    assert_eq!(stats["answered"], 1);
    assert_eq!(stats["notActive"], 1);
    assert_eq!(stats["voiceMail"], 1);
    assert_eq!(stats["inProgress"], 0);
    assert_eq!(stats["completionRate"], 100.0);
    assert_eq!(stats["answerRate"], 50.0);
    assert_eq!(stats["recentCalls"][0]["caseId"], "B-2");
    assert_eq!(stats["recentCalls"][1]["caseId"], "A-1");
}

#[tokio::test(start_paused = true)]
async fn test_api_stop_always_succeeds() {
    let (app, telephony, orchestrator) = setup();

    let (status, json) = send(&app, "POST", "/api/stop-autodial", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(telephony.end_call_count(), 0);

    send(&app, "POST", "/api/connect", None).await;
    send(&app, "POST", "/api/start-autodial", Some(customers())).await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let (status, _) = send(&app, "POST", "/api/stop-autodial", None).await;
    assert_eq!(status, StatusCode::OK);
    orchestrator.wait_until_idle().await;

    assert_eq!(telephony.placed_numbers(), vec!["100"]);
}

#[tokio::test]
async fn test_api_call_history_lookup_errors() {
    let (app, _, _) = setup();

    let (status, json) = send(&app, "GET", "/api/call-history/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/api/call-history/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/call-history?status=Busy", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_disconnect() {
    let (app, telephony, _) = setup();
    send(&app, "POST", "/api/connect", None).await;
    assert!(telephony.is_connected());

    let (status, json) = send(&app, "POST", "/api/disconnect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["connected"], false);
}
