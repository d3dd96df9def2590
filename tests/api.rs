// HTTP API exercised in-process through the router
#![cfg(feature = "server")]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use std::time::Duration;
use serde_json::Value;
use superstore_analytics::api::{router, AppState};
use superstore_analytics::DashboardConfig;
use tower::ServiceExt;

fn test_state() -> AppState {
    AppState::new(DashboardConfig {
        row_count: 90,
        seed: Some(17),
        ..DashboardConfig::default()
    })
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/sessions").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["row_count"], 90);
    body["data"]["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = router(test_state());
    let (status, body) = send(&app, Method::GET, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "OK");
}

#[tokio::test]
async fn test_dashboard_defaults_to_everything() {
    let app = router(test_state());
    let id = create_session(&app).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{}/dashboard", id)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["empty"], false);
    assert_eq!(data["records"].as_array().unwrap().len(), 90);
    assert_eq!(data["kpis"].as_array().unwrap().len(), 3);
    assert_eq!(data["kpis"][0]["label"], "Total Sales");
    assert_eq!(data["summary"]["sales_by_month"][0]["month"], "2024-01");
    assert_eq!(data["records"][0]["Order Date"], "2024-03-30");
}

#[tokio::test]
async fn test_dashboard_filter_by_region() {
    let app = router(test_state());
    let id = create_session(&app).await;

    let uri = format!("/api/sessions/{}/dashboard?regions=East&categories=Technology,Furniture", id);
    let (status, body) = send(&app, Method::GET, &uri).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["regions"], serde_json::json!(["East"]));
    for record in data["records"].as_array().unwrap() {
        assert_eq!(record["Region"], "East");
        assert_ne!(record["Category"], "Office Supplies");
    }
}

#[tokio::test]
async fn test_empty_selection_signals_no_data() {
    let app = router(test_state());
    let id = create_session(&app).await;

    let (status, body) =
        send(&app, Method::GET, &format!("/api/sessions/{}/dashboard?regions=", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["empty"], true);
    assert!(body["data"]["summary"].is_null());
    assert!(body["data"]["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_options_and_teardown() {
    let state = test_state();
    let app = router(state.clone());
    let id = create_session(&app).await;
    assert_eq!(state.session_count(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{}/options", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["data"]["regions"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(state.session_count(), 0);

    let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{}/options", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let state = test_state();
    let app = router(state.clone());
    let a = create_session(&app).await;
    let b = create_session(&app).await;
    assert_ne!(a, b);

    // Narrowing one session's filter leaves the other untouched
    send(&app, Method::GET, &format!("/api/sessions/{}/dashboard?regions=", a)).await;
    let (_, body) = send(&app, Method::GET, &format!("/api/sessions/{}/dashboard", b)).await;
    assert_eq!(body["data"]["empty"], false);
    assert_eq!(state.session_count(), 2);
}

#[tokio::test]
async fn test_session_cap_evicts_oldest() {
    let state = test_state().with_max_sessions(2);
    let app = router(state.clone());
    let first = create_session(&app).await;
    let second = create_session(&app).await;
    let third = create_session(&app).await;
    assert_eq!(state.session_count(), 2);

    let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{}/options", first)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("unknown session: {}", first));

    for id in [second, third] {
        let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{}/options", id)).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_idle_sessions_expire() {
    let state = test_state().with_session_ttl(Duration::ZERO);
    let app = router(state.clone());
    let stale = create_session(&app).await;
    let fresh = create_session(&app).await;
    assert_eq!(state.session_count(), 1);

    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{}/dashboard", stale)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{}/dashboard", fresh)).await;
    assert_eq!(status, StatusCode::OK);
}
