mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{ScriptedBackend, spawn_store};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use visadesk::LlmError;
use visadesk::config::{HistoryConfig, LlmConfig};
use visadesk::db::DbActorHandle;
use visadesk::server::{VisadeskState, visadesk_router};
use visadesk::service::{HistoryService, QueryService};

const UI_ORIGIN: &str = "http://localhost:3000";

async fn app_with(prefix: &str, backend: ScriptedBackend) -> Router {
    app_and_store(prefix, backend).await.0
}

async fn app_and_store(prefix: &str, backend: ScriptedBackend) -> (Router, DbActorHandle) {
    let db = spawn_store(prefix).await;
    let llm_cfg = Arc::new(LlmConfig {
        api_key: "sk-test".to_string(),
        ..LlmConfig::default()
    });
    let history_cfg = Arc::new(HistoryConfig::default());

    let query = QueryService::new(db.clone(), Arc::new(backend), llm_cfg, history_cfg.clone());
    let history = HistoryService::new(db.clone(), history_cfg);
    let state = VisadeskState::new(query, history);
    (visadesk_router(state, &[UI_ORIGIN.to_string()]), db)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn root_and_health_describe_the_api() {
    let app = app_with("route-root", ScriptedBackend::answering()).await;

    let (status, info) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(info["health_check"], "/health");

    let (status, health) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");

    let (status, chat_health) = send(&app, get("/api/chat/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat_health["service"], "chat");
    assert_eq!(chat_health["dependencies"]["database"], "connected");
    assert_eq!(chat_health["dependencies"]["openai_api"], "configured");
}

#[tokio::test]
async fn query_returns_stored_exchange_and_request_id() {
    let app = app_with("route-query", ScriptedBackend::answering()).await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/chat/query",
            &json!({"query": "Do I need a visa for Thailand?", "user_id": "u-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["query"], "Do I need a visa for Thailand?");
    assert_eq!(body["response"], "Answer to: Do I need a visa for Thailand?");
    assert_eq!(body["success"], true);
    assert_eq!(body["metadata"]["total_tokens"], 30);

    let id = body["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, get(&format!("/api/chat/history/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn request_id_is_echoed_when_supplied() {
    let app = app_with("route-reqid", ScriptedBackend::answering()).await;

    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.headers()["x-request-id"], "trace-123");
}

#[tokio::test]
async fn malformed_and_invalid_bodies_are_rejected() {
    let app = app_with("route-invalid", ScriptedBackend::answering()).await;

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/chat/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"query\": "))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_JSON");
    assert_eq!(body["error"]["type"], "validation");

    let (status, body) = send(&app, post_json("/api/chat/query", &json!({"user_id": "u"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let (status, body) = send(&app, post_json("/api/chat/query", &json!({"query": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], "query");

    let (status, body) = send(
        &app,
        post_json("/api/chat/query", &json!({"query": "x".repeat(1001)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, history) = send(&app, get("/api/chat/history")).await;
    assert_eq!(history["total_count"], 0);
}

#[tokio::test]
async fn upstream_failure_surfaces_with_stored_exchange_id() {
    let app = app_with(
        "route-upstream",
        ScriptedBackend::failing(LlmError::UpstreamUnavailable {
            status: None,
            message: "connection reset".to_string(),
        }),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json("/api/chat/query", &json!({"query": "Visa for Mongolia?"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert_eq!(body["error"]["type"], "upstream");

    let id = body["error"]["details"]["exchange_id"].as_i64().unwrap();
    let (status, stored) = send(&app, get(&format!("/api/chat/history/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["success"], false);
    assert_eq!(stored["metadata"]["error_kind"], "upstream_unavailable");
}

#[tokio::test]
async fn upstream_timeout_maps_to_gateway_timeout() {
    let app = app_with(
        "route-timeout",
        ScriptedBackend::failing(LlmError::Timeout(std::time::Duration::from_secs(60))),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json("/api/chat/query", &json!({"query": "Visa for Fiji?"})),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "UPSTREAM_TIMEOUT");
}

#[tokio::test]
async fn history_pages_newest_first_with_bounds() {
    let app = app_with("route-history", ScriptedBackend::answering()).await;
    for question in ["First?", "Second?", "Third?"] {
        let (status, _) = send(
            &app,
            post_json(
                "/api/chat/query",
                &json!({"query": question, "user_id": "alice"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    send(
        &app,
        post_json("/api/chat/query", &json!({"query": "Other user?", "user_id": "bob"})),
    )
    .await;

    let (status, page1) = send(&app, get("/api/chat/history?page_size=2&user_id=alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1["total_count"], 3);
    assert_eq!(page1["page"], 1);
    assert_eq!(page1["page_size"], 2);
    assert_eq!(page1["queries"][0]["query"], "Third?");
    assert_eq!(page1["queries"][1]["query"], "Second?");

    let (_, page2) = send(
        &app,
        get("/api/chat/history?page=2&page_size=2&user_id=alice"),
    )
    .await;
    assert_eq!(page2["queries"].as_array().unwrap().len(), 1);
    assert_eq!(page2["queries"][0]["query"], "First?");

    let (_, beyond) = send(&app, get("/api/chat/history?page=9")).await;
    assert_eq!(beyond["total_count"], 4);
    assert!(beyond["queries"].as_array().unwrap().is_empty());

    let (_, clamped) = send(&app, get("/api/chat/history?page_size=1000")).await;
    assert_eq!(clamped["page_size"], 100);

    let (status, body) = send(&app, get("/api/chat/history?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, get("/api/chat/history?page=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn unknown_ids_and_routes_are_not_found() {
    let app = app_with("route-missing", ScriptedBackend::answering()).await;

    let (status, body) = send(&app, get("/api/chat/history/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["type"], "not_found");

    let (status, body) = send(&app, get("/api/chat/history/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let (status, _) = send(&app, get("/api/chat/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_reflect_successes_and_failures() {
    let app = app_with(
        "route-stats",
        ScriptedBackend::with_outcomes(vec![Err(LlmError::InvalidResponse(
            "empty".to_string(),
        ))]),
    )
    .await;

    let (_, empty) = send(&app, get("/api/chat/stats")).await;
    assert_eq!(empty["total_queries"], 0);
    assert_eq!(empty["last_query_at"], Value::Null);

    send(&app, post_json("/api/chat/query", &json!({"query": "Visa for Togo?"}))).await;
    send(&app, post_json("/api/chat/query", &json!({"query": "Visa for Benin?"}))).await;

    let (status, stats) = send(&app, get("/api/chat/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_queries"], 2);
    assert_eq!(stats["failed_queries"], 1);
    assert_eq!(stats["system_status"], "operational");
    assert_eq!(stats["api_version"], env!("CARGO_PKG_VERSION"));
    assert!(stats["average_response_time"].is_number());
}

#[tokio::test]
async fn cors_preflight_allows_the_ui_origin() {
    let app = app_with("route-cors", ScriptedBackend::answering()).await;

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/chat/query")
        .header(header::ORIGIN, UI_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(preflight).await.unwrap();

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        UI_ORIGIN
    );
}

#[tokio::test]
async fn store_outage_degrades_health_and_fails_with_persistence_error() {
    let (app, db) = app_and_store("route-outage", ScriptedBackend::answering()).await;
    db.shutdown().await.unwrap();

    let (status, health) = send(&app, get("/api/chat/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["dependencies"]["database"], "unavailable");

    let (status, body) = send(&app, get("/api/chat/stats")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PERSISTENCE_ERROR");
    assert_eq!(body["error"]["type"], "persistence");

    let (status, body) = send(
        &app,
        post_json("/api/chat/query", &json!({"query": "Visa for Ghana?"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PERSISTENCE_ERROR");
    assert!(body["error"]["details"].is_null());
}
