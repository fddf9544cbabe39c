//! Integration tests for the REST client against an in-process axum server.

use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use trace_api::{ApiClient, ApiError, Issue};
use trace_types::Severity;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn backend() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy"})) }))
        .route(
            "/api/telemetry",
            get(|Query(q): Query<std::collections::HashMap<String, String>>| async move {
                let count: usize = q.get("count").and_then(|c| c.parse().ok()).unwrap_or(1);
                let region = q.get("region").cloned().unwrap_or_default();
                let samples: Vec<Value> = (0..count)
                    .map(|i| {
                        json!({
                            "region": region,
                            "timestamp": format!("2024-05-01T12:00:{:02}", i),
                            "energy": 70.0 + i as f64,
                            "congestion": 40.0,
                            "anomaly_score": 12.5,
                            "traffic_load": 44.0,
                            "trx_utilization": 78.0,
                            "power_draw": 105.0
                        })
                    })
                    .collect();
                Json(Value::Array(samples))
            }),
        )
        .route(
            "/api/active-users/{region}",
            get(|Path(region): Path<String>| async move {
                Json(json!({
                    "region": region,
                    "timestamp": "t",
                    "activeUsers": 24000,
                    "towerCluster": "Tower-2",
                    "lastOptimization": "None",
                    "surgeDetected": false
                }))
            }),
        )
        .route(
            "/api/issues",
            get(|| async {
                Json(json!([
                    {"id": "issue-aaaa0001", "title": "Energy Spike", "severity": "critical"},
                    {"id": "issue-aaaa0002", "title": "TRX Overload", "severity": "medium",
                     "affectedTowers": ["Tower-5"], "unknownField": 1}
                ]))
            }),
        )
        .route(
            "/api/health/{region}",
            get(|| async { Json(json!({"score": 72.4, "status": "Degraded"})) }),
        )
        .route(
            "/api/agents/status",
            get(|| async {
                Json(json!([
                    {"name": "Monitoring Agent", "status": "active", "uptime": "27h",
                     "metrics": {"cpu": 12}},
                    {"name": "Action Agent", "status": "idle", "uptime": "3h"}
                ]))
            }),
        )
        .route(
            "/agent",
            post(|Json(body): Json<Value>| async move {
                match body["mode"].as_str() {
                    Some("chat") => Json(json!({
                        "success": true,
                        "response": format!("echo: {}", body["message"].as_str().unwrap_or("")),
                        "source": "agent"
                    })),
                    _ => Json(json!({
                        "success": true,
                        "analysis": format!("analysis of {}", body["issue"]["id"].as_str().unwrap_or("?")),
                        "source": "agent"
                    })),
                }
            }),
        )
}

#[tokio::test]
async fn test_read_endpoints() {
    let url = serve(backend()).await;
    let client = ApiClient::builder().endpoint(url).region("eu-west-2").build();

    client.health_check().await.unwrap();

    let series = client.telemetry(5).await.unwrap();
    assert_eq!(series.len(), 5);
    assert_eq!(series[0].region.as_deref(), Some("eu-west-2"));
    assert_eq!(series[4].energy, 74.0);

    let users = client.active_users().await.unwrap();
    assert_eq!(users.region.as_deref(), Some("eu-west-2"));
    assert_eq!(users.active_users, 24000);

    let issues = client.issues().await.unwrap();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].severity, Severity::Critical);
    assert_eq!(issues[1].affected_towers, vec!["Tower-5"]);

    let health = client.region_health().await.unwrap();
    assert_eq!(health.status, trace_types::HealthStatus::Degraded);

    let agents = client.agent_statuses().await.unwrap();
    assert_eq!(agents.len(), 2);
    assert!(agents[0].is_active());
    assert!(!agents[1].is_active());
}

#[tokio::test]
async fn test_agent_chat_and_analyze() {
    let url = serve(backend()).await;
    let client = ApiClient::builder().endpoint(url).build();

    let reply = client.chat("system health?", "trace_dashboard").await.unwrap();
    assert_eq!(reply.text(), Some("echo: system health?"));

    let issue = Issue::new("issue-1234abcd", "Network Congestion", Severity::High);
    let reply = client.analyze(&issue).await.unwrap();
    assert_eq!(reply.text(), Some("analysis of issue-1234abcd"));
}

#[tokio::test]
async fn test_missing_endpoint_is_status_error() {
    let url = serve(backend()).await;
    let client = ApiClient::builder().endpoint(url).build();

    let err = client.resolutions(10).await.unwrap_err();
    assert!(matches!(err, ApiError::Status(404)));
    assert!(!err.is_unreachable());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let app = Router::new().route("/api/issues", get(|| async { "not json" }));
    let url = serve(app).await;
    let client = ApiClient::builder().endpoint(url).build();

    let err = client.issues().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_remediate_returns_any_status() {
    let app = Router::new().route(
        "/remediate",
        post(|Json(body): Json<Value>| async move {
            match body["issueId"].as_str() {
                Some("issue-ok") => (
                    StatusCode::OK,
                    Json(json!({
                        "success": true,
                        "issueId": "issue-ok",
                        "action": body["action"],
                        "message": "Simulated restart_agent - Agent not available",
                        "source": "fallback"
                    })),
                ),
                Some("issue-missing") => (StatusCode::NOT_FOUND, Json(json!({}))),
                _ => (StatusCode::SERVICE_UNAVAILABLE, Json(json!(null))),
            }
        }),
    );
    let url = serve(app).await;
    let client = ApiClient::builder().endpoint(url).build();

    let reply = client.remediate("issue-ok", "restart_agent").await.unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(reply.message(), Some("Simulated restart_agent - Agent not available"));
    let body = reply.body.unwrap();
    assert_eq!(body.action.as_deref(), Some("restart_agent"));

    let reply = client.remediate("issue-missing", "restart_agent").await.unwrap();
    assert_eq!(reply.status, 404);
    assert!(!reply.is_server_error());

    let reply = client.remediate("issue-boom", "redeploy_agent").await.unwrap();
    assert!(reply.is_server_error());
    assert!(reply.message().is_none());
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::builder()
        .endpoint(format!("http://{}", addr))
        .timeout(Duration::from_secs(2))
        .build();

    let err = client.remediate("issue-1", "restart_agent").await.unwrap_err();
    assert!(err.is_unreachable(), "unexpected error: {:?}", err);
}
