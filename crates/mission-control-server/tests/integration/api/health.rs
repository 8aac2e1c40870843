/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::{body_bytes, empty_request, offline_router, TestFixture};
use axum::{body::Body, http::Request};
use hyper::StatusCode;
use tower::ServiceExt;

#[tokio::test]
async fn test_healthz_endpoint() {
    let response = offline_router()
        .oneshot(empty_request("GET", "/healthz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn test_readyz_with_database() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };

    let response = fixture
        .router()
        .oneshot(empty_request("GET", "/readyz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Ready");
}

#[tokio::test]
async fn test_metrics_records_http_requests() {
    let app = offline_router();

    let _ = app
        .clone()
        .oneshot(empty_request("GET", "/healthz"))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("GET", "/internal/metrics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert_eq!(content_type, "text/plain; version=0.0.4");

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("mission_control_http_requests_total"));
    assert!(body.contains("mission_control_http_request_duration_seconds"));
    assert!(body.contains("endpoint=\"/healthz\""));
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let response = offline_router()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/agents")
                .header("Origin", "http://localhost:3001")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3001")
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let response = offline_router()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/agents")
                .header("Origin", "http://evil.example")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
