/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::{body_json, empty_request, offline_router, TestFixture};
use chrono::{Duration, Utc};
use futures::StreamExt;
use hyper::StatusCode;
use mission_control_models::models::historical_metrics::NewHistoricalMetric;
use tower::ServiceExt;

#[tokio::test]
async fn test_history_rejects_bad_query() {
    let app = offline_router();

    for days in ["soon", "-1", "200000000"] {
        let response = app
            .clone()
            .oneshot(empty_request(
                "GET",
                &format!("/api/metrics/history?days={}", days),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "days must be an integer between 0 and 36500"
        );
    }

    let response = app
        .oneshot(empty_request("GET", "/api/metrics/history?agentId=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid agentId");
}

#[tokio::test]
async fn test_history_groups_by_metric_type() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Charted");
    let other = fixture.create_test_agent("Elsewhere");
    let now = Utc::now();

    let samples = vec![
        NewHistoricalMetric::new(agent.id, "cpu", 10.0, now - Duration::hours(3)).unwrap(),
        NewHistoricalMetric::new(agent.id, "cpu", 20.0, now - Duration::hours(2)).unwrap(),
        NewHistoricalMetric::new(agent.id, "memory", 55.0, now - Duration::hours(2)).unwrap(),
        NewHistoricalMetric::new(agent.id, "cpu", 99.0, now - Duration::days(10)).unwrap(),
        NewHistoricalMetric::new(other.id, "cpu", 70.0, now - Duration::hours(1)).unwrap(),
    ];
    fixture.dal.historical_metrics().create_batch(&samples).unwrap();

    let response = fixture
        .router()
        .oneshot(empty_request(
            "GET",
            &format!("/api/metrics/history?agentId={}", agent.id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["period"]["days"], 7);
    assert!(body["period"]["start"].is_string());

    let cpu: Vec<f64> = body["metrics"]["cpu"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["value"].as_f64().unwrap())
        .collect();
    assert_eq!(cpu, vec![10.0, 20.0]);
    assert_eq!(body["metrics"]["memory"][0]["value"], 55.0);
}

#[tokio::test]
async fn test_history_filters_metric_type_and_days() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Filtered");
    let now = Utc::now();
    let samples = vec![
        NewHistoricalMetric::new(agent.id, "cpu", 1.0, now - Duration::days(20)).unwrap(),
        NewHistoricalMetric::new(agent.id, "memory", 2.0, now - Duration::days(20)).unwrap(),
    ];
    fixture.dal.historical_metrics().create_batch(&samples).unwrap();

    let response = fixture
        .router()
        .oneshot(empty_request(
            "GET",
            &format!(
                "/api/metrics/history?agentId={}&metricType=memory&days=30",
                agent.id
            ),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["period"]["days"], 30);
    let metrics = body["metrics"].as_object().unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics["memory"][0]["value"], 2.0);
}

#[tokio::test]
async fn test_stream_starts_with_connected_event() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Streamed");

    let response = fixture
        .router()
        .oneshot(empty_request("GET", "/api/metrics/stream"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );

    let mut frames = response.into_body().into_data_stream();

    let first = frames.next().await.unwrap().unwrap();
    let first = String::from_utf8(first.to_vec()).unwrap();
    assert!(first.starts_with("event: connected\n"));
    assert!(first.contains("\"type\":\"connected\""));

    let second = frames.next().await.unwrap().unwrap();
    let second = String::from_utf8(second.to_vec()).unwrap();
    assert!(second.starts_with("event: metrics\n"));
    assert!(second.contains(&agent.id.to_string()));
}
