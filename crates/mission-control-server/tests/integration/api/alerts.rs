/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::{body_json, empty_request, json_request, offline_router, TestFixture};
use hyper::StatusCode;
use mission_control_models::models::alert_history::NewAlertHistory;
use mission_control_models::models::alert_rules::NewAlertRule;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_alert_test_rejects_bad_email_without_sending() {
    let response = offline_router()
        .oneshot(json_request(
            "POST",
            "/api/alerts/test",
            &json!({"notify_type": "email", "destination": "not-an-email"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid email address");
}

#[tokio::test]
async fn test_alert_test_requires_fields() {
    let response = offline_router()
        .oneshot(json_request(
            "POST",
            "/api/alerts/test",
            &json!({"notify_type": "webhook"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing notify_type or destination"
    );
}

#[tokio::test]
async fn test_alert_test_valid_email() {
    let response = offline_router()
        .oneshot(json_request(
            "POST",
            "/api/alerts/test",
            &json!({"notify_type": "email", "destination": "ops@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Email configuration validated (sending not implemented)"
    );
}

#[tokio::test]
async fn test_create_rule_validation() {
    let app = offline_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/alerts",
            &json!({"name": "High CPU", "metric": "cpu", "threshold": 80}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing required fields");

    let response = app
        .oneshot(json_request(
            "DELETE",
            "/api/alerts",
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing rule ID");
}

#[tokio::test]
async fn test_rule_lifecycle() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let app = fixture.router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/alerts",
            &json!({
                "name": "High CPU",
                "metric": "cpu",
                "threshold": "85.5",
                "condition": "gt",
                "notify_type": "discord",
                "destination": "https://discord.example/hook"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let rule = body_json(response).await;
    assert_eq!(rule["threshold"], 85.5);
    assert_eq!(rule["enabled"], true);
    let rule_id = rule["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/alerts",
            &json!({"id": rule_id, "enabled": false, "threshold": 90}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["enabled"], false);
    assert_eq!(updated["threshold"], 90.0);
    assert_eq!(updated["name"], "High CPU");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/alerts",
            &json!({"id": rule_id, "condition": "between"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/alerts"))
        .await
        .unwrap();
    let rules = body_json(response).await;
    assert!(rules
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"] == rule_id.as_str()));

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/alerts?id={}", rule_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true}));

    let response = app
        .oneshot(empty_request("DELETE", &format!("/api/alerts?id={}", rule_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_unknown_rule() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };

    let response = fixture
        .router()
        .oneshot(json_request(
            "PUT",
            "/api/alerts",
            &json!({"id": Uuid::new_v4(), "name": "Renamed"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_acknowledge_alert() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let rule = fixture
        .dal
        .alert_rules()
        .create(
            &NewAlertRule::new(
                "Memory".to_string(),
                "memory".to_string(),
                90.0,
                "gt".to_string(),
                "webhook".to_string(),
                "https://hooks.example/x".to_string(),
            )
            .unwrap(),
        )
        .unwrap();
    let alert = fixture
        .dal
        .alert_history()
        .create(&NewAlertHistory::new(rule.id, "memory at 95%".to_string()).unwrap())
        .unwrap();
    assert!(!alert.acknowledged);

    let app = fixture.router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/alerts/history",
            &json!({"id": alert.id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["acknowledged"], true);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/alerts/history",
            &json!({"id": alert.id, "acknowledged": false}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["acknowledged"], false);

    let response = app
        .oneshot(empty_request("GET", "/api/alerts/history"))
        .await
        .unwrap();
    let history = body_json(response).await;
    assert!(history
        .as_array()
        .unwrap()
        .iter()
        .any(|h| h["message"] == "memory at 95%"));
}
