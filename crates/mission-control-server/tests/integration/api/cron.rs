/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::{body_json, empty_request, offline_router, TestFixture, TEST_CRON_SECRET};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use hyper::StatusCode;
use mission_control_models::models::activities::NewActivity;
use mission_control_models::models::historical_metrics::NewHistoricalMetric;
use mission_control_models::schema::historical_metrics;
use tower::ServiceExt;

#[tokio::test]
async fn test_trigger_rejects_wrong_secret() {
    let app = offline_router();

    for uri in ["/api/cron/health?secret=wrong", "/api/cron/health"] {
        let response = app.clone().oneshot(empty_request("POST", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_health_report_classifies_agents() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let fresh = fixture.create_test_agent("Fresh");
    let stale = fixture.create_test_agent("Stale");
    let lagging = fixture.create_test_agent("Lagging");
    fixture.set_agent_state(stale.id, "running", Utc::now() - Duration::minutes(30));
    fixture.set_agent_state(lagging.id, "running", Utc::now() - Duration::minutes(7));

    let response = fixture
        .router()
        .oneshot(empty_request("GET", "/api/cron/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["healthCheckInterval"], 5);

    let status_of = |id: uuid::Uuid| {
        body["agents"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["agentId"] == id.to_string().as_str())
            .map(|a| a["status"].as_str().unwrap().to_string())
            .unwrap()
    };
    assert_eq!(status_of(fresh.id), "healthy");
    assert_eq!(status_of(stale.id), "down");
    assert_eq!(status_of(lagging.id), "degraded");

    let summary = &body["summary"];
    assert_eq!(
        summary["total"].as_u64().unwrap(),
        summary["healthy"].as_u64().unwrap()
            + summary["degraded"].as_u64().unwrap()
            + summary["down"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn test_error_rate_degrades_fresh_agent() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Flaky");
    // One agent_created plus three errors: 75% error rate.
    let errors: Vec<NewActivity> = (0..3)
        .map(|i| NewActivity::new(agent.id, "error", format!("failure {}", i), None).unwrap())
        .collect();
    fixture.dal.activities().create_batch(&errors).unwrap();

    let response = fixture
        .router()
        .oneshot(empty_request("GET", "/api/cron/health"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let entry = body["agents"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["agentId"] == agent.id.to_string().as_str())
        .unwrap()
        .clone();

    assert_eq!(entry["status"], "degraded");
    assert_eq!(entry["errorRate"], 75.0);
}

#[tokio::test]
async fn test_trigger_logs_health_checks() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Logged");

    let response = fixture
        .router()
        .oneshot(empty_request(
            "POST",
            &format!("/api/cron/health?secret={}", TEST_CRON_SECRET),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["agentsChecked"].as_u64().unwrap() >= 1);
    assert!(body["timestamp"].is_string());

    let activities = fixture.dal.activities().list_for_agent(agent.id, 10).unwrap();
    let check = activities
        .iter()
        .find(|a| a.event == "health_check")
        .expect("health_check activity logged");
    assert_eq!(check.message, "Status: healthy, Minutes since heartbeat: 0");

    let last_check = fixture
        .dal
        .activities()
        .latest_for_event("health_check")
        .unwrap();
    assert!(last_check.is_some());
}

#[tokio::test]
async fn test_metrics_run_records_and_prunes() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let active = fixture.create_test_agent("Active");
    let offline = fixture.create_test_agent("Sleeping");
    fixture.set_agent_state(offline.id, "offline", Utc::now());

    let old = NewHistoricalMetric::new(active.id, "cpu", 12.0, Utc::now() - Duration::days(45))
        .unwrap();
    fixture.dal.historical_metrics().create_batch(&[old]).unwrap();

    let response = fixture
        .router()
        .oneshot(empty_request("POST", "/api/cron/metrics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["retentionDays"], 30);
    assert!(body["recorded"].as_u64().unwrap() >= 3);
    assert!(body["deleted"].as_u64().unwrap() >= 1);

    let conn = &mut fixture.dal.pool.get().unwrap();
    let cutoff = Utc::now() - Duration::days(30);
    let expired: i64 = historical_metrics::table
        .filter(historical_metrics::recorded_at.lt(cutoff))
        .count()
        .get_result(conn)
        .unwrap();
    assert_eq!(expired, 0);

    let active_samples: i64 = historical_metrics::table
        .filter(historical_metrics::agent_id.eq(active.id))
        .count()
        .get_result(conn)
        .unwrap();
    assert_eq!(active_samples, 3);

    let offline_samples: i64 = historical_metrics::table
        .filter(historical_metrics::agent_id.eq(offline.id))
        .count()
        .get_result(conn)
        .unwrap();
    assert_eq!(offline_samples, 0);
}
