/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::{body_json, empty_request, json_request, offline_router, TestFixture};
use hyper::StatusCode;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_create_agent_requires_name_and_role() {
    let app = offline_router();

    for body in [json!({"name": "Scout"}), json!({"role": "researcher"}), json!({"name": "", "role": "x"})] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/agents", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Name and role are required");
    }
}

#[tokio::test]
async fn test_create_agent() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };

    let response = fixture
        .router()
        .oneshot(json_request(
            "POST",
            "/api/agents",
            &json!({"name": "Scout", "role": "researcher"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let agent = body_json(response).await;
    assert_eq!(agent["name"], "Scout");
    assert_eq!(agent["role"], "researcher");
    assert_eq!(agent["status"], "idle");

    let agent_id = Uuid::parse_str(agent["id"].as_str().unwrap()).unwrap();
    let stored = fixture.dal.agents().get(agent_id).unwrap().unwrap();
    assert_eq!(stored.name, "Scout");
    assert_eq!(stored.status, "idle");
    assert!(fixture.dal.agents().get(Uuid::new_v4()).unwrap().is_none());

    let activities = fixture.dal.activities().list_for_agent(agent_id, 10).unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].event, "agent_created");
    assert_eq!(activities[0].message, "Agent Scout created with role researcher");
}

#[tokio::test]
async fn test_list_agents() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let first = fixture.create_test_agent("Alpha");
    let second = fixture.create_test_agent("Beta");

    let response = fixture
        .router()
        .oneshot(empty_request("GET", "/api/agents"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let agents = body["agents"].as_array().unwrap();
    assert_eq!(body["count"].as_u64().unwrap() as usize, agents.len());

    let ids: Vec<&str> = agents.iter().filter_map(|a| a["id"].as_str()).collect();
    assert!(ids.contains(&first.id.to_string().as_str()));
    assert!(ids.contains(&second.id.to_string().as_str()));
}
