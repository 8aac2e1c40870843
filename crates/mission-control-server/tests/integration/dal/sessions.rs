/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::TestFixture;
use mission_control_models::models::agents::Agent;
use mission_control_models::models::sessions::{NewSession, Session};
use mission_control_server::dal::{SessionFilter, SessionPatch};
use uuid::Uuid;

fn record(fixture: &TestFixture, agent: &Agent, input: &str) -> Session {
    let new_session = NewSession::new(
        agent.id,
        agent.name.clone(),
        None,
        input.to_string(),
        None,
    )
    .unwrap();
    fixture.dal.sessions().create(&new_session).unwrap()
}

#[test]
fn test_list_filters_and_counts() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Lister");
    let first = record(&fixture, &agent, "one");
    record(&fixture, &agent, "two");
    record(&fixture, &agent, "three");

    fixture
        .dal
        .sessions()
        .patch(first.id, Some("failed".to_string()), None, None)
        .unwrap();

    let (rows, total) = fixture
        .dal
        .sessions()
        .list(&SessionFilter {
            agent_id: Some(agent.id),
            status: Some("running".to_string()),
            limit: 1,
            offset: 0,
        })
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "running");

    let (rows, total) = fixture
        .dal
        .sessions()
        .list(&SessionFilter {
            agent_id: Some(agent.id),
            status: None,
            limit: 50,
            offset: 2,
        })
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_patch_lifecycle() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Patcher");
    let session = record(&fixture, &agent, "input");

    let outcome = fixture
        .dal
        .sessions()
        .patch(session.id, Some("running".to_string()), None, None)
        .unwrap();
    match outcome {
        SessionPatch::Updated(s) => {
            assert_eq!(s.status, "running");
            assert!(s.completed_at.is_none());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let outcome = fixture
        .dal
        .sessions()
        .patch(session.id, Some("completed".to_string()), None, Some(250))
        .unwrap();
    let completed = match outcome {
        SessionPatch::Updated(s) => s,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(completed.status, "completed");
    assert_eq!(completed.duration_ms, Some(250));
    assert!(completed.completed_at.is_some());

    // Output stays patchable after completion.
    let outcome = fixture
        .dal
        .sessions()
        .patch(session.id, None, Some("late output".to_string()), None)
        .unwrap();
    match outcome {
        SessionPatch::Updated(s) => {
            assert_eq!(s.output.as_deref(), Some("late output"));
            assert_eq!(s.completed_at, completed.completed_at);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let outcome = fixture
        .dal
        .sessions()
        .patch(session.id, Some("running".to_string()), None, None)
        .unwrap();
    assert!(matches!(outcome, SessionPatch::Rejected(_)));
}

#[test]
fn test_patch_and_rerun_unknown_session() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let missing = Uuid::new_v4();

    let outcome = fixture
        .dal
        .sessions()
        .patch(missing, Some("completed".to_string()), None, None)
        .unwrap();
    assert!(matches!(outcome, SessionPatch::NotFound));
    assert!(fixture.dal.sessions().rerun(missing).unwrap().is_none());
}
