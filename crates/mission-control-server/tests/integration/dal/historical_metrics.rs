/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::TestFixture;
use chrono::{Duration, Utc};
use mission_control_models::models::historical_metrics::NewHistoricalMetric;
use mission_control_server::dal::MetricHistoryFilter;

#[test]
fn test_list_applies_filters_and_limit() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Sampled");
    let other = fixture.create_test_agent("Unrelated");
    let now = Utc::now();

    let samples: Vec<NewHistoricalMetric> = (1..=5)
        .map(|i| {
            NewHistoricalMetric::new(agent.id, "cpu", i as f64, now - Duration::minutes(10 - i))
                .unwrap()
        })
        .chain([
            NewHistoricalMetric::new(agent.id, "memory", 40.0, now).unwrap(),
            NewHistoricalMetric::new(other.id, "cpu", 99.0, now).unwrap(),
        ])
        .collect();
    assert_eq!(
        fixture.dal.historical_metrics().create_batch(&samples).unwrap(),
        7
    );

    let filter = MetricHistoryFilter {
        agent_id: Some(agent.id),
        metric_type: Some("cpu".to_string()),
        since: now - Duration::hours(1),
        limit: 3,
    };
    let rows = fixture.dal.historical_metrics().list(&filter).unwrap();
    let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
    assert!(rows.iter().all(|r| r.agent_id == agent.id));
}

#[test]
fn test_delete_older_than() {
    let Some(fixture) = TestFixture::new() else {
        return;
    };
    let agent = fixture.create_test_agent("Aging");
    let now = Utc::now();
    let samples = vec![
        NewHistoricalMetric::new(agent.id, "cpu", 1.0, now - Duration::days(31)).unwrap(),
        NewHistoricalMetric::new(agent.id, "cpu", 2.0, now - Duration::days(29)).unwrap(),
    ];
    fixture.dal.historical_metrics().create_batch(&samples).unwrap();

    let cutoff = now - Duration::days(30);
    assert_eq!(
        fixture.dal.historical_metrics().delete_older_than(cutoff).unwrap(),
        1
    );

    let remaining = fixture
        .dal
        .historical_metrics()
        .list(&MetricHistoryFilter {
            agent_id: Some(agent.id),
            metric_type: None,
            since: now - Duration::days(365),
            limit: 100,
        })
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].value, 2.0);
}
