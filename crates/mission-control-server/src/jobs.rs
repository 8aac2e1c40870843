/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Periodic jobs shared by the cron endpoints, the CLI and the background
//! schedulers.

use crate::dal::{DalError, DAL};
use crate::health::{assess_agents, AgentHealth};
use crate::metrics::{
    HEALTH_CHECK_RESULTS_TOTAL, METRIC_SAMPLES_PRUNED_TOTAL, METRIC_SAMPLES_RECORDED_TOTAL,
};
use crate::sampler::MetricsSource;
use chrono::{DateTime, Duration, Utc};
use mission_control_models::models::activities::{NewActivity, EVENT_HEALTH_CHECK};
use mission_control_models::models::historical_metrics::{
    NewHistoricalMetric, METRIC_CPU, METRIC_MEMORY, METRIC_REQUESTS,
};
use serde_json::json;
use tracing::{error, info};

/// Result of one health-check run.
#[derive(Debug, Clone)]
pub struct HealthCheckRun {
    pub agents_checked: usize,
    pub timestamp: DateTime<Utc>,
    pub statuses: Vec<AgentHealth>,
}

/// Result of one metrics-recording run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsRun {
    pub recorded: usize,
    pub deleted: usize,
    pub retention_days: i64,
}

fn health_check_activity(health: &AgentHealth) -> Result<NewActivity, String> {
    NewActivity::new(
        health.agent_id,
        EVENT_HEALTH_CHECK,
        format!(
            "Status: {}, Minutes since heartbeat: {}",
            health.status, health.minutes_since_heartbeat
        ),
        Some(json!({
            "status": health.status,
            "minutesSinceHeartbeat": health.minutes_since_heartbeat,
            "errorRate": health.error_rate,
        })),
    )
}

/// Classifies every agent and appends one `health_check` activity per agent.
pub fn run_health_check(dal: &DAL, interval_minutes: i64) -> Result<HealthCheckRun, DalError> {
    let now = Utc::now();
    let statuses = assess_agents(dal, interval_minutes, now)?;

    let activities: Vec<NewActivity> = statuses
        .iter()
        .filter_map(|health| match health_check_activity(health) {
            Ok(activity) => Some(activity),
            Err(e) => {
                error!("Skipping health check record for {}: {}", health.agent_id, e);
                None
            }
        })
        .collect();

    dal.activities().create_batch(&activities)?;

    for health in &statuses {
        HEALTH_CHECK_RESULTS_TOTAL
            .with_label_values(&[health.status.as_str()])
            .inc();
    }

    info!("Health check recorded for {} agents", statuses.len());

    Ok(HealthCheckRun {
        agents_checked: statuses.len(),
        timestamp: now,
        statuses,
    })
}

/// Records cpu, memory and request-rate samples for every non-offline agent,
/// then deletes samples older than the retention window.
pub fn record_metrics(
    dal: &DAL,
    sampler: &dyn MetricsSource,
    retention_days: i64,
) -> Result<MetricsRun, DalError> {
    let now = Utc::now();
    let agents = dal.agents().list_active(None)?;

    let mut samples = Vec::with_capacity(agents.len() * 3);
    for agent in &agents {
        let reading = sampler.sample(agent);
        for (metric_type, value) in [
            (METRIC_CPU, reading.cpu),
            (METRIC_MEMORY, reading.memory),
            (METRIC_REQUESTS, reading.requests_per_min as f64),
        ] {
            match NewHistoricalMetric::new(agent.id, metric_type, value, now) {
                Ok(sample) => samples.push(sample),
                Err(e) => error!("Dropping {} sample for {}: {}", metric_type, agent.id, e),
            }
        }
    }

    let recorded = dal.historical_metrics().create_batch(&samples)?;
    let cutoff = now - Duration::days(retention_days);
    let deleted = dal.historical_metrics().delete_older_than(cutoff)?;

    METRIC_SAMPLES_RECORDED_TOTAL.inc_by(recorded as u64);
    METRIC_SAMPLES_PRUNED_TOTAL.inc_by(deleted as u64);

    info!(
        "Recorded {} metric samples, pruned {} older than {} days",
        recorded, deleted, retention_days
    );

    Ok(MetricsRun {
        recorded,
        deleted,
        retention_days,
    })
}
