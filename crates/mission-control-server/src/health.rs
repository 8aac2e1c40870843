/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Agent Health Classification
//!
//! Maps an agent's heartbeat age and trailing error ratio onto
//! `healthy | degraded | down`. With a check interval of `I` minutes:
//!
//! - `down` when the heartbeat is more than `2·I` minutes old
//! - `degraded` when it is more than `I` minutes old, or more than 10% of the
//!   agent's activities in the last hour were `error`/`fail` events
//! - `healthy` otherwise
//!
//! [`classify`] is pure; [`assess_agents`] gathers the inputs from the store.

use crate::dal::{DalError, DAL};
use chrono::{DateTime, Duration, Utc};
use mission_control_models::models::agents::Agent;
use serde::Serialize;
use uuid::Uuid;

/// Error percentage above which an agent is degraded.
pub const ERROR_RATE_DEGRADED_THRESHOLD: f64 = 10.0;

/// Window over which the error rate is computed.
pub const ERROR_RATE_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Down => "down",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(minutes_since_heartbeat: i64, error_rate: f64, interval_minutes: i64) -> HealthStatus {
    if minutes_since_heartbeat > interval_minutes * 2 {
        HealthStatus::Down
    } else if minutes_since_heartbeat > interval_minutes
        || error_rate > ERROR_RATE_DEGRADED_THRESHOLD
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Whole minutes elapsed since `last_heartbeat`, rounded down.
pub fn minutes_since(last_heartbeat: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last_heartbeat).num_milliseconds().div_euclid(60_000)
}

/// Percentage of `errors` in `total`; zero when there was no activity.
pub fn error_rate(errors: i64, total: i64) -> f64 {
    if total <= 0 {
        0.0
    } else {
        errors as f64 / total as f64 * 100.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Health of a single agent as reported by the health endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentHealth {
    pub agent_id: Uuid,
    pub name: String,
    pub status: HealthStatus,
    pub last_heartbeat: DateTime<Utc>,
    pub minutes_since_heartbeat: i64,
    /// Percentage, rounded to two decimals.
    pub error_rate: f64,
}

impl AgentHealth {
    pub fn evaluate(
        agent: &Agent,
        errors: i64,
        total: i64,
        interval_minutes: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let minutes = minutes_since(agent.last_heartbeat, now);
        let rate = error_rate(errors, total);
        AgentHealth {
            agent_id: agent.id,
            name: agent.name.clone(),
            status: classify(minutes, rate, interval_minutes),
            last_heartbeat: agent.last_heartbeat,
            minutes_since_heartbeat: minutes,
            error_rate: round2(rate),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub down: usize,
}

impl HealthSummary {
    pub fn from_statuses(statuses: &[AgentHealth]) -> Self {
        statuses
            .iter()
            .fold(HealthSummary::default(), |mut summary, health| {
                summary.total += 1;
                match health.status {
                    HealthStatus::Healthy => summary.healthy += 1,
                    HealthStatus::Degraded => summary.degraded += 1,
                    HealthStatus::Down => summary.down += 1,
                }
                summary
            })
    }
}

/// Classifies every agent in the store.
pub fn assess_agents(
    dal: &DAL,
    interval_minutes: i64,
    now: DateTime<Utc>,
) -> Result<Vec<AgentHealth>, DalError> {
    let window_start = now - Duration::minutes(ERROR_RATE_WINDOW_MINUTES);
    let agents = dal.agents().list()?;

    agents
        .iter()
        .map(|agent| {
            let (errors, total) = dal.activities().error_counts_since(agent.id, window_start)?;
            Ok(AgentHealth::evaluate(agent, errors, total, interval_minutes, now))
        })
        .collect()
}
