/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Cron-facing endpoints: agent health (read and trigger) and metrics
//! recording with retention.
//!
//! The health trigger is guarded by the configured cron secret, passed as
//! `?secret=`. With no secret configured the trigger is open.

use crate::api::AppState;
use crate::health::{assess_agents, AgentHealth, HealthSummary};
use crate::jobs;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use mission_control_models::models::activities::EVENT_HEALTH_CHECK;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

type ApiError = (StatusCode, Json<Value>);

pub fn routes() -> Router<AppState> {
    info!("Setting up cron routes");
    Router::new()
        .route("/cron/health", get(health_report).post(trigger_health_check))
        .route("/cron/metrics", post(record_metrics))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub last_check: Option<DateTime<Utc>>,
    pub health_check_interval: i64,
    pub agents: Vec<AgentHealth>,
    pub summary: HealthSummary,
}

#[derive(Debug, Deserialize)]
pub struct SecretQuery {
    pub secret: Option<String>,
}

/// True when no secret is configured or `provided` matches it.
pub fn secret_matches(configured: Option<&str>, provided: Option<&str>) -> bool {
    match configured {
        None => true,
        Some(expected) => provided == Some(expected),
    }
}

fn health_check_failed() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Health check failed"})),
    )
}

/// Classifies every agent without writing anything.
async fn health_report(State(state): State<AppState>) -> Result<Json<HealthReport>, ApiError> {
    info!("Handling request for agent health report");
    let interval = state.settings.monitor.health_check_interval_minutes;

    let agents = assess_agents(&state.dal, interval, Utc::now()).map_err(|e| {
        error!("Health check error: {}", e);
        health_check_failed()
    })?;

    let last_check = state
        .dal
        .activities()
        .latest_for_event(EVENT_HEALTH_CHECK)
        .map_err(|e| {
            error!("Failed to read last health check: {}", e);
            health_check_failed()
        })?;

    Ok(Json(HealthReport {
        status: "ok",
        last_check,
        health_check_interval: interval,
        summary: HealthSummary::from_statuses(&agents),
        agents,
    }))
}

/// Classifies every agent and logs one `health_check` activity per agent.
async fn trigger_health_check(
    State(state): State<AppState>,
    Query(query): Query<SecretQuery>,
) -> Result<Json<Value>, ApiError> {
    if !secret_matches(state.settings.monitor.cron_secret(), query.secret.as_deref()) {
        warn!("Rejected health check trigger with a bad secret");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        ));
    }

    info!("Handling health check trigger");
    match jobs::run_health_check(&state.dal, state.settings.monitor.health_check_interval_minutes)
    {
        Ok(run) => Ok(Json(json!({
            "success": true,
            "agentsChecked": run.agents_checked,
            "timestamp": run.timestamp,
        }))),
        Err(e) => {
            error!("Health check trigger error: {}", e);
            Err(health_check_failed())
        }
    }
}

/// Samples every non-offline agent and prunes expired samples.
async fn record_metrics(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    info!("Handling metrics recording run");
    match jobs::record_metrics(
        &state.dal,
        state.sampler.as_ref(),
        state.settings.monitor.data_retention_days,
    ) {
        Ok(run) => Ok(Json(json!({
            "success": true,
            "recorded": run.recorded,
            "deleted": run.deleted,
            "retentionDays": run.retention_days,
        }))),
        Err(e) => {
            error!("Metrics cron error: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to record metrics"})),
            ))
        }
    }
}
