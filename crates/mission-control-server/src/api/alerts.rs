/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Alert rule, alert history and test notification endpoints.
//!
//! Rules are only stored here; nothing evaluates them against live metrics.

use crate::api::AppState;
use crate::dal::DAL;
use crate::notifier::NotifyError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mission_control_models::models::alert_history::AlertHistory;
use mission_control_models::models::alert_rules::{AlertRule, NewAlertRule, UpdateAlertRule};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

const ALERT_HISTORY_LIMIT: i64 = 100;

type ApiError = (StatusCode, Json<Value>);

pub fn routes() -> Router<AppState> {
    info!("Setting up alert routes");
    Router::new()
        .route(
            "/alerts",
            get(list_rules)
                .post(create_rule)
                .put(update_rule)
                .delete(delete_rule),
        )
        .route("/alerts/history", get(list_history).post(acknowledge_alert))
        .route("/alerts/test", post(test_alert))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message.into()})))
}

fn internal_error(message: &str) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": message})))
}

/// Accepts a threshold sent either as a JSON number or as a numeric string.
pub fn parse_threshold(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Parses a rule or alert ID, treating blank as missing.
fn parse_id(raw: Option<&str>, missing: &str) -> Result<Uuid, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Err(bad_request(missing)),
        Some(s) => Uuid::parse_str(s).map_err(|_| bad_request(format!("Invalid ID: {}", s))),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRuleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub threshold: Option<Value>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub notify_type: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRuleRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub threshold: Option<Value>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub notify_type: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub acknowledged: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TestAlertRequest {
    #[serde(default)]
    pub notify_type: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

async fn list_rules(State(dal): State<DAL>) -> Result<Json<Vec<AlertRule>>, ApiError> {
    info!("Handling request to list alert rules");
    dal.alert_rules().list().map(Json).map_err(|e| {
        error!("Failed to fetch alert rules: {}", e);
        internal_error("Failed to fetch alert rules")
    })
}

async fn create_rule(
    State(dal): State<DAL>,
    Json(request): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<AlertRule>), ApiError> {
    info!("Handling request to create an alert rule");

    let threshold = request.threshold.as_ref().and_then(parse_threshold);
    let (Some(name), Some(metric), Some(threshold), Some(condition), Some(notify_type), Some(destination)) = (
        request.name,
        request.metric,
        threshold,
        request.condition,
        request.notify_type,
        request.destination,
    ) else {
        return Err(bad_request("Missing required fields"));
    };

    let new_rule = NewAlertRule::new(name, metric, threshold, condition, notify_type, destination)
        .map_err(|e| {
            warn!("Rejected alert rule: {}", e);
            bad_request(e)
        })?;

    match dal.alert_rules().create(&new_rule) {
        Ok(rule) => {
            info!("Created alert rule {} ({})", rule.name, rule.id);
            Ok((StatusCode::CREATED, Json(rule)))
        }
        Err(e) => {
            error!("Failed to create alert rule: {}", e);
            Err(internal_error("Failed to create alert rule"))
        }
    }
}

async fn update_rule(
    State(dal): State<DAL>,
    Json(request): Json<UpdateRuleRequest>,
) -> Result<Json<AlertRule>, ApiError> {
    let rule_id = parse_id(request.id.as_deref(), "Missing rule ID")?;
    info!("Handling request to update alert rule {}", rule_id);

    let threshold = match &request.threshold {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            parse_threshold(raw).ok_or_else(|| bad_request("Threshold must be a finite number"))?,
        ),
    };

    let changes = UpdateAlertRule {
        name: request.name,
        metric: request.metric,
        threshold,
        condition: request.condition,
        notify_type: request.notify_type,
        destination: request.destination,
        enabled: request.enabled,
    }
    .validated()
    .map_err(|e| {
        warn!("Rejected alert rule update for {}: {}", rule_id, e);
        bad_request(e)
    })?;

    match dal.alert_rules().update(rule_id, &changes) {
        Ok(Some(rule)) => {
            info!("Updated alert rule {}", rule_id);
            Ok(Json(rule))
        }
        Ok(None) => {
            warn!("Alert rule not found: {}", rule_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Alert rule not found"})),
            ))
        }
        Err(e) => {
            error!("Failed to update alert rule {}: {}", rule_id, e);
            Err(internal_error("Failed to update alert rule"))
        }
    }
}

async fn delete_rule(
    State(dal): State<DAL>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let rule_id = parse_id(query.id.as_deref(), "Missing rule ID")?;
    info!("Handling request to delete alert rule {}", rule_id);

    match dal.alert_rules().delete(rule_id) {
        Ok(0) => {
            warn!("Alert rule not found: {}", rule_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Alert rule not found"})),
            ))
        }
        Ok(_) => Ok(Json(json!({"success": true}))),
        Err(e) => {
            error!("Failed to delete alert rule {}: {}", rule_id, e);
            Err(internal_error("Failed to delete alert rule"))
        }
    }
}

/// Latest alerts, most recently triggered first.
async fn list_history(State(dal): State<DAL>) -> Result<Json<Vec<AlertHistory>>, ApiError> {
    info!("Handling request to list alert history");
    dal.alert_history()
        .list_recent(ALERT_HISTORY_LIMIT)
        .map(Json)
        .map_err(|e| {
            error!("Failed to fetch alert history: {}", e);
            internal_error("Failed to fetch alert history")
        })
}

async fn acknowledge_alert(
    State(dal): State<DAL>,
    Json(request): Json<AcknowledgeRequest>,
) -> Result<Json<AlertHistory>, ApiError> {
    let alert_id = parse_id(request.id.as_deref(), "Missing alert ID")?;
    let acknowledged = request.acknowledged.unwrap_or(true);
    info!(
        "Handling request to set acknowledged={} on alert {}",
        acknowledged, alert_id
    );

    match dal.alert_history().acknowledge(alert_id, acknowledged) {
        Ok(Some(alert)) => Ok(Json(alert)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Alert not found"})),
        )),
        Err(e) => {
            error!("Failed to acknowledge alert {}: {}", alert_id, e);
            Err(internal_error("Failed to acknowledge alert"))
        }
    }
}

/// Sends a one-off test notification to a destination.
async fn test_alert(
    State(state): State<AppState>,
    Json(request): Json<TestAlertRequest>,
) -> Result<Json<Value>, ApiError> {
    let notify_type = request.notify_type.unwrap_or_default();
    let destination = request.destination.unwrap_or_default();
    info!("Handling alert test for notify_type '{}'", notify_type);

    match state.alert_tester.send_test(&notify_type, &destination).await {
        Ok(message) => Ok(Json(json!({"success": true, "message": message}))),
        Err(e) => {
            match e {
                NotifyError::DeliveryFailed { .. } => warn!("Alert test failed: {}", e),
                _ => info!("Rejected alert test: {}", e),
            }
            Err(bad_request(e.to_string()))
        }
    }
}
