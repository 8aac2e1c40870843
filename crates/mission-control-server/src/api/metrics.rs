/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Historical metric queries and the live metrics stream.

use crate::api::AppState;
use crate::dal::{MetricHistoryFilter, DAL};
use crate::relay::spawn_relay;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use futures::stream::{Stream, StreamExt};
use mission_control_models::models::historical_metrics::HistoricalMetric;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info};
use uuid::Uuid;

const DEFAULT_HISTORY_DAYS: i64 = 7;
const MAX_HISTORY_DAYS: i64 = 36_500;
const HISTORY_ROW_LIMIT: i64 = 1000;
const KEEP_ALIVE_INTERVAL_SECS: u64 = 15;

type ApiError = (StatusCode, Json<Value>);

pub fn routes() -> Router<AppState> {
    info!("Setting up metrics routes");
    Router::new()
        .route("/metrics/history", get(metric_history))
        .route("/metrics/stream", get(metric_stream))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub agent_id: Option<String>,
    pub metric_type: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct HistoryPeriod {
    pub start: DateTime<Utc>,
    pub days: i64,
}

#[derive(Debug, Serialize)]
pub struct MetricHistoryResponse {
    pub period: HistoryPeriod,
    pub metrics: BTreeMap<String, Vec<MetricPoint>>,
}

/// Groups samples by metric type, keeping their order within each group.
pub fn group_by_type(samples: Vec<HistoricalMetric>) -> BTreeMap<String, Vec<MetricPoint>> {
    let mut grouped: BTreeMap<String, Vec<MetricPoint>> = BTreeMap::new();
    for sample in samples {
        grouped
            .entry(sample.metric_type)
            .or_default()
            .push(MetricPoint {
                timestamp: sample.recorded_at,
                value: sample.value,
            });
    }
    grouped
}

fn parse_days(raw: Option<&str>) -> Result<i64, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(DEFAULT_HISTORY_DAYS),
        Some(s) => s
            .parse::<i64>()
            .ok()
            .filter(|d| (0..=MAX_HISTORY_DAYS).contains(d))
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": format!("days must be an integer between 0 and {}", MAX_HISTORY_DAYS)
                    })),
                )
            }),
    }
}

/// Up to 1000 samples from the last `days` days, oldest first, grouped by
/// metric type.
async fn metric_history(
    State(dal): State<DAL>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<MetricHistoryResponse>, ApiError> {
    let days = parse_days(query.days.as_deref())?;

    let agent_id = match query.agent_id.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid agentId"})),
            )
        })?),
    };

    let start = Utc::now() - Duration::days(days);
    let filter = MetricHistoryFilter {
        agent_id,
        metric_type: query.metric_type.filter(|s| !s.is_empty()),
        since: start,
        limit: HISTORY_ROW_LIMIT,
    };
    info!("Handling metric history request: {:?}", filter);

    match dal.historical_metrics().list(&filter) {
        Ok(samples) => Ok(Json(MetricHistoryResponse {
            period: HistoryPeriod { start, days },
            metrics: group_by_type(samples),
        })),
        Err(e) => {
            error!("Failed to fetch metric history: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch metric history"})),
            ))
        }
    }
}

/// Opens a live metrics stream. Each connection gets its own relay task,
/// which stops when the client goes away.
async fn metric_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Opening live metrics stream");
    let config = state.relay_config();
    let (rx, _handle) = spawn_relay(Arc::new(state.dal.clone()), state.sampler.clone(), config);

    let stream = ReceiverStream::new(rx).map(|event| Ok(event.to_sse_event()));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(KEEP_ALIVE_INTERVAL_SECS))
            .text("keep-alive"),
    )
}
