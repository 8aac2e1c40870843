/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! External agent registry and on-demand probing.

use crate::api::AppState;
use crate::dal::DAL;
use crate::metrics::PROBE_RESULTS_TOTAL;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use mission_control_models::models::external_agents::{
    ExternalAgent, ExternalAgentProbeUpdate, NewExternalAgent,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

type ApiError = (StatusCode, Json<Value>);

pub fn routes() -> Router<AppState> {
    info!("Setting up external agent routes");
    Router::new()
        .route(
            "/external-agents",
            get(list_external_agents).post(create_external_agent),
        )
        .route(
            "/external-agents/:id",
            get(get_external_agent)
                .post(probe_external_agent)
                .delete(delete_external_agent),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExternalAgentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Agent not found"})),
    )
}

/// Malformed IDs cannot name a stored agent, so they read as not found.
fn parse_agent_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

fn load_agent(dal: &DAL, agent_id: Uuid) -> Result<ExternalAgent, ApiError> {
    match dal.external_agents().get(agent_id) {
        Ok(Some(agent)) => Ok(agent),
        Ok(None) => {
            warn!("External agent not found: {}", agent_id);
            Err(not_found())
        }
        Err(e) => {
            error!("Failed to fetch external agent {}: {}", agent_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch external agent"})),
            ))
        }
    }
}

async fn list_external_agents(State(dal): State<DAL>) -> Result<Json<Value>, ApiError> {
    info!("Handling request to list external agents");
    match dal.external_agents().list() {
        Ok(agents) => Ok(Json(json!({ "agents": agents }))),
        Err(e) => {
            error!("Failed to fetch external agents: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch external agents"})),
            ))
        }
    }
}

async fn create_external_agent(
    State(dal): State<DAL>,
    Json(request): Json<CreateExternalAgentRequest>,
) -> Result<Json<Value>, ApiError> {
    info!("Handling request to register an external agent");

    let new_agent = NewExternalAgent::new(
        request.name.unwrap_or_default(),
        request.url.unwrap_or_default(),
        request.api_key,
    )
    .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({"error": e}))))?;

    match dal.external_agents().create(&new_agent) {
        Ok(agent) => {
            info!("Registered external agent {} at {}", agent.id, agent.url);
            Ok(Json(json!({ "agent": agent })))
        }
        Err(e) => {
            error!("Failed to create external agent: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to create external agent"})),
            ))
        }
    }
}

async fn get_external_agent(
    State(dal): State<DAL>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let agent_id = parse_agent_id(&id)?;
    info!("Handling request to get external agent {}", agent_id);
    let agent = load_agent(&dal, agent_id)?;
    Ok(Json(json!({ "agent": agent })))
}

/// Probes the agent and records the outcome. When every probe path fails
/// the agent is marked offline and the call answers 500.
async fn probe_external_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let agent_id = parse_agent_id(&id)?;
    let agent = load_agent(&state.dal, agent_id)?;
    info!("Probing external agent {} at {}", agent.id, agent.url);

    match state.prober.probe(&agent.url, &agent.api_key).await {
        Ok(success) => {
            PROBE_RESULTS_TOTAL.with_label_values(&["online"]).inc();
            let update = ExternalAgentProbeUpdate::online(&success.body, Utc::now());
            match state.dal.external_agents().record_probe(agent.id, &update) {
                Ok(updated) => Ok(Json(json!({
                    "agent": updated,
                    "metrics": success.body,
                }))),
                Err(e) => {
                    error!("Failed to record probe for {}: {}", agent.id, e);
                    Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "Failed to fetch metrics from external agent"})),
                    ))
                }
            }
        }
        Err(failure) => {
            PROBE_RESULTS_TOTAL.with_label_values(&["offline"]).inc();
            warn!("External agent {} unreachable: {}", agent.id, failure);
            if let Err(e) = state
                .dal
                .external_agents()
                .record_probe(agent.id, &ExternalAgentProbeUpdate::offline(Utc::now()))
            {
                error!("Failed to mark external agent {} offline: {}", agent.id, e);
            }
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch metrics from external agent"})),
            ))
        }
    }
}

async fn delete_external_agent(
    State(dal): State<DAL>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let agent_id = parse_agent_id(&id)?;
    info!("Handling request to delete external agent {}", agent_id);

    match dal.external_agents().delete(agent_id) {
        Ok(0) => Err(not_found()),
        Ok(_) => Ok(Json(json!({"success": true}))),
        Err(e) => {
            error!("Failed to delete external agent {}: {}", agent_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to delete external agent"})),
            ))
        }
    }
}
