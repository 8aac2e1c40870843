/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Handles API routes and logic for internal agents.

use crate::api::AppState;
use crate::dal::DAL;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use mission_control_models::models::agents::{Agent, NewAgent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

pub fn routes() -> Router<AppState> {
    info!("Setting up agent routes");
    Router::new().route("/agents", get(list_agents).post(create_agent))
}

#[derive(Debug, Serialize)]
pub struct AgentList {
    pub agents: Vec<Agent>,
    pub count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateAgentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Lists every agent, newest first.
async fn list_agents(
    State(dal): State<DAL>,
) -> Result<Json<AgentList>, (StatusCode, Json<serde_json::Value>)> {
    info!("Handling request to list agents");
    match dal.agents().list() {
        Ok(agents) => {
            info!("Successfully retrieved {} agents", agents.len());
            Ok(Json(AgentList {
                count: agents.len(),
                agents,
            }))
        }
        Err(e) => {
            error!("Failed to fetch agents: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch agents"})),
            ))
        }
    }
}

/// Registers an agent. The agent starts `idle` and an `agent_created`
/// activity is written alongside it.
async fn create_agent(
    State(dal): State<DAL>,
    Json(request): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<Agent>), (StatusCode, Json<serde_json::Value>)> {
    info!("Handling request to create a new agent");

    let new_agent = match (request.name, request.role) {
        (Some(name), Some(role)) => NewAgent::new(name, role).map_err(|e| {
            info!("Rejected agent creation: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Name and role are required"})),
            )
        })?,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Name and role are required"})),
            ))
        }
    };

    match dal.agents().create(&new_agent) {
        Ok(agent) => {
            info!("Successfully created agent with ID: {}", agent.id);
            Ok((StatusCode::CREATED, Json(agent)))
        }
        Err(e) => {
            error!("Failed to create agent: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to create agent"})),
            ))
        }
    }
}
