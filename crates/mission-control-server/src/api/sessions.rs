/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Session log endpoints: list, record, update, export and re-run.
//!
//! A session is created `running` and moves once to `completed` or `failed`.
//! Re-running copies the original into a new running session and leaves the
//! original untouched.

use crate::api::AppState;
use crate::dal::{SessionFilter, SessionPatch, DAL};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use mission_control_models::models::sessions::{NewSession, Session};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: i64 = 50;

type ApiError = (StatusCode, Json<Value>);

pub fn routes() -> Router<AppState> {
    info!("Setting up session routes");
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route(
            "/sessions/:id",
            get(get_session).patch(update_session).post(rerun_session),
        )
        .route("/sessions/:id/rerun", post(rerun_session))
        .route("/sessions/:id/export", post(export_session))
}

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub agent_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionPage {
    pub sessions: Vec<Session>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub format: Option<String>,
}

/// Session as exported, with `metadata` parsed back into JSON.
#[derive(Debug, Serialize)]
pub struct SessionExport {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub agent_name: String,
    pub task_name: Option<String>,
    pub input: String,
    pub output: Option<String>,
    pub status: String,
    pub duration_ms: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: Option<Value>,
}

impl From<&Session> for SessionExport {
    fn from(session: &Session) -> Self {
        SessionExport {
            id: session.id,
            agent_id: session.agent_id,
            agent_name: session.agent_name.clone(),
            task_name: session.task_name.clone(),
            input: session.input.clone(),
            output: session.output.clone(),
            status: session.status.clone(),
            duration_ms: session.duration_ms,
            started_at: session.started_at,
            completed_at: session.completed_at,
            metadata: session.metadata.as_deref().map(|raw| {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
            }),
        }
    }
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Renders the plain-text export. Empty optional lines collapse to blanks,
/// and the whole document is trimmed.
pub fn render_text_export(session: &Session) -> String {
    let completed = session
        .completed_at
        .map(|ts| format!("Completed: {}", iso(ts)))
        .unwrap_or_default();
    let duration = session
        .duration_ms
        .filter(|d| *d != 0)
        .map(|d| format!("Duration: {}ms", d))
        .unwrap_or_default();
    let task = session
        .task_name
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("N/A");
    let output = session
        .output
        .as_deref()
        .filter(|o| !o.is_empty())
        .unwrap_or("No output");
    let metadata = session
        .metadata
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or("No metadata");

    format!(
        "\nAgent Session Export\n=====================\nSession ID: {}\nAgent: {} ({})\nTask: {}\nStatus: {}\nStarted: {}\n{}\n{}\n\n--- INPUT ---\n{}\n\n--- OUTPUT ---\n{}\n\n--- METADATA ---\n{}\n",
        session.id,
        session.agent_name,
        session.agent_id,
        task,
        session.status,
        iso(session.started_at),
        completed,
        duration,
        session.input,
        output,
        metadata,
    )
    .trim()
    .to_string()
}

fn parse_page_param(raw: Option<&str>, default: i64, name: &str) -> Result<i64, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => s.parse::<i64>().ok().filter(|v| *v >= 0).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("{} must be a non-negative integer", name)})),
            )
        }),
    }
}

fn session_not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Session not found"})),
    )
}

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| session_not_found())
}

fn load_session(dal: &DAL, session_id: Uuid) -> Result<Session, ApiError> {
    match dal.sessions().get(session_id) {
        Ok(Some(session)) => Ok(session),
        Ok(None) => {
            warn!("Session not found: {}", session_id);
            Err(session_not_found())
        }
        Err(e) => {
            error!("Failed to fetch session {}: {}", session_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch session"})),
            ))
        }
    }
}

/// Lists sessions, newest first, with optional agent and status filters.
async fn list_sessions(
    State(dal): State<DAL>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<SessionPage>, ApiError> {
    let limit = parse_page_param(query.limit.as_deref(), DEFAULT_PAGE_SIZE, "limit")?;
    let offset = parse_page_param(query.offset.as_deref(), 0, "offset")?;
    let agent_id = match query.agent_id.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid agent_id"})),
            )
        })?),
    };

    let filter = SessionFilter {
        agent_id,
        status: query.status.filter(|s| !s.is_empty()),
        limit,
        offset,
    };
    info!("Handling request to list sessions: {:?}", filter);

    match dal.sessions().list(&filter) {
        Ok((sessions, total)) => Ok(Json(SessionPage {
            sessions,
            total,
            limit,
            offset,
        })),
        Err(e) => {
            error!("Error fetching sessions: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch sessions"})),
            ))
        }
    }
}

async fn create_session(
    State(dal): State<DAL>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    info!("Handling request to record a new session");

    let missing = || {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing required fields: agent_id, agent_name, input"})),
        )
    };

    let agent_id = match request.agent_id.as_deref().filter(|s| !s.is_empty()) {
        None => return Err(missing()),
        Some(raw) => Uuid::parse_str(raw).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid agent_id"})),
            )
        })?,
    };

    let new_session = NewSession::new(
        agent_id,
        request.agent_name.unwrap_or_default(),
        request.task_name,
        request.input.unwrap_or_default(),
        request.metadata,
    )
    .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({"error": e}))))?;

    match dal.sessions().create(&new_session) {
        Ok(session) => {
            info!("Recorded session {} for agent {}", session.id, session.agent_id);
            Ok((StatusCode::CREATED, Json(session)))
        }
        Err(e) => {
            error!("Error creating session: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to create session"})),
            ))
        }
    }
}

async fn get_session(
    State(dal): State<DAL>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let session_id = parse_session_id(&id)?;
    info!("Handling request to get session {}", session_id);
    load_session(&dal, session_id).map(Json)
}

/// Updates status, output and duration. Status changes follow the
/// running → completed | failed lifecycle.
async fn update_session(
    State(dal): State<DAL>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    let session_id = parse_session_id(&id)?;
    info!("Handling request to update session {}", session_id);

    let status = request.status.filter(|s| !s.is_empty());
    match dal
        .sessions()
        .patch(session_id, status, request.output, request.duration_ms)
    {
        Ok(SessionPatch::Updated(session)) => Ok(Json(session)),
        Ok(SessionPatch::NotFound) => Err(session_not_found()),
        Ok(SessionPatch::Rejected(reason)) => {
            warn!("Rejected update for session {}: {}", session_id, reason);
            Err((StatusCode::BAD_REQUEST, Json(json!({"error": reason}))))
        }
        Err(e) => {
            error!("Error updating session {}: {}", session_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to update session"})),
            ))
        }
    }
}

async fn rerun_session(
    State(dal): State<DAL>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session_id = parse_session_id(&id)?;
    info!("Handling request to re-run session {}", session_id);

    match dal.sessions().rerun(session_id) {
        Ok(Some(session)) => {
            info!("Session {} re-run as {}", session_id, session.id);
            Ok((StatusCode::CREATED, Json(session)))
        }
        Ok(None) => Err(session_not_found()),
        Err(e) => {
            error!("Error re-running session {}: {}", session_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to re-run session"})),
            ))
        }
    }
}

/// Exports a session as a JSON or plain-text attachment. The body is
/// optional; anything unparseable falls back to JSON.
async fn export_session(
    State(dal): State<DAL>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let session_id = parse_session_id(&id)?;
    let format = serde_json::from_slice::<ExportRequest>(&body)
        .ok()
        .and_then(|r| r.format)
        .unwrap_or_else(|| "json".to_string());
    info!("Handling {} export of session {}", format, session_id);

    let session = load_session(&dal, session_id)?;

    if format == "text" {
        let disposition = format!("attachment; filename=\"session-{}.txt\"", session.id);
        return Ok((
            [
                (header::CONTENT_TYPE, "text/plain".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            render_text_export(&session),
        )
            .into_response());
    }

    let disposition = format!("attachment; filename=\"session-{}.json\"", session.id);
    Ok((
        [(header::CONTENT_DISPOSITION, disposition)],
        Json(SessionExport::from(&session)),
    )
        .into_response())
}
