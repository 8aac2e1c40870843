/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Sessions Module
//!
//! One recorded execution of a task by an agent, with captured input and
//! output.
//!
//! ## Lifecycle
//!
//! A session is created `running` and moves once to `completed` or `failed`.
//! The terminal transition stamps `completed_at`; no status change is
//! accepted after that. `output` and `duration_ms` remain patchable.
//!
//! Re-running a session never touches the original row: it inserts a fresh
//! `running` session that copies the agent, task, input and metadata.

use crate::schema::sessions;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_STATUS_RUNNING: &str = "running";
pub const SESSION_STATUS_COMPLETED: &str = "completed";
pub const SESSION_STATUS_FAILED: &str = "failed";

pub const VALID_SESSION_STATUSES: &[&str] = &[
    SESSION_STATUS_RUNNING,
    SESSION_STATUS_COMPLETED,
    SESSION_STATUS_FAILED,
];

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Session {
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
    /// JSON-encoded metadata
    pub metadata: Option<String>,
}

impl Session {
    pub fn is_terminal(&self) -> bool {
        self.status == SESSION_STATUS_COMPLETED || self.status == SESSION_STATUS_FAILED
    }
}

#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub agent_id: Uuid,
    pub agent_name: String,
    pub task_name: Option<String>,
    pub input: String,
    pub status: String,
    pub metadata: Option<String>,
}

impl NewSession {
    /// Creates a new running session.
    ///
    /// `metadata` is stored as its JSON text.
    pub fn new(
        agent_id: Uuid,
        agent_name: String,
        task_name: Option<String>,
        input: String,
        metadata: Option<serde_json::Value>,
    ) -> Result<Self, String> {
        if agent_id.is_nil() || agent_name.trim().is_empty() || input.is_empty() {
            return Err("Missing required fields: agent_id, agent_name, input".to_string());
        }

        Ok(NewSession {
            agent_id,
            agent_name,
            task_name,
            input,
            status: SESSION_STATUS_RUNNING.to_string(),
            metadata: metadata.filter(|m| !m.is_null()).map(|m| m.to_string()),
        })
    }

    /// Builds the row for re-running `original`.
    pub fn rerun_of(original: &Session) -> Self {
        NewSession {
            agent_id: original.agent_id,
            agent_name: original.agent_name.clone(),
            task_name: original.task_name.clone(),
            input: original.input.clone(),
            status: SESSION_STATUS_RUNNING.to_string(),
            metadata: original.metadata.clone(),
        }
    }
}

/// Changes applied by a session PATCH.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = sessions)]
pub struct UpdateSession {
    pub status: Option<String>,
    pub output: Option<String>,
    pub duration_ms: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UpdateSession {
    /// Builds the changeset for `current`, enforcing the status lifecycle.
    ///
    /// Requesting `running` on a running session is accepted and changes
    /// nothing. `completed_at` is only stamped on the terminal transition.
    pub fn for_session(
        current: &Session,
        status: Option<String>,
        output: Option<String>,
        duration_ms: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        if let Some(ms) = duration_ms {
            if ms < 0 {
                return Err("duration_ms cannot be negative".to_string());
            }
        }

        let mut update = UpdateSession {
            status: None,
            output,
            duration_ms,
            completed_at: None,
        };

        match status.as_deref().filter(|s| !s.is_empty()) {
            None => {}
            Some(requested) if !VALID_SESSION_STATUSES.contains(&requested) => {
                return Err(format!(
                    "Invalid status '{}'. Must be one of: {}",
                    requested,
                    VALID_SESSION_STATUSES.join(", ")
                ));
            }
            Some(requested) if current.is_terminal() => {
                if requested != current.status {
                    return Err(format!(
                        "Session is already {} and cannot move to {}",
                        current.status, requested
                    ));
                }
            }
            Some(SESSION_STATUS_RUNNING) => {}
            Some(requested) => {
                update.status = Some(requested.to_string());
                update.completed_at = Some(now);
            }
        }

        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.output.is_none()
            && self.duration_ms.is_none()
            && self.completed_at.is_none()
    }
}
