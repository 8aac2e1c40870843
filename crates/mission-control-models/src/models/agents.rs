/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Agents Module
//!
//! Internal automation agents tracked by Mission Control.
//!
//! ## Data Model
//!
//! - `id`: UUID, primary key
//! - `name`: VARCHAR(255), display name
//! - `role`: VARCHAR(255), free-form role description
//! - `status`: VARCHAR(20), one of `idle`, `running`, `error`, `offline`
//! - `last_heartbeat`: TIMESTAMP, refreshed by the agent itself to signal liveness
//! - `created_at`: TIMESTAMP
//!
//! Heartbeats are written by the agents; this service only reads them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const AGENT_STATUS_IDLE: &str = "idle";
pub const AGENT_STATUS_RUNNING: &str = "running";
pub const AGENT_STATUS_ERROR: &str = "error";
pub const AGENT_STATUS_OFFLINE: &str = "offline";

pub const VALID_AGENT_STATUSES: [&str; 4] = [
    AGENT_STATUS_IDLE,
    AGENT_STATUS_RUNNING,
    AGENT_STATUS_ERROR,
    AGENT_STATUS_OFFLINE,
];

/// Represents an agent in the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = crate::schema::agents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub status: String,
    pub last_heartbeat: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Represents a new agent to be inserted into the database.
#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::agents)]
pub struct NewAgent {
    pub name: String,
    pub role: String,
    pub status: String,
}

impl NewAgent {
    /// Creates a new idle agent.
    ///
    /// # Returns
    ///
    /// Returns `Err` if the name or role is blank.
    pub fn new(name: String, role: String) -> Result<Self, String> {
        if name.trim().is_empty() {
            return Err("Name cannot be empty".to_string());
        }
        if role.trim().is_empty() {
            return Err("Role cannot be empty".to_string());
        }

        Ok(NewAgent {
            name,
            role,
            status: AGENT_STATUS_IDLE.to_string(),
        })
    }
}
