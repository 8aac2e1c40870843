/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Activities Module
//!
//! Append-only activity log per agent. Rows are never updated; the health
//! classifier reads them to compute trailing error rates, and the health
//! check trigger appends one `health_check` row per agent per run.

use crate::schema::activities;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const EVENT_AGENT_CREATED: &str = "agent_created";
pub const EVENT_HEALTH_CHECK: &str = "health_check";
pub const EVENT_ERROR: &str = "error";
pub const EVENT_FAIL: &str = "fail";

/// Events counted as failures when computing an agent's error rate.
pub const ERROR_EVENTS: [&str; 2] = [EVENT_ERROR, EVENT_FAIL];

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Activity {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub event: String,
    pub message: String,
    /// JSON-encoded metadata
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = activities)]
pub struct NewActivity {
    pub agent_id: Uuid,
    pub event: String,
    pub message: String,
    pub metadata: Option<String>,
}

impl NewActivity {
    pub fn new(
        agent_id: Uuid,
        event: &str,
        message: String,
        metadata: Option<serde_json::Value>,
    ) -> Result<Self, String> {
        if agent_id.is_nil() {
            return Err("Invalid agent ID".to_string());
        }
        if event.trim().is_empty() {
            return Err("Event cannot be empty".to_string());
        }

        Ok(NewActivity {
            agent_id,
            event: event.to_string(),
            message,
            metadata: metadata.map(|m| m.to_string()),
        })
    }
}
