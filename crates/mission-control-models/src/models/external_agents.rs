/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # External Agents Module
//!
//! Third-party services that are probed over HTTP instead of reporting
//! heartbeats. The JSON representation uses the camelCase field names the
//! dashboard expects (`apiKey`, `lastCheck`, `lastMetrics`, `createdAt`).

use crate::schema::external_agents;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const EXTERNAL_STATUS_ONLINE: &str = "online";
pub const EXTERNAL_STATUS_OFFLINE: &str = "offline";
pub const EXTERNAL_STATUS_UNKNOWN: &str = "unknown";
pub const EXTERNAL_STATUS_ERROR: &str = "error";

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = external_agents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct ExternalAgent {
    pub id: Uuid,
    pub name: String,
    /// Base URL, never with a trailing slash
    pub url: String,
    pub api_key: String,
    pub status: String,
    pub last_check: Option<DateTime<Utc>>,
    /// JSON body of the last successful probe
    pub last_metrics: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = external_agents)]
pub struct NewExternalAgent {
    pub name: String,
    pub url: String,
    pub api_key: String,
    pub status: String,
}

impl NewExternalAgent {
    /// Creates a new external agent in the `unknown` state.
    ///
    /// A single trailing slash is stripped from `url`.
    pub fn new(name: String, url: String, api_key: Option<String>) -> Result<Self, String> {
        if name.trim().is_empty() || url.trim().is_empty() {
            return Err("Name and URL are required".to_string());
        }

        let url = url.strip_suffix('/').map(str::to_string).unwrap_or(url);

        Ok(NewExternalAgent {
            name,
            url,
            api_key: api_key.unwrap_or_default(),
            status: EXTERNAL_STATUS_UNKNOWN.to_string(),
        })
    }
}

/// Result of probing an external agent.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = external_agents)]
pub struct ExternalAgentProbeUpdate {
    pub status: String,
    pub last_check: DateTime<Utc>,
    pub last_metrics: Option<String>,
}

impl ExternalAgentProbeUpdate {
    pub fn online(metrics: &serde_json::Value, checked_at: DateTime<Utc>) -> Self {
        ExternalAgentProbeUpdate {
            status: EXTERNAL_STATUS_ONLINE.to_string(),
            last_check: checked_at,
            last_metrics: Some(metrics.to_string()),
        }
    }

    /// Marks the agent offline. `last_metrics` is left as it was.
    pub fn offline(checked_at: DateTime<Utc>) -> Self {
        ExternalAgentProbeUpdate {
            status: EXTERNAL_STATUS_OFFLINE.to_string(),
            last_check: checked_at,
            last_metrics: None,
        }
    }
}
