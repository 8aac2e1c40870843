/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Fired alerts. Append-only; `acknowledged` is the only column ever updated.

use crate::schema::alert_history;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = alert_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AlertHistory {
    pub id: Uuid,
    pub alert_rule_id: Uuid,
    pub message: String,
    pub triggered_at: DateTime<Utc>,
    pub acknowledged: bool,
}

#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = alert_history)]
pub struct NewAlertHistory {
    pub alert_rule_id: Uuid,
    pub message: String,
}

impl NewAlertHistory {
    pub fn new(alert_rule_id: Uuid, message: String) -> Result<Self, String> {
        if alert_rule_id.is_nil() {
            return Err("Invalid alert rule ID".to_string());
        }
        if message.trim().is_empty() {
            return Err("Message cannot be empty".to_string());
        }
        Ok(NewAlertHistory {
            alert_rule_id,
            message,
        })
    }
}
