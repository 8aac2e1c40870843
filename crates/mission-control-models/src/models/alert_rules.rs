/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Alert Rules Module
//!
//! User-managed alert rules. Rules are stored and can be test-fired against
//! their destination; nothing evaluates them against live metrics.
//!
//! ## Data Model
//!
//! - `id`: UUID, primary key
//! - `name`: VARCHAR(255)
//! - `metric`: VARCHAR(50), metric the rule watches (free-form)
//! - `threshold`: FLOAT8
//! - `condition`: VARCHAR(10), one of `gt`, `lt`, `eq`
//! - `notify_type`: VARCHAR(20), one of `webhook`, `discord`, `email`
//! - `destination`: TEXT, URL or email address depending on `notify_type`
//! - `enabled`: BOOLEAN
//! - `created_at` / `updated_at`: TIMESTAMP

use crate::schema::alert_rules;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CONDITION_GT: &str = "gt";
pub const CONDITION_LT: &str = "lt";
pub const CONDITION_EQ: &str = "eq";

pub const VALID_CONDITIONS: &[&str] = &[CONDITION_GT, CONDITION_LT, CONDITION_EQ];

pub const NOTIFY_WEBHOOK: &str = "webhook";
pub const NOTIFY_DISCORD: &str = "discord";
pub const NOTIFY_EMAIL: &str = "email";

pub const VALID_NOTIFY_TYPES: &[&str] = &[NOTIFY_WEBHOOK, NOTIFY_DISCORD, NOTIFY_EMAIL];

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = alert_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AlertRule {
    pub id: Uuid,
    pub name: String,
    pub metric: String,
    pub threshold: f64,
    pub condition: String,
    pub notify_type: String,
    pub destination: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new alert rule. Rules are enabled on creation.
#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = alert_rules)]
pub struct NewAlertRule {
    pub name: String,
    pub metric: String,
    pub threshold: f64,
    pub condition: String,
    pub notify_type: String,
    pub destination: String,
    pub enabled: bool,
}

impl NewAlertRule {
    /// Creates a new alert rule.
    ///
    /// # Returns
    ///
    /// Returns `Err` if any text field is blank, the threshold is not finite,
    /// or the condition / notify type is not one of the supported values.
    pub fn new(
        name: String,
        metric: String,
        threshold: f64,
        condition: String,
        notify_type: String,
        destination: String,
    ) -> Result<Self, String> {
        if name.trim().is_empty()
            || metric.trim().is_empty()
            || condition.trim().is_empty()
            || notify_type.trim().is_empty()
            || destination.trim().is_empty()
        {
            return Err("Missing required fields".to_string());
        }
        if !threshold.is_finite() {
            return Err("Threshold must be a finite number".to_string());
        }
        validate_condition(&condition)?;
        validate_notify_type(&notify_type)?;

        Ok(NewAlertRule {
            name,
            metric,
            threshold,
            condition,
            notify_type,
            destination,
            enabled: true,
        })
    }
}

/// Partial update for an alert rule. `None` fields are left untouched.
#[derive(AsChangeset, Debug, Clone, Default, Serialize, Deserialize)]
#[diesel(table_name = alert_rules)]
pub struct UpdateAlertRule {
    pub name: Option<String>,
    pub metric: Option<String>,
    pub threshold: Option<f64>,
    pub condition: Option<String>,
    pub notify_type: Option<String>,
    pub destination: Option<String>,
    pub enabled: Option<bool>,
}

impl UpdateAlertRule {
    /// Checks the supplied fields. Blank strings are treated as absent.
    pub fn validated(mut self) -> Result<Self, String> {
        for field in [
            &mut self.name,
            &mut self.metric,
            &mut self.condition,
            &mut self.notify_type,
            &mut self.destination,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        if let Some(threshold) = self.threshold {
            if !threshold.is_finite() {
                return Err("Threshold must be a finite number".to_string());
            }
        }
        if let Some(condition) = &self.condition {
            validate_condition(condition)?;
        }
        if let Some(notify_type) = &self.notify_type {
            validate_notify_type(notify_type)?;
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.metric.is_none()
            && self.threshold.is_none()
            && self.condition.is_none()
            && self.notify_type.is_none()
            && self.destination.is_none()
            && self.enabled.is_none()
    }
}

fn validate_condition(condition: &str) -> Result<(), String> {
    if VALID_CONDITIONS.contains(&condition) {
        Ok(())
    } else {
        Err(format!(
            "Invalid condition '{}'. Must be one of: {}",
            condition,
            VALID_CONDITIONS.join(", ")
        ))
    }
}

fn validate_notify_type(notify_type: &str) -> Result<(), String> {
    if VALID_NOTIFY_TYPES.contains(&notify_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid notify_type '{}'. Must be one of: {}",
            notify_type,
            VALID_NOTIFY_TYPES.join(", ")
        ))
    }
}
