/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Time series of recorded agent metrics, pruned by the retention job.

use crate::schema::historical_metrics;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const METRIC_CPU: &str = "cpu";
pub const METRIC_MEMORY: &str = "memory";
pub const METRIC_REQUESTS: &str = "requests";

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = historical_metrics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoricalMetric {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub metric_type: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = historical_metrics)]
pub struct NewHistoricalMetric {
    pub agent_id: Uuid,
    pub metric_type: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

impl NewHistoricalMetric {
    pub fn new(
        agent_id: Uuid,
        metric_type: &str,
        value: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, String> {
        if metric_type.trim().is_empty() {
            return Err("Metric type cannot be empty".to_string());
        }
        if !value.is_finite() {
            return Err("Metric value must be a finite number".to_string());
        }

        Ok(NewHistoricalMetric {
            agent_id,
            metric_type: metric_type.to_string(),
            value,
            recorded_at,
        })
    }
}
