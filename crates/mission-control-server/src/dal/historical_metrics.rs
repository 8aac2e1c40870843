/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for recorded metric samples.
//!
//! Rows are appended by the metrics-recording job and pruned by the same job
//! once they fall outside the retention window.

use crate::dal::{DalError, DAL};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use mission_control_models::models::historical_metrics::{HistoricalMetric, NewHistoricalMetric};
use mission_control_models::schema::historical_metrics;
use uuid::Uuid;

/// Filters for a history query.
#[derive(Debug, Clone)]
pub struct MetricHistoryFilter {
    pub agent_id: Option<Uuid>,
    pub metric_type: Option<String>,
    /// Inclusive lower bound on `recorded_at`.
    pub since: DateTime<Utc>,
    pub limit: i64,
}

/// Data Access Layer for HistoricalMetric operations.
pub struct HistoricalMetricsDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl HistoricalMetricsDAL<'_> {
    /// Inserts a batch of samples, returning how many rows were written.
    pub fn create_batch(&self, samples: &[NewHistoricalMetric]) -> Result<usize, DalError> {
        if samples.is_empty() {
            return Ok(0);
        }
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::insert_into(historical_metrics::table)
            .values(samples)
            .execute(conn)?)
    }

    /// Lists samples matching `filter`, oldest first.
    pub fn list(&self, filter: &MetricHistoryFilter) -> Result<Vec<HistoricalMetric>, DalError> {
        let conn = &mut self.dal.pool.get()?;

        let mut query = historical_metrics::table
            .filter(historical_metrics::recorded_at.ge(filter.since))
            .into_boxed();

        if let Some(agent_id) = filter.agent_id {
            query = query.filter(historical_metrics::agent_id.eq(agent_id));
        }
        if let Some(metric_type) = &filter.metric_type {
            query = query.filter(historical_metrics::metric_type.eq(metric_type.clone()));
        }

        Ok(query
            .order(historical_metrics::recorded_at.asc())
            .limit(filter.limit)
            .load(conn)?)
    }

    /// Deletes every sample recorded strictly before `cutoff`.
    pub fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(
            diesel::delete(historical_metrics::table.filter(historical_metrics::recorded_at.lt(cutoff)))
                .execute(conn)?,
        )
    }
}
