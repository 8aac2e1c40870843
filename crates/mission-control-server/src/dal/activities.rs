/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for the append-only activity log.

use crate::dal::{DalError, DAL};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use mission_control_models::models::activities::{Activity, NewActivity, ERROR_EVENTS};
use mission_control_models::schema::activities;
use uuid::Uuid;

/// Data Access Layer for Activity operations.
pub struct ActivitiesDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl ActivitiesDAL<'_> {
    pub fn create(&self, new_activity: &NewActivity) -> Result<Activity, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::insert_into(activities::table)
            .values(new_activity)
            .get_result(conn)?)
    }

    /// Inserts a batch of activities, returning how many rows were written.
    pub fn create_batch(&self, new_activities: &[NewActivity]) -> Result<usize, DalError> {
        if new_activities.is_empty() {
            return Ok(0);
        }
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::insert_into(activities::table)
            .values(new_activities)
            .execute(conn)?)
    }

    /// Counts an agent's activities created at or after `since`.
    pub fn count_since(&self, agent_id: Uuid, since: DateTime<Utc>) -> Result<i64, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(activities::table
            .filter(activities::agent_id.eq(agent_id))
            .filter(activities::created_at.ge(since))
            .count()
            .get_result(conn)?)
    }

    /// Returns `(error_count, total_count)` for an agent since `since`.
    ///
    /// Errors are activities whose event is `error` or `fail`.
    pub fn error_counts_since(
        &self,
        agent_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<(i64, i64), DalError> {
        let conn = &mut self.dal.pool.get()?;

        let total: i64 = activities::table
            .filter(activities::agent_id.eq(agent_id))
            .filter(activities::created_at.ge(since))
            .count()
            .get_result(conn)?;

        if total == 0 {
            return Ok((0, 0));
        }

        let errors: i64 = activities::table
            .filter(activities::agent_id.eq(agent_id))
            .filter(activities::created_at.ge(since))
            .filter(activities::event.eq_any(ERROR_EVENTS.to_vec()))
            .count()
            .get_result(conn)?;

        Ok((errors, total))
    }

    /// Timestamp of the most recent activity with the given event, if any.
    pub fn latest_for_event(&self, event: &str) -> Result<Option<DateTime<Utc>>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(activities::table
            .filter(activities::event.eq(event))
            .order(activities::created_at.desc())
            .select(activities::created_at)
            .first::<DateTime<Utc>>(conn)
            .optional()?)
    }

    /// Lists an agent's activities, newest first.
    pub fn list_for_agent(&self, agent_id: Uuid, limit: i64) -> Result<Vec<Activity>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(activities::table
            .filter(activities::agent_id.eq(agent_id))
            .order(activities::created_at.desc())
            .limit(limit)
            .load(conn)?)
    }
}
