/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for AlertHistory operations.
//!
//! History is append-only; acknowledging is the single permitted update.

use crate::dal::{DalError, DAL};
use diesel::prelude::*;
use mission_control_models::models::alert_history::{AlertHistory, NewAlertHistory};
use mission_control_models::schema::alert_history;
use uuid::Uuid;

/// Data Access Layer for AlertHistory operations.
pub struct AlertHistoryDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl AlertHistoryDAL<'_> {
    pub fn create(&self, entry: &NewAlertHistory) -> Result<AlertHistory, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::insert_into(alert_history::table)
            .values(entry)
            .get_result(conn)?)
    }

    /// Lists the most recent `limit` entries by trigger time.
    pub fn list_recent(&self, limit: i64) -> Result<Vec<AlertHistory>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(alert_history::table
            .order(alert_history::triggered_at.desc())
            .limit(limit)
            .load(conn)?)
    }

    /// Sets the acknowledged flag. Returns `None` when the entry does not exist.
    pub fn acknowledge(
        &self,
        entry_id: Uuid,
        acknowledged: bool,
    ) -> Result<Option<AlertHistory>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::update(alert_history::table.filter(alert_history::id.eq(entry_id)))
            .set(alert_history::acknowledged.eq(acknowledged))
            .get_result(conn)
            .optional()?)
    }
}
