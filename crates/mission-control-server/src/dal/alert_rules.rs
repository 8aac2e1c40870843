/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for AlertRule operations.

use crate::dal::{DalError, DAL};
use diesel::prelude::*;
use mission_control_models::models::alert_rules::{AlertRule, NewAlertRule, UpdateAlertRule};
use mission_control_models::schema::alert_rules;
use uuid::Uuid;

/// Data Access Layer for AlertRule operations.
pub struct AlertRulesDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl AlertRulesDAL<'_> {
    pub fn create(&self, new_rule: &NewAlertRule) -> Result<AlertRule, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::insert_into(alert_rules::table)
            .values(new_rule)
            .get_result(conn)?)
    }

    pub fn get(&self, rule_id: Uuid) -> Result<Option<AlertRule>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(alert_rules::table
            .filter(alert_rules::id.eq(rule_id))
            .first(conn)
            .optional()?)
    }

    /// Lists all rules, newest first.
    pub fn list(&self) -> Result<Vec<AlertRule>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(alert_rules::table
            .order(alert_rules::created_at.desc())
            .load(conn)?)
    }

    /// Applies a partial update. Returns `None` when the rule does not exist.
    ///
    /// An empty changeset just reads the rule back.
    pub fn update(
        &self,
        rule_id: Uuid,
        changes: &UpdateAlertRule,
    ) -> Result<Option<AlertRule>, DalError> {
        if changes.is_empty() {
            return self.get(rule_id);
        }
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::update(alert_rules::table.filter(alert_rules::id.eq(rule_id)))
            .set(changes)
            .get_result(conn)
            .optional()?)
    }

    /// Deletes a rule and, through the foreign key, its history.
    pub fn delete(&self, rule_id: Uuid) -> Result<usize, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::delete(alert_rules::table.filter(alert_rules::id.eq(rule_id))).execute(conn)?)
    }
}
