/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for ExternalAgent operations.

use crate::dal::{DalError, DAL};
use diesel::prelude::*;
use mission_control_models::models::external_agents::{
    ExternalAgent, ExternalAgentProbeUpdate, NewExternalAgent,
};
use mission_control_models::schema::external_agents;
use uuid::Uuid;

/// Data Access Layer for ExternalAgent operations.
pub struct ExternalAgentsDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl ExternalAgentsDAL<'_> {
    pub fn create(&self, new_agent: &NewExternalAgent) -> Result<ExternalAgent, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::insert_into(external_agents::table)
            .values(new_agent)
            .get_result(conn)?)
    }

    pub fn get(&self, agent_id: Uuid) -> Result<Option<ExternalAgent>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(external_agents::table
            .filter(external_agents::id.eq(agent_id))
            .first(conn)
            .optional()?)
    }

    /// Lists all external agents, newest first.
    pub fn list(&self) -> Result<Vec<ExternalAgent>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(external_agents::table
            .order(external_agents::created_at.desc())
            .load(conn)?)
    }

    /// Stores the outcome of a probe.
    pub fn record_probe(
        &self,
        agent_id: Uuid,
        update: &ExternalAgentProbeUpdate,
    ) -> Result<ExternalAgent, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(
            diesel::update(external_agents::table.filter(external_agents::id.eq(agent_id)))
                .set(update)
                .get_result(conn)?,
        )
    }

    pub fn delete(&self, agent_id: Uuid) -> Result<usize, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(
            diesel::delete(external_agents::table.filter(external_agents::id.eq(agent_id)))
                .execute(conn)?,
        )
    }
}
