/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for Agent operations.

use crate::dal::{DalError, DAL};
use mission_control_models::models::activities::{NewActivity, EVENT_AGENT_CREATED};
use mission_control_models::models::agents::{Agent, NewAgent, AGENT_STATUS_OFFLINE};
use mission_control_models::schema::{activities, agents};
use diesel::prelude::*;
use uuid::Uuid;

/// Data Access Layer for Agent operations.
pub struct AgentsDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl AgentsDAL<'_> {
    /// Creates a new agent and logs an `agent_created` activity for it.
    ///
    /// Both rows are written in one transaction.
    pub fn create(&self, new_agent: &NewAgent) -> Result<Agent, DalError> {
        let conn = &mut self.dal.pool.get()?;

        let agent = conn.transaction::<Agent, diesel::result::Error, _>(|conn| {
            let agent: Agent = diesel::insert_into(agents::table)
                .values(new_agent)
                .get_result(conn)?;

            let activity = NewActivity::new(
                agent.id,
                EVENT_AGENT_CREATED,
                format!("Agent {} created with role {}", agent.name, agent.role),
                None,
            )
            .map_err(|_| diesel::result::Error::RollbackTransaction)?;

            diesel::insert_into(activities::table)
                .values(&activity)
                .execute(conn)?;

            Ok(agent)
        })?;

        Ok(agent)
    }

    /// Retrieves an agent by its UUID.
    pub fn get(&self, agent_uuid: Uuid) -> Result<Option<Agent>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(agents::table
            .filter(agents::id.eq(agent_uuid))
            .first(conn)
            .optional()?)
    }

    /// Lists all agents, newest first.
    pub fn list(&self) -> Result<Vec<Agent>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(agents::table
            .order(agents::created_at.desc())
            .load::<Agent>(conn)?)
    }

    /// Lists agents whose status is not `offline`, capped at `limit` when given.
    pub fn list_active(&self, limit: Option<i64>) -> Result<Vec<Agent>, DalError> {
        let conn = &mut self.dal.pool.get()?;

        let mut query = agents::table
            .filter(agents::status.ne(AGENT_STATUS_OFFLINE))
            .order(agents::created_at.asc())
            .into_boxed();

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        Ok(query.load::<Agent>(conn)?)
    }
}
