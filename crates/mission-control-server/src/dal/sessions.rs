/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for Session operations.
//!
//! Status patches lock the row (`SELECT ... FOR UPDATE`) so the lifecycle
//! check and the write see the same state.

use crate::dal::{DalError, DAL};
use chrono::Utc;
use diesel::prelude::*;
use mission_control_models::models::sessions::{NewSession, Session, UpdateSession};
use mission_control_models::schema::sessions;
use uuid::Uuid;

/// Filters and paging for session listing.
#[derive(Debug, Clone)]
pub struct SessionFilter {
    pub agent_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Outcome of a session patch.
#[derive(Debug)]
pub enum SessionPatch {
    Updated(Session),
    NotFound,
    /// The requested change breaks the status lifecycle.
    Rejected(String),
}

/// Data Access Layer for Session operations.
pub struct SessionsDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl SessionsDAL<'_> {
    pub fn create(&self, new_session: &NewSession) -> Result<Session, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(diesel::insert_into(sessions::table)
            .values(new_session)
            .get_result(conn)?)
    }

    pub fn get(&self, session_id: Uuid) -> Result<Option<Session>, DalError> {
        let conn = &mut self.dal.pool.get()?;
        Ok(sessions::table
            .filter(sessions::id.eq(session_id))
            .first(conn)
            .optional()?)
    }

    /// Lists sessions newest first along with the total matching `filter`
    /// before paging.
    pub fn list(&self, filter: &SessionFilter) -> Result<(Vec<Session>, i64), DalError> {
        let conn = &mut self.dal.pool.get()?;

        let mut query = sessions::table.into_boxed();
        let mut count_query = sessions::table.into_boxed();

        if let Some(agent_id) = filter.agent_id {
            query = query.filter(sessions::agent_id.eq(agent_id));
            count_query = count_query.filter(sessions::agent_id.eq(agent_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(sessions::status.eq(status.clone()));
            count_query = count_query.filter(sessions::status.eq(status.clone()));
        }

        let rows = query
            .order(sessions::started_at.desc())
            .limit(filter.limit)
            .offset(filter.offset)
            .load::<Session>(conn)?;
        let total: i64 = count_query.count().get_result(conn)?;

        Ok((rows, total))
    }

    /// Applies a PATCH to a session, enforcing the status lifecycle.
    pub fn patch(
        &self,
        session_id: Uuid,
        status: Option<String>,
        output: Option<String>,
        duration_ms: Option<i64>,
    ) -> Result<SessionPatch, DalError> {
        let conn = &mut self.dal.pool.get()?;

        let outcome = conn.transaction::<SessionPatch, diesel::result::Error, _>(|conn| {
            let current: Option<Session> = sessions::table
                .filter(sessions::id.eq(session_id))
                .for_update()
                .first(conn)
                .optional()?;

            let Some(current) = current else {
                return Ok(SessionPatch::NotFound);
            };

            let changes =
                match UpdateSession::for_session(&current, status, output, duration_ms, Utc::now())
                {
                    Ok(changes) => changes,
                    Err(reason) => return Ok(SessionPatch::Rejected(reason)),
                };

            if changes.is_empty() {
                return Ok(SessionPatch::Updated(current));
            }

            let updated = diesel::update(sessions::table.filter(sessions::id.eq(session_id)))
                .set(&changes)
                .get_result(conn)?;

            Ok(SessionPatch::Updated(updated))
        })?;

        Ok(outcome)
    }

    /// Inserts a fresh running copy of a session. The original row is not
    /// touched. Returns `None` when the original does not exist.
    pub fn rerun(&self, session_id: Uuid) -> Result<Option<Session>, DalError> {
        let conn = &mut self.dal.pool.get()?;

        let original: Option<Session> = sessions::table
            .filter(sessions::id.eq(session_id))
            .first(conn)
            .optional()?;

        let Some(original) = original else {
            return Ok(None);
        };

        let rerun = NewSession::rerun_of(&original);
        Ok(Some(
            diesel::insert_into(sessions::table)
                .values(&rerun)
                .get_result(conn)?,
        ))
    }
}
