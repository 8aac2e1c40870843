/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Data Access Layer
//!
//! The `DAL` owns the connection pool and hands out one lightweight accessor
//! per table (`dal.agents()`, `dal.sessions()`, ...). Accessors borrow the
//! DAL, check out a connection per call and return `Result<_, DalError>`.
//!
//! Calls are synchronous; handlers invoke them directly.

use crate::db::ConnectionPool;
use diesel::prelude::*;

mod activities;
mod agents;
mod alert_history;
mod alert_rules;
mod external_agents;
mod historical_metrics;
mod sessions;

pub use activities::ActivitiesDAL;
pub use agents::AgentsDAL;
pub use alert_history::AlertHistoryDAL;
pub use alert_rules::AlertRulesDAL;
pub use external_agents::ExternalAgentsDAL;
pub use historical_metrics::{HistoricalMetricsDAL, MetricHistoryFilter};
pub use sessions::{SessionFilter, SessionPatch, SessionsDAL};

/// Errors surfaced by DAL accessors.
#[derive(Debug)]
pub enum DalError {
    /// No connection could be checked out of the pool.
    Pool(r2d2::Error),
    /// The query itself failed.
    Query(diesel::result::Error),
}

impl DalError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DalError::Query(diesel::result::Error::NotFound))
    }
}

impl std::fmt::Display for DalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DalError::Pool(e) => write!(f, "Failed to get DB connection: {}", e),
            DalError::Query(e) => write!(f, "Database query failed: {}", e),
        }
    }
}

impl std::error::Error for DalError {}

impl From<r2d2::Error> for DalError {
    fn from(e: r2d2::Error) -> Self {
        DalError::Pool(e)
    }
}

impl From<diesel::result::Error> for DalError {
    fn from(e: diesel::result::Error) -> Self {
        DalError::Query(e)
    }
}

/// The main Data Access Layer struct.
#[derive(Clone)]
pub struct DAL {
    /// Connection pool shared by every accessor.
    pub pool: ConnectionPool,
}

impl DAL {
    pub fn new(pool: ConnectionPool) -> Self {
        DAL { pool }
    }

    pub fn agents(&self) -> AgentsDAL {
        AgentsDAL { dal: self }
    }

    pub fn activities(&self) -> ActivitiesDAL {
        ActivitiesDAL { dal: self }
    }

    pub fn historical_metrics(&self) -> HistoricalMetricsDAL {
        HistoricalMetricsDAL { dal: self }
    }

    pub fn alert_rules(&self) -> AlertRulesDAL {
        AlertRulesDAL { dal: self }
    }

    pub fn alert_history(&self) -> AlertHistoryDAL {
        AlertHistoryDAL { dal: self }
    }

    pub fn sessions(&self) -> SessionsDAL {
        SessionsDAL { dal: self }
    }

    pub fn external_agents(&self) -> ExternalAgentsDAL {
        ExternalAgentsDAL { dal: self }
    }

    /// Round-trips a trivial query. Used by the readiness probe.
    pub fn ping(&self) -> Result<(), DalError> {
        let conn = &mut self.pool.get()?;
        diesel::sql_query("SELECT 1").execute(conn)?;
        Ok(())
    }
}
