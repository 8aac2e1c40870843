/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data models for our application to interact with
pub mod activities;
pub mod agents;
pub mod alert_history;
pub mod alert_rules;
pub mod external_agents;
pub mod historical_metrics;
pub mod sessions;

pub use activities::{Activity, NewActivity};
pub use agents::{Agent, NewAgent};
pub use alert_history::{AlertHistory, NewAlertHistory};
pub use alert_rules::{AlertRule, NewAlertRule, UpdateAlertRule};
pub use external_agents::{ExternalAgent, ExternalAgentProbeUpdate, NewExternalAgent};
pub use historical_metrics::{HistoricalMetric, NewHistoricalMetric};
pub use sessions::{NewSession, Session, UpdateSession};
