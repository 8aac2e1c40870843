/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Live Metrics Relay
//!
//! One relay task runs per connected stream client. It sends a `connected`
//! event straight away, then on every tick loads the non-offline agents,
//! counts each agent's recent activity, attaches a metrics sample and sends
//! one `metrics` event. A failed tick sends an `error` event; the next tick
//! tries again.
//!
//! The task owns its timer and stops as soon as the receiving side is
//! dropped, which is what happens when the HTTP client disconnects.

use crate::dal::{DalError, DAL};
use crate::metrics::{RELAY_CONNECTIONS_ACTIVE, RELAY_EVENTS_TOTAL};
use crate::sampler::MetricsSource;
use axum::response::sse::Event;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use mission_control_models::models::agents::Agent;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};
use uuid::Uuid;

/// Configuration for a relay task.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub tick_interval: Duration,
    /// Maximum number of agents per `metrics` event.
    pub agent_limit: i64,
    /// How far back "recent activity" reaches.
    pub activity_window: ChronoDuration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(2000),
            agent_limit: 50,
            activity_window: ChronoDuration::milliseconds(5000),
        }
    }
}

/// An agent together with its activity count inside the window.
#[derive(Debug, Clone)]
pub struct AgentActivity {
    pub agent: Agent,
    pub recent_activity: i64,
}

/// Where the relay reads agent state from.
pub trait AgentSnapshotSource: Send + Sync {
    fn active_agents(
        &self,
        limit: i64,
        window_start: DateTime<Utc>,
    ) -> Result<Vec<AgentActivity>, DalError>;
}

impl AgentSnapshotSource for DAL {
    fn active_agents(
        &self,
        limit: i64,
        window_start: DateTime<Utc>,
    ) -> Result<Vec<AgentActivity>, DalError> {
        self.agents()
            .list_active(Some(limit))?
            .into_iter()
            .map(|agent| {
                let recent_activity = self.activities().count_since(agent.id, window_start)?;
                Ok(AgentActivity {
                    agent,
                    recent_activity,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub agent_id: Uuid,
    pub agent_name: String,
    pub status: String,
    pub last_heartbeat: DateTime<Utc>,
    pub requests_per_min: i64,
    pub cpu: f64,
    pub memory: f64,
    pub recent_activity: i64,
}

/// Events pushed down a stream. Serialized with a `type` tag matching the
/// SSE event name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RelayEvent {
    Connected {
        timestamp: DateTime<Utc>,
    },
    Metrics {
        timestamp: DateTime<Utc>,
        metrics: Vec<AgentMetrics>,
    },
    Error {
        message: String,
    },
}

impl RelayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::Connected { .. } => "connected",
            RelayEvent::Metrics { .. } => "metrics",
            RelayEvent::Error { .. } => "error",
        }
    }

    pub fn to_sse_event(&self) -> Event {
        let data = serde_json::to_string(self).unwrap_or_else(|_| "{}".into());
        Event::default().event(self.name()).data(data)
    }
}

/// Runs one tick: reads agents and builds the `metrics` event, or an `error`
/// event if the store could not be read.
pub fn collect_metrics(
    agents: &dyn AgentSnapshotSource,
    sampler: &dyn MetricsSource,
    config: &RelayConfig,
    now: DateTime<Utc>,
) -> RelayEvent {
    let window_start = now - config.activity_window;

    match agents.active_agents(config.agent_limit, window_start) {
        Ok(snapshot) => {
            let metrics = snapshot
                .into_iter()
                .map(|entry| {
                    let sample = sampler.sample(&entry.agent);
                    AgentMetrics {
                        agent_id: entry.agent.id,
                        agent_name: entry.agent.name,
                        status: entry.agent.status,
                        last_heartbeat: entry.agent.last_heartbeat,
                        requests_per_min: sample.requests_per_min,
                        cpu: sample.cpu,
                        memory: sample.memory,
                        recent_activity: entry.recent_activity,
                    }
                })
                .collect();
            RelayEvent::Metrics {
                timestamp: now,
                metrics,
            }
        }
        Err(e) => {
            error!("Metrics stream error: {}", e);
            RelayEvent::Error {
                message: "Failed to fetch metrics".to_string(),
            }
        }
    }
}

/// Spawns a relay task and returns the receiving end of its event channel.
///
/// Dropping the receiver stops the task.
pub fn spawn_relay(
    agents: Arc<dyn AgentSnapshotSource>,
    sampler: Arc<dyn MetricsSource>,
    config: RelayConfig,
) -> (mpsc::Receiver<RelayEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<RelayEvent>(16);

    let handle = tokio::spawn(async move {
        RELAY_CONNECTIONS_ACTIVE.inc();
        debug!("Metrics stream client connected");

        let connected = RelayEvent::Connected {
            timestamp: Utc::now(),
        };
        if tx.send(connected).await.is_ok() {
            RELAY_EVENTS_TOTAL.with_label_values(&["connected"]).inc();

            let mut ticker = interval(config.tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; metrics start one interval in.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = tx.closed() => {
                        debug!("Metrics stream client disconnected");
                        break;
                    }
                    _ = ticker.tick() => {
                        let agents = agents.clone();
                        let sampler = sampler.clone();
                        let tick_config = config.clone();
                        let event = tokio::task::spawn_blocking(move || {
                            collect_metrics(agents.as_ref(), sampler.as_ref(), &tick_config, Utc::now())
                        })
                        .await
                        .unwrap_or_else(|e| {
                            error!("Metrics collection task failed: {}", e);
                            RelayEvent::Error {
                                message: "Failed to fetch metrics".to_string(),
                            }
                        });

                        let name = event.name();
                        if tx.send(event).await.is_err() {
                            break;
                        }
                        RELAY_EVENTS_TOTAL.with_label_values(&[name]).inc();
                    }
                }
            }
        }

        RELAY_CONNECTIONS_ACTIVE.dec();
    });

    (rx, handle)
}
