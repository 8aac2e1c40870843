/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Background tasks for Mission Control.
//!
//! In-process schedulers for deployments without an external cron. They run
//! the same jobs as the `/api/cron/*` endpoints.

use crate::dal::DAL;
use crate::jobs;
use crate::sampler::MetricsSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

/// Configuration for the health check task.
pub struct HealthCheckTaskConfig {
    /// How often to run the check (in seconds).
    pub interval_seconds: u64,
    /// Heartbeat interval the classifier measures against (in minutes).
    pub health_check_interval_minutes: i64,
}

impl Default for HealthCheckTaskConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            health_check_interval_minutes: 5,
        }
    }
}

/// Configuration for the metrics recording task.
pub struct MetricsRecordingTaskConfig {
    /// How often to record samples (in seconds).
    pub interval_seconds: u64,
    /// Samples older than this are deleted on every run.
    pub retention_days: i64,
}

impl Default for MetricsRecordingTaskConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            retention_days: 30,
        }
    }
}

/// Starts the health check background task.
///
/// Every interval, classifies all agents and logs one `health_check`
/// activity per agent.
pub fn start_health_check_task(dal: DAL, config: HealthCheckTaskConfig) -> JoinHandle<()> {
    info!(
        "Starting health check task (interval: {}s, heartbeat interval: {}m)",
        config.interval_seconds, config.health_check_interval_minutes
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.interval_seconds));

        loop {
            ticker.tick().await;

            let dal = dal.clone();
            let interval_minutes = config.health_check_interval_minutes;
            match tokio::task::spawn_blocking(move || jobs::run_health_check(&dal, interval_minutes))
                .await
            {
                Ok(Ok(run)) => debug!("Scheduled health check covered {} agents", run.agents_checked),
                Ok(Err(e)) => error!("Scheduled health check failed: {}", e),
                Err(e) => error!("Health check task panicked: {}", e),
            }
        }
    })
}

/// Starts the metrics recording background task.
///
/// Every interval, samples each non-offline agent and prunes samples past
/// the retention window.
pub fn start_metrics_recording_task(
    dal: DAL,
    sampler: Arc<dyn MetricsSource>,
    config: MetricsRecordingTaskConfig,
) -> JoinHandle<()> {
    info!(
        "Starting metrics recording task (interval: {}s, retention: {}d)",
        config.interval_seconds, config.retention_days
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.interval_seconds));

        loop {
            ticker.tick().await;

            let dal = dal.clone();
            let sampler = sampler.clone();
            let retention_days = config.retention_days;
            match tokio::task::spawn_blocking(move || {
                jobs::record_metrics(&dal, sampler.as_ref(), retention_days)
            })
            .await
            {
                Ok(Ok(run)) => {
                    if run.deleted > 0 {
                        info!(
                            "Pruned {} metric samples (age > {}d)",
                            run.deleted, run.retention_days
                        );
                    }
                }
                Ok(Err(e)) => error!("Scheduled metrics recording failed: {}", e),
                Err(e) => error!("Metrics recording task panicked: {}", e),
            }
        }
    })
}
