/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::api::{self, AppState};
use crate::dal::DAL;
use crate::db::{create_shared_connection_pool, ConnectionPool};
use crate::jobs;
use crate::sampler::SyntheticMetricsSource;
use crate::utils;
use crate::utils::background_tasks::{HealthCheckTaskConfig, MetricsRecordingTaskConfig};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use mission_control_utils::config::Settings;
use mission_control_utils::telemetry::prelude::*;
use tokio::signal;

/// Embedded migrations for the database
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../mission-control-models/migrations");

fn connect(config: &Settings, max_size: u32) -> Result<DAL, Box<dyn std::error::Error>> {
    let pool = create_shared_connection_pool(&config.database.url, max_size)?;
    Ok(DAL::new(pool))
}

fn run_migrations(pool: &ConnectionPool) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;
    info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// Function to start the Mission Control server
///
/// Runs migrations, optionally starts the in-process schedulers, then serves
/// the API until Ctrl-C.
pub async fn serve(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Mission Control");

    info!("Creating database connection pool");
    let dal = connect(config, config.database.max_connections)?;

    info!("Running pending database migrations");
    run_migrations(&dal.pool)?;

    let state = AppState::new(dal.clone(), config.clone())?;

    if config.background.enabled {
        info!("Starting background tasks");
        utils::background_tasks::start_health_check_task(
            dal.clone(),
            HealthCheckTaskConfig {
                interval_seconds: config.background.health_check_interval_seconds,
                health_check_interval_minutes: config.monitor.health_check_interval_minutes,
            },
        );
        utils::background_tasks::start_metrics_recording_task(
            dal.clone(),
            state.sampler.clone(),
            MetricsRecordingTaskConfig {
                interval_seconds: config.background.metrics_interval_seconds,
                retention_days: config.monitor.data_retention_days,
            },
        );
    } else {
        info!("Background tasks disabled; relying on external cron");
    }

    info!("Configuring API routes");
    let app = api::configure_api_routes(&config.cors).with_state(state);

    let addr = config.server.bind_address.as_str();
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Set up shutdown signal handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", e);
        }
        shutdown_tx.send(()).ok();
    });

    info!("Mission Control is now running");
    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown(shutdown_rx))
        .await?;

    Ok(())
}

/// Applies pending migrations and exits.
pub fn migrate(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    info!("Running database migrations");
    let dal = connect(config, 1)?;
    run_migrations(&dal.pool)?;
    info!("Database is up to date");
    Ok(())
}

/// Runs the health check trigger once.
pub fn health_check(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let dal = connect(config, 1)?;
    let run = jobs::run_health_check(&dal, config.monitor.health_check_interval_minutes)?;

    for health in &run.statuses {
        info!(
            "{} ({}): {}, {} minutes since heartbeat, error rate {}%",
            health.name,
            health.agent_id,
            health.status,
            health.minutes_since_heartbeat,
            health.error_rate
        );
    }
    info!("Health check covered {} agents", run.agents_checked);
    Ok(())
}

/// Records one round of metrics and prunes expired samples.
pub fn record_metrics(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let dal = connect(config, 1)?;
    let run = jobs::record_metrics(
        &dal,
        &SyntheticMetricsSource,
        config.monitor.data_retention_days,
    )?;
    info!(
        "Recorded {} samples, deleted {} older than {} days",
        run.recorded, run.deleted, run.retention_days
    );
    Ok(())
}
