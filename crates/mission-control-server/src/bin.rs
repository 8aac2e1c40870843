/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Mission Control CLI application
//!
//! Entry point for the `mission-control` binary: loads configuration,
//! installs tracing and dispatches to the selected subcommand.

use mission_control_server::cli::{commands, parse_cli, Commands};
use mission_control_utils::config::Settings;
use mission_control_utils::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = parse_cli();

    // Load configuration
    let config = Settings::new(cli.config.clone())?;

    // Initialize tracing
    telemetry::init(&config.telemetry, &config.log.level, &config.log.format)?;

    let result = match cli.command {
        Commands::Serve => commands::serve(&config).await,
        Commands::Migrate => commands::migrate(&config),
        Commands::HealthCheck => commands::health_check(&config),
        Commands::RecordMetrics => commands::record_metrics(&config),
    };

    telemetry::shutdown();
    result
}
