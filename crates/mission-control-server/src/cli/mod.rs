/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
/// Mission Control CLI
///
/// Serves the monitoring API, manages the database schema and runs the
/// periodic jobs once from the command line.
pub struct Cli {
    /// Optional configuration file layered over the built-in defaults
    #[arg(long, global = true, env = "MISSION_CONTROL_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the Mission Control server
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Classify every agent once and log the results
    HealthCheck,

    /// Record one round of agent metrics and prune expired samples
    RecordMetrics,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
