/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Mission Control Server
//!
//! HTTP backend for monitoring a small fleet of automation agents: agent,
//! alert, session and external-agent records in PostgreSQL, a health
//! classifier driven by heartbeats and error rates, and a live metrics
//! stream over server-sent events.

pub mod api;
pub mod cli;
pub mod dal;
pub mod db;
pub mod health;
pub mod jobs;
pub mod metrics;
pub mod notifier;
pub mod prober;
pub mod relay;
pub mod sampler;
pub mod utils;
