/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Source of per-agent resource readings.
//!
//! Agents do not report cpu, memory or request rate yet, so the default
//! [`SyntheticMetricsSource`] draws random values. Anything that can read
//! real numbers plugs in through [`MetricsSource`].

use mission_control_models::models::agents::Agent;
use rand::Rng;

/// One reading for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    /// Percent, 0-100
    pub cpu: f64,
    /// Percent, 0-100
    pub memory: f64,
    pub requests_per_min: i64,
}

pub trait MetricsSource: Send + Sync {
    fn sample(&self, agent: &Agent) -> MetricSample;
}

/// Uniformly random readings. A stand-in until agents report real numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticMetricsSource;

impl MetricsSource for SyntheticMetricsSource {
    fn sample(&self, _agent: &Agent) -> MetricSample {
        let mut rng = rand::thread_rng();
        MetricSample {
            cpu: rng.gen_range(0.0..100.0),
            memory: rng.gen_range(0.0..100.0),
            requests_per_min: rng.gen_range(0..100),
        }
    }
}
