/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # External Agent Prober
//!
//! Asks an external agent for its metrics by trying a fixed list of paths in
//! order. The first answer that is 2xx and carries a JSON body wins.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Paths tried against the agent's base URL, in order.
pub const PROBE_PATHS: [&str; 4] = ["/metrics", "/api/metrics", "/health", "/api/status"];

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSuccess {
    pub path: &'static str,
    pub body: Value,
}

/// Every path failed. Holds one reason per attempted path.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeFailure {
    pub attempts: Vec<String>,
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "all probe paths failed: {}", self.attempts.join("; "))
    }
}

impl std::error::Error for ProbeFailure {}

#[derive(Clone)]
pub struct Prober {
    client: reqwest::Client,
    timeout: Duration,
}

impl Prober {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Probes `base_url`. An empty `api_key` sends no Authorization header.
    pub async fn probe(&self, base_url: &str, api_key: &str) -> Result<ProbeSuccess, ProbeFailure> {
        let mut attempts = Vec::with_capacity(PROBE_PATHS.len());

        for path in PROBE_PATHS {
            let url = format!("{}{}", base_url, path);
            match self.attempt(&url, api_key).await {
                Ok(body) => {
                    info!("Probe of {} succeeded", url);
                    return Ok(ProbeSuccess { path, body });
                }
                Err(reason) => {
                    debug!("Probe of {} failed: {}", url, reason);
                    attempts.push(format!("{}: {}", path, reason));
                }
            }
        }

        warn!("All probe paths failed for {}", base_url);
        Err(ProbeFailure { attempts })
    }

    async fn attempt(&self, url: &str, api_key: &str) -> Result<Value, String> {
        let mut request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json");

        if !api_key.is_empty() {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("Invalid JSON body: {}", e))
    }
}
