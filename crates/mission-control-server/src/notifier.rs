/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Alert Test Notifier
//!
//! Sends a one-off test notification to an alert destination so an operator
//! can confirm it is reachable.
//!
//! - `webhook`: POSTs `{content}` to the destination URL
//! - `discord`: POSTs `{content, embeds}` in Discord's webhook format
//! - `email`: shape check only, nothing is sent
//!
//! A delivery succeeds only on a 2xx answer. Every failure maps to a
//! [`NotifyError`] whose message is returned to the caller as-is.

use chrono::{DateTime, Utc};
use mission_control_models::models::alert_rules::{NOTIFY_DISCORD, NOTIFY_EMAIL, NOTIFY_WEBHOOK};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const TEST_ALERT_HEADLINE: &str = "🔔 Test Alert from Mission Control";

/// Discord embed accent colour.
const DISCORD_EMBED_COLOR: u32 = 0x3B82F6;

#[derive(Debug, PartialEq)]
pub enum NotifyError {
    MissingFields,
    UnknownType,
    InvalidEmail,
    /// The destination rejected the request or could not be reached.
    DeliveryFailed { kind: &'static str, reason: String },
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyError::MissingFields => write!(f, "Missing notify_type or destination"),
            NotifyError::UnknownType => write!(f, "Unknown notify_type"),
            NotifyError::InvalidEmail => write!(f, "Invalid email address"),
            NotifyError::DeliveryFailed { kind, reason } => {
                write!(f, "{} test failed: {}", kind, reason)
            }
        }
    }
}

impl std::error::Error for NotifyError {}

pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

pub fn webhook_test_payload() -> Value {
    json!({
        "content": format!(
            "{}\nThis is a test notification to verify your alert configuration is working correctly.",
            TEST_ALERT_HEADLINE
        )
    })
}

pub fn discord_test_payload(timestamp: DateTime<Utc>) -> Value {
    json!({
        "content": TEST_ALERT_HEADLINE,
        "embeds": [{
            "title": "Test Notification",
            "description": "This is a test to verify your Discord webhook is configured correctly.",
            "color": DISCORD_EMBED_COLOR,
            "timestamp": timestamp.to_rfc3339(),
        }]
    })
}

/// Dispatches test notifications over HTTP.
#[derive(Clone)]
pub struct AlertTester {
    client: reqwest::Client,
    timeout: Duration,
}

impl AlertTester {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Sends a test notification and returns the success message.
    pub async fn send_test(&self, notify_type: &str, destination: &str) -> Result<String, NotifyError> {
        if notify_type.is_empty() || destination.is_empty() {
            return Err(NotifyError::MissingFields);
        }

        match notify_type {
            NOTIFY_WEBHOOK => {
                self.post("Webhook", destination, &webhook_test_payload())
                    .await?;
                Ok("Webhook test successful".to_string())
            }
            NOTIFY_DISCORD => {
                self.post("Discord", destination, &discord_test_payload(Utc::now()))
                    .await?;
                Ok("Discord test successful".to_string())
            }
            NOTIFY_EMAIL => {
                if !is_valid_email(destination) {
                    return Err(NotifyError::InvalidEmail);
                }
                Ok("Email configuration validated (sending not implemented)".to_string())
            }
            _ => Err(NotifyError::UnknownType),
        }
    }

    async fn post(&self, kind: &'static str, url: &str, payload: &Value) -> Result<(), NotifyError> {
        info!("Sending {} test notification", kind.to_lowercase());

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!("{} test request failed: {}", kind, e);
                NotifyError::DeliveryFailed {
                    kind,
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            warn!("{} test rejected with status {}", kind, status);
            Err(NotifyError::DeliveryFailed {
                kind,
                reason: status.as_u16().to_string(),
            })
        }
    }
}
