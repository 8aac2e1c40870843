/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # API Routes Aggregator Module
//!
//! Aggregates the `/api/*` route groups, the process probes and the
//! Prometheus endpoint into one router, and applies CORS, request tracing
//! and HTTP metrics.

pub mod agents;
pub mod alerts;
pub mod cron;
pub mod external_agents;
pub mod metrics;
pub mod sessions;

use crate::dal::DAL;
use crate::notifier::AlertTester;
use crate::prober::Prober;
use crate::relay::RelayConfig;
use crate::sampler::{MetricsSource, SyntheticMetricsSource};
use axum::{
    extract::{FromRef, MatchedPath, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use hyper::StatusCode;
use mission_control_utils::config::{Cors, Settings};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dal: DAL,
    pub settings: Arc<Settings>,
    pub sampler: Arc<dyn MetricsSource>,
    pub alert_tester: AlertTester,
    pub prober: Prober,
}

impl AppState {
    /// Builds the state with the synthetic metrics source.
    pub fn new(dal: DAL, settings: Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;

        Ok(AppState {
            alert_tester: AlertTester::new(
                client.clone(),
                Duration::from_secs(settings.alerts.test_timeout_seconds),
            ),
            prober: Prober::new(client, Duration::from_secs(settings.probe.timeout_seconds)),
            sampler: Arc::new(SyntheticMetricsSource),
            settings: Arc::new(settings),
            dal,
        })
    }

    /// Swaps the metrics source used by the relay and the metrics cron.
    pub fn with_sampler(mut self, sampler: Arc<dyn MetricsSource>) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn relay_config(&self) -> RelayConfig {
        let relay = &self.settings.relay;
        RelayConfig {
            tick_interval: Duration::from_millis(relay.tick_interval_ms),
            agent_limit: relay.agent_limit,
            activity_window: chrono::Duration::milliseconds(relay.activity_window_ms),
        }
    }
}

impl FromRef<AppState> for DAL {
    fn from_ref(state: &AppState) -> DAL {
        state.dal.clone()
    }
}

/// Configures the full application router.
pub fn configure_api_routes(cors: &Cors) -> Router<AppState> {
    let api = Router::new()
        .merge(agents::routes())
        .merge(alerts::routes())
        .merge(cron::routes())
        .merge(metrics::routes())
        .merge(external_agents::routes())
        .merge(sessions::routes());

    Router::new()
        .nest("/api", api)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/internal/metrics", get(prometheus_metrics))
        .route_layer(middleware::from_fn(track_http_metrics))
        .layer(build_cors_layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Builds the CORS layer. A `*` origin allows any origin.
fn build_cors_layer(cors: &Cors) -> CorsLayer {
    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| match m.parse::<Method>() {
            Ok(method) => Some(method),
            Err(_) => {
                warn!("Ignoring invalid CORS method: {}", m);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(methods)
        .max_age(Duration::from_secs(cors.max_age_seconds));

    let layer = if cors.allowed_headers.iter().any(|h| h == "*") {
        layer.allow_headers(Any)
    } else {
        layer.allow_headers(
            cors.allowed_headers
                .iter()
                .filter_map(|h| h.parse::<header::HeaderName>().ok())
                .collect::<Vec<_>>(),
        )
    };

    if cors.allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

async fn track_http_metrics(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    crate::metrics::record_http_request(
        &endpoint,
        &method,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

/// Liveness probe.
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe. Ready once the database answers.
async fn readyz(State(dal): State<DAL>) -> Response {
    match dal.ping() {
        Ok(()) => (StatusCode::OK, "Ready").into_response(),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "Database unavailable"})),
            )
                .into_response()
        }
    }
}

/// Prometheus text exposition.
async fn prometheus_metrics() -> Response {
    match crate::metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to encode metrics"})),
            )
                .into_response()
        }
    }
}
