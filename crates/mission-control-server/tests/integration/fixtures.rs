/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Test fixtures for the Mission Control server.
//!
//! `TestFixture::new` connects to `DATABASE_URL`, applies the migrations once
//! per test binary and wraps the rest of the test in a transaction that is
//! never committed. It returns `None` when `DATABASE_URL` is unset so the
//! database-backed tests skip instead of failing.

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use dotenv::dotenv;
use mission_control_models::models::agents::{Agent, NewAgent};
use mission_control_models::schema::agents;
use mission_control_server::api::{self, AppState};
use mission_control_server::cli::commands::MIGRATIONS;
use mission_control_server::dal::DAL;
use mission_control_server::db::create_shared_connection_pool;
use mission_control_utils::config::Settings;
use serde_json::Value;
use std::env;
use std::sync::Once;
use uuid::Uuid;

pub const TEST_CRON_SECRET: &str = "test-secret";

static MIGRATE: Once = Once::new();

pub fn test_settings() -> Settings {
    let mut settings = Settings::new(None).expect("Failed to load default settings");
    settings.monitor.cron_secret = Some(TEST_CRON_SECRET.to_string());
    settings.relay.tick_interval_ms = 50;
    settings
}

/// Router backed by a pool that never manages to connect. Good for routes
/// that answer before touching the database.
pub fn offline_router() -> Router {
    let pool = create_shared_connection_pool("postgres://mission_control@127.0.0.1:1/unreachable", 1)
        .expect("valid URL");
    let settings = test_settings();
    let cors = settings.cors.clone();
    let state = AppState::new(DAL::new(pool), settings).expect("Failed to build app state");
    api::configure_api_routes(&cors).with_state(state)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Represents a test fixture for the Mission Control server.
#[derive(Clone)]
pub struct TestFixture {
    /// The Data Access Layer (DAL) instance for database operations.
    pub dal: DAL,
    pub settings: Settings,
}

impl TestFixture {
    pub fn new() -> Option<Self> {
        dotenv().ok();
        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("DATABASE_URL not set, skipping database test");
                return None;
            }
        };

        MIGRATE.call_once(|| {
            let mut conn =
                PgConnection::establish(&database_url).expect("Failed to connect to test database");
            conn.run_pending_migrations(MIGRATIONS)
                .expect("Failed to run migrations");
        });

        // One connection, held inside a transaction that is rolled back when
        // the pool is dropped.
        let pool = create_shared_connection_pool(&database_url, 1).expect("Invalid DATABASE_URL");
        {
            let mut conn = pool.get().expect("Failed to get DB connection");
            conn.begin_test_transaction()
                .expect("Failed to start test transaction");
        }

        Some(TestFixture {
            dal: DAL::new(pool),
            settings: test_settings(),
        })
    }

    pub fn router(&self) -> Router {
        let state = AppState::new(self.dal.clone(), self.settings.clone())
            .expect("Failed to build app state");
        api::configure_api_routes(&self.settings.cors).with_state(state)
    }

    pub fn create_test_agent(&self, name: &str) -> Agent {
        let new_agent = NewAgent::new(name.to_string(), "tester".to_string()).unwrap();
        self.dal
            .agents()
            .create(&new_agent)
            .expect("Failed to create test agent")
    }

    /// Overwrites an agent's heartbeat and status.
    pub fn set_agent_state(&self, agent_id: Uuid, status: &str, last_heartbeat: DateTime<Utc>) {
        let conn = &mut self.dal.pool.get().unwrap();
        diesel::update(agents::table.filter(agents::id.eq(agent_id)))
            .set((
                agents::status.eq(status),
                agents::last_heartbeat.eq(last_heartbeat),
            ))
            .execute(conn)
            .expect("Failed to update agent");
    }
}
