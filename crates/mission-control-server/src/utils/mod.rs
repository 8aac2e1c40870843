/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Utility functions for the Mission Control server.

use tokio::sync::oneshot;
use tracing::info;

pub mod background_tasks;

/// Resolves once the shutdown signal fires (or its sender is dropped).
pub async fn shutdown(shutdown_rx: oneshot::Receiver<()>) {
    let _ = shutdown_rx.await;
    info!("Shutdown signal received, draining connections");
}
