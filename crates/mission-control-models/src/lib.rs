/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Diesel schema and row types for Mission Control.
pub mod models;
pub mod schema;
