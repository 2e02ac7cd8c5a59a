// ABOUTME: Model module root re-exporting tenant, connection and diagnostics types
// ABOUTME: Keeps the public surface of tenant-db-core flat for downstream crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod connection_config;
mod database_connection;
mod diagnostics;
mod organization;

pub use connection_config::{ConfigSource, ConnectionConfig, StoredSecret, LEGACY_CHARSET};
pub use database_connection::{
    DatabaseConnection, DatabaseDriver, UnsupportedDriverError, DEFAULT_CHARSET,
};
pub use diagnostics::{ConnectionTestDetails, ConnectionTestResult, PoolStats};
pub use organization::{DictionaryMapping, Organization};
