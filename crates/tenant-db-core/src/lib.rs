// ABOUTME: Shared data models for tenant-aware database connection management
// ABOUTME: Organizations, per-tenant connection records, resolved configs and diagnostics DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tenant DB Core
//!
//! Plain data types shared between the connection manager, its metadata
//! store and the admin tooling. Nothing in this crate performs I/O.

/// Organization, connection, dictionary and diagnostics models
pub mod models;

pub use models::{
    ConfigSource, ConnectionConfig, ConnectionTestDetails, ConnectionTestResult, DatabaseConnection,
    DatabaseDriver, DictionaryMapping, Organization, PoolStats, StoredSecret,
    UnsupportedDriverError, DEFAULT_CHARSET, LEGACY_CHARSET,
};
