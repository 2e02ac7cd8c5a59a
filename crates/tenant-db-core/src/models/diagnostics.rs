// ABOUTME: Connection test results and pool statistics DTOs
// ABOUTME: Serialized for the admin UI and the CLI --json output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Outcome of an interactive connection test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    /// Whether the round-trip query succeeded
    pub success: bool,
    /// Human readable outcome
    pub message: String,
    /// Echoed target, only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ConnectionTestDetails>,
}

impl ConnectionTestResult {
    /// Successful test echoing the target
    #[must_use]
    pub fn succeeded(details: ConnectionTestDetails) -> Self {
        Self {
            success: true,
            message: "Connection successful".to_owned(),
            details: Some(details),
        }
    }

    /// Failed test with the reason appended
    #[must_use]
    pub fn failed(reason: impl AsRef<str>) -> Self {
        Self {
            success: false,
            message: format!("Connection failed: {}", reason.as_ref()),
            details: None,
        }
    }
}

/// Target echoed back after a successful test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTestDetails {
    /// Engine tag
    pub driver: String,
    /// Database host
    pub host: String,
    /// Database name
    pub database: String,
}

/// Snapshot of the connection cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of live cached handles
    pub active_connections: usize,
    /// Fingerprints of the cached handles, sorted
    pub connections: Vec<String>,
}
