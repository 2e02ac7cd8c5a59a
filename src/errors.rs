// ABOUTME: Unified error taxonomy for connection resolution, decryption and physical connects
// ABOUTME: Provides AppError with stable error codes and constructor helpers, plus AppResult
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! Every public operation returns [`AppResult`]. The resolver never retries:
//! each variant is surfaced to the caller, who decides whether a retry with
//! backoff makes sense (only [`AppError::ConnectionOpen`] usually does).

use std::fmt;

use serde::{Deserialize, Serialize};
use tenant_db_core::UnsupportedDriverError;
use thiserror::Error;

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No resolvable connection config for a dictionary/tenant pair
    ConfigNotFound,
    /// Unknown engine tag
    UnsupportedEngine,
    /// Corrupt or mis-keyed secret
    DecryptionFailed,
    /// Network or authentication failure opening a physical handle
    ConnectionOpenFailed,
    /// Organization has no active default connection
    NoDefaultConnection,
    /// Metadata store query failure
    DatabaseError,
    /// Invalid process configuration
    ConfigError,
    /// Invalid caller input
    InvalidInput,
    /// Referenced record does not exist
    ResourceNotFound,
}

impl ErrorCode {
    /// Stable string form of the code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigNotFound => "CONFIG_NOT_FOUND",
            Self::UnsupportedEngine => "UNSUPPORTED_ENGINE",
            Self::DecryptionFailed => "DECRYPTION_FAILED",
            Self::ConnectionOpenFailed => "CONNECTION_OPEN_FAILED",
            Self::NoDefaultConnection => "NO_DEFAULT_CONNECTION",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InvalidInput => "INVALID_INPUT",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Neither the tenant-scoped nor the legacy tier produced a config
    #[error("No database connection configured for dictionary: {dictionary}")]
    ConfigNotFound {
        /// Dictionary that failed to resolve
        dictionary: String,
        /// Organization supplied by the caller, if any
        organization_id: Option<i64>,
    },

    /// Engine tag outside the supported set
    #[error("Unsupported database driver: {0}")]
    UnsupportedEngine(String),

    /// Stored secret could not be recovered
    #[error("Password decryption failed: {0}")]
    Decryption(String),

    /// Physical connection could not be opened or did not answer
    #[error("{driver} connection to {target} failed: {reason}")]
    ConnectionOpen {
        /// Engine display name
        driver: String,
        /// `host[:port]/database`, never credentials
        target: String,
        /// Driver error message
        reason: String,
    },

    /// Organization has no active default connection
    #[error("No default database connection for organization ID: {organization_id}")]
    NoDefaultConnection {
        /// Organization looked up
        organization_id: i64,
    },

    /// Metadata store failure
    #[error("Database error: {0}")]
    Database(String),

    /// Process configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied an invalid value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced record does not exist
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Lookup key
        key: String,
    },
}

impl AppError {
    /// Metadata store failure
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Configuration problem
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Invalid caller input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Missing record
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Secret could not be recovered
    pub fn decryption(reason: impl Into<String>) -> Self {
        Self::Decryption(reason.into())
    }

    /// Physical connect failure
    pub fn connection_open(
        driver: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ConnectionOpen {
            driver: driver.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Machine-readable code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Self::UnsupportedEngine(_) => ErrorCode::UnsupportedEngine,
            Self::Decryption(_) => ErrorCode::DecryptionFailed,
            Self::ConnectionOpen { .. } => ErrorCode::ConnectionOpenFailed,
            Self::NoDefaultConnection { .. } => ErrorCode::NoDefaultConnection,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::NotFound { .. } => ErrorCode::ResourceNotFound,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<UnsupportedDriverError> for AppError {
    fn from(err: UnsupportedDriverError) -> Self {
        Self::UnsupportedEngine(err.0)
    }
}

/// Result alias used across the crate
pub type AppResult<T> = Result<T, AppError>;
