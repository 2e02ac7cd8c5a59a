// ABOUTME: Metadata database access for organizations, tenant connections and dictionary mappings
// ABOUTME: Wraps a sqlx Any pool so the same queries run against MySQL in production and SQLite in tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Metadata Database
//!
//! Query methods live next to the records they read:
//! [`connection_config`] for resolution, [`organizations`] and
//! [`db_connections`] for the admin-facing lookups. SQL sticks to `?`
//! placeholders and `= 1` boolean tests; datetime, enum and JSON columns are
//! cast to text and boolean columns to integers so the Any driver can
//! decode them.

/// Two-tier connection config lookups and dictionary mappings
pub mod connection_config;
/// Per-tenant connection records and the default swap
pub mod db_connections;
/// Organization (tenant) lookups
pub mod organizations;
/// Repository seams over the metadata database
pub mod repositories;

mod rows;

#[cfg(test)]
mod column_types;

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;
use tracing::info;

use crate::config::environment::redact_url;
use crate::errors::{AppError, AppResult};

/// Handle to the admin/metadata database
#[derive(Clone, Debug)]
pub struct MetadataDatabase {
    pool: AnyPool,
}

impl MetadataDatabase {
    /// Connect to the metadata database
    ///
    /// # Errors
    ///
    /// Returns an error if the URL scheme is not supported or the database
    /// cannot be reached
    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to connect to metadata database {}: {e}",
                    redact_url(database_url)
                ))
            })?;

        info!(
            url = %redact_url(database_url),
            max_connections,
            "Connected to metadata database"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[must_use]
    pub const fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
