// ABOUTME: Repository trait definitions for the connection resolution layer
// ABOUTME: Lets the manager depend on lookups rather than on a concrete metadata database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use tenant_db_core::{ConnectionConfig, DatabaseConnection};

use crate::errors::AppResult;

/// SQL implementation of the connection config repository
pub mod connection_config_repository;

pub use connection_config_repository::ConnectionConfigRepositoryImpl;

/// Connection config store
///
/// Resolution is two-tier: the tenant-scoped connection explicitly assigned
/// to the dictionary, then the legacy per-dictionary schema row.
#[async_trait]
pub trait ConnectionConfigRepository: Send + Sync {
    /// Resolve the connection config for a dictionary
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::AppError::ConfigNotFound`] when neither tier
    /// has a row, or a database error if a lookup fails
    async fn resolve(
        &self,
        dictionary: &str,
        organization_id: Option<i64>,
    ) -> AppResult<ConnectionConfig>;

    /// Active default connection of an organization, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails
    async fn find_default_connection(
        &self,
        organization_id: i64,
    ) -> AppResult<Option<DatabaseConnection>>;
}
