// ABOUTME: Metadata database implementation of ConnectionConfigRepository
// ABOUTME: Runs the tenant-scoped lookup first and falls back to the legacy schema table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use tenant_db_core::{ConnectionConfig, DatabaseConnection};
use tracing::debug;

use super::ConnectionConfigRepository;
use crate::database::MetadataDatabase;
use crate::errors::{AppError, AppResult};

/// SQL implementation of `ConnectionConfigRepository`
pub struct ConnectionConfigRepositoryImpl {
    db: MetadataDatabase,
    legacy_passwords_encrypted: bool,
}

impl ConnectionConfigRepositoryImpl {
    /// Create a repository over the metadata database
    #[must_use]
    pub const fn new(db: MetadataDatabase, legacy_passwords_encrypted: bool) -> Self {
        Self {
            db,
            legacy_passwords_encrypted,
        }
    }
}

#[async_trait]
impl ConnectionConfigRepository for ConnectionConfigRepositoryImpl {
    async fn resolve(
        &self,
        dictionary: &str,
        organization_id: Option<i64>,
    ) -> AppResult<ConnectionConfig> {
        if let Some(organization_id) = organization_id {
            if let Some(config) = self
                .db
                .find_tenant_connection_config(dictionary, organization_id)
                .await?
            {
                debug!(
                    dictionary,
                    organization_id,
                    connection_id = ?config.connection_id,
                    "Resolved tenant-scoped connection"
                );
                return Ok(config);
            }
        }

        if let Some(config) = self
            .db
            .find_legacy_config(dictionary, self.legacy_passwords_encrypted)
            .await?
        {
            debug!(dictionary, "Resolved legacy schema connection");
            return Ok(config);
        }

        Err(AppError::ConfigNotFound {
            dictionary: dictionary.to_owned(),
            organization_id,
        })
    }

    async fn find_default_connection(
        &self,
        organization_id: i64,
    ) -> AppResult<Option<DatabaseConnection>> {
        self.db.find_default_connection(organization_id).await
    }
}
