// ABOUTME: Subcommand implementations for tenant-db-cli
// ABOUTME: Shared setup loads configuration and connects to the metadata database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod connections;
pub mod password;
pub mod resolve;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tenant_db_manager::config::ManagerConfig;
use tenant_db_manager::database::MetadataDatabase;
use tenant_db_manager::errors::{AppError, AppResult};
use tenant_db_manager::models::Organization;
use tenant_db_manager::tenant::DatabaseConnectionManager;

/// Metadata database plus a manager sharing it
pub struct Context {
    pub config: ManagerConfig,
    pub db: MetadataDatabase,
    pub manager: DatabaseConnectionManager,
}

impl Context {
    pub async fn from_env() -> AppResult<Self> {
        let config = ManagerConfig::from_env()?;
        let db = MetadataDatabase::connect(
            &config.metadata_database_url,
            config.metadata_max_connections,
        )
        .await?;
        let manager = DatabaseConnectionManager::from_metadata(db.clone(), &config)?;
        Ok(Self {
            config,
            db,
            manager,
        })
    }

    pub async fn organization(&self, code: &str) -> AppResult<Organization> {
        self.db
            .find_organization_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Organization", code))
    }
}

/// Pretty JSON for `--json` output
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize command output")
}
