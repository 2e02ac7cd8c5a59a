// ABOUTME: Public entry point that resolves a dictionary or organization to a live database handle
// ABOUTME: Composes the config repository, credential cipher and fingerprint-keyed pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Connection Manager
//!
//! ```rust,no_run
//! use tenant_db_manager::config::ManagerConfig;
//! use tenant_db_manager::errors::AppResult;
//! use tenant_db_manager::tenant::DatabaseConnectionManager;
//!
//! # async fn run() -> AppResult<()> {
//! let config = ManagerConfig::from_env()?;
//! let manager = DatabaseConnectionManager::from_config(&config).await?;
//! let handle = manager
//!     .get_connection_for_dictionary("CENSUS_DICT", Some(1))
//!     .await?;
//! # drop(handle);
//! manager.close_all_connections().await;
//! # Ok(())
//! # }
//! ```
//!
//! No call is retried. Callers decide whether a
//! [`AppError::ConnectionOpen`] is worth another attempt.

use std::sync::Arc;

use tenant_db_core::{
    ConnectionConfig, ConnectionTestDetails, ConnectionTestResult, PoolStats, StoredSecret,
};
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use crate::config::ManagerConfig;
use crate::connection_pool::ConnectionPool;
use crate::crypto::CredentialCipher;
use crate::database::repositories::{ConnectionConfigRepository, ConnectionConfigRepositoryImpl};
use crate::database::MetadataDatabase;
use crate::database_plugins::{dsn, ConnectTarget, Connector, SqlxConnector};
use crate::errors::{AppError, AppResult};

/// Resolves tenants and dictionaries to cached physical handles
pub struct DatabaseConnectionManager<C: Connector = SqlxConnector> {
    repository: Arc<dyn ConnectionConfigRepository>,
    cipher: CredentialCipher,
    pool: ConnectionPool<C>,
}

impl DatabaseConnectionManager<SqlxConnector> {
    /// Connect to the metadata database and build a manager with real drivers
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata database is unreachable or the
    /// encryption key is unusable
    pub async fn from_config(config: &ManagerConfig) -> AppResult<Self> {
        let db = MetadataDatabase::connect(
            &config.metadata_database_url,
            config.metadata_max_connections,
        )
        .await?;
        Self::from_metadata(db, config)
    }

    /// Build a manager with real drivers over an existing metadata database
    ///
    /// # Errors
    ///
    /// Returns an error if the encryption key is unusable
    pub fn from_metadata(db: MetadataDatabase, config: &ManagerConfig) -> AppResult<Self> {
        let repository =
            ConnectionConfigRepositoryImpl::new(db, config.legacy_passwords_encrypted);
        let cipher = CredentialCipher::new(&config.encryption_key)?;
        Ok(Self::new(
            Arc::new(repository),
            cipher,
            SqlxConnector::new(config.physical_pool),
        ))
    }
}

impl<C: Connector> DatabaseConnectionManager<C> {
    /// Assemble a manager from its parts
    #[must_use]
    pub fn new(
        repository: Arc<dyn ConnectionConfigRepository>,
        cipher: CredentialCipher,
        connector: C,
    ) -> Self {
        let pool = ConnectionPool::new(Arc::new(connector), cipher.clone());
        Self {
            repository,
            cipher,
            pool,
        }
    }

    /// Live handle for the database holding a dictionary
    ///
    /// The organization's explicitly assigned connection is preferred; the
    /// legacy schema row is used otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConfigNotFound`] when nothing is configured for
    /// the dictionary, or the decryption/connect error of a cache miss
    pub async fn get_connection_for_dictionary(
        &self,
        dictionary: &str,
        organization_id: Option<i64>,
    ) -> AppResult<C::Handle> {
        let config = self.repository.resolve(dictionary, organization_id).await?;
        debug!(
            dictionary,
            organization_id,
            connection_id = ?config.connection_id,
            source = ?config.source,
            "Resolved dictionary connection config"
        );
        self.pool.get_or_create(&config).await
    }

    /// Live handle for the organization's active default connection
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoDefaultConnection`] if the organization has no
    /// active default, or the decryption/connect error of a cache miss
    pub async fn get_default_connection_for_organization(
        &self,
        organization_id: i64,
    ) -> AppResult<C::Handle> {
        let connection = self
            .repository
            .find_default_connection(organization_id)
            .await?
            .ok_or(AppError::NoDefaultConnection { organization_id })?;

        debug!(
            organization_id,
            connection_id = connection.id,
            connection_name = %connection.connection_name,
            "Resolved default connection"
        );
        self.pool.get_or_create(&connection.to_config()).await
    }

    /// Open a throwaway handle to `config`, run `SELECT 1` and report
    ///
    /// Never fails: every error is folded into the result. The handle is not
    /// cached and is closed before returning.
    pub async fn test_connection(&self, config: &ConnectionConfig) -> ConnectionTestResult {
        match self.probe(config).await {
            Ok(details) => {
                info!(
                    connection_id = ?config.connection_id,
                    target = %config.target_label(),
                    "Connection test succeeded"
                );
                ConnectionTestResult::succeeded(details)
            }
            Err(e) => {
                error!(
                    connection_id = ?config.connection_id,
                    target = %config.target_label(),
                    error = %e,
                    "Connection test failed"
                );
                ConnectionTestResult::failed(e.to_string())
            }
        }
    }

    async fn probe(&self, config: &ConnectionConfig) -> AppResult<ConnectionTestDetails> {
        let (driver, dsn) = dsn::build_for_config(config)?;
        let password = self.cipher.decrypt(&config.password)?;
        let label = config.target_label();

        let connector = self.pool.connector();
        let handle = connector
            .open(&ConnectTarget {
                driver,
                dsn: &dsn,
                label: &label,
                user: &config.user,
                password: &password,
            })
            .await?;

        let pinged = connector.ping(&handle).await;
        connector.close(handle).await;
        pinged?;

        Ok(ConnectionTestDetails {
            driver: driver.as_str().to_owned(),
            host: config.host.clone(),
            database: config.database.clone(),
        })
    }

    /// Encrypt a password for storage
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher cannot be initialised
    pub fn encrypt_password(&self, plaintext: &str) -> AppResult<String> {
        self.cipher.encrypt(plaintext)
    }

    /// Recover a stored password
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Decryption`] if the secret cannot be recovered
    pub fn decrypt_password(&self, secret: &StoredSecret) -> AppResult<Zeroizing<String>> {
        self.cipher.decrypt(secret)
    }

    /// Cached handle count and fingerprints
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Close and forget every cached handle
    pub async fn close_all_connections(&self) -> usize {
        self.pool.close_all().await
    }
}
