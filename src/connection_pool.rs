// ABOUTME: In-memory cache of live tenant database handles keyed by a target fingerprint
// ABOUTME: Opens at most one physical handle per fingerprint, decrypting and building the DSN on miss
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Connection Pool
//!
//! The fingerprint covers engine, host, port, database and user. Password
//! and charset are not part of it: two configs that differ only there share
//! whichever handle was opened first, and a password change is only picked
//! up after [`ConnectionPool::close_all`].
//!
//! Each fingerprint maps to a `OnceCell`, so concurrent misses wait on a
//! single connect. A failed connect leaves the cell empty and the next call
//! tries again. Cached handles are never health-checked and never evicted.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tenant_db_core::{ConnectionConfig, DatabaseDriver, PoolStats};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::crypto::CredentialCipher;
use crate::database_plugins::{dsn, ConnectTarget, Connector};
use crate::errors::{AppError, AppResult};

#[derive(Serialize)]
struct FingerprintKey<'a> {
    driver: &'a str,
    host: &'a str,
    port: Option<u16>,
    name: &'a str,
    user: &'a str,
}

/// Cache key for a physical target
///
/// Engine aliases are canonicalised and host and database name trimmed the
/// way the DSN builder trims them, so `mysql` and `pdo_mysql` produce the
/// same fingerprint.
///
/// # Errors
///
/// Returns [`AppError::UnsupportedEngine`] for an unknown engine tag
pub fn fingerprint(config: &ConnectionConfig) -> AppResult<String> {
    let driver: DatabaseDriver = config.driver.parse()?;
    let key = FingerprintKey {
        driver: driver.as_str(),
        host: config.host.trim(),
        port: config.port,
        name: config.database.trim(),
        user: &config.user,
    };
    let encoded = serde_json::to_vec(&key)
        .map_err(|e| AppError::invalid_input(format!("Cannot fingerprint connection: {e}")))?;
    Ok(hex::encode(Sha256::digest(encoded)))
}

/// Unbounded cache of physical handles
pub struct ConnectionPool<C: Connector> {
    connector: Arc<C>,
    cipher: CredentialCipher,
    entries: DashMap<String, Arc<OnceCell<C::Handle>>>,
}

impl<C: Connector> ConnectionPool<C> {
    /// Create an empty pool
    #[must_use]
    pub fn new(connector: Arc<C>, cipher: CredentialCipher) -> Self {
        Self {
            connector,
            cipher,
            entries: DashMap::new(),
        }
    }

    /// Connector used to open handles
    #[must_use]
    pub const fn connector(&self) -> &Arc<C> {
        &self.connector
    }

    /// Return the cached handle for the config's target, opening it on miss
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is unsupported, the password cannot be
    /// decrypted, the DSN cannot be built or the connect fails
    pub async fn get_or_create(&self, config: &ConnectionConfig) -> AppResult<C::Handle> {
        let key = fingerprint(config)?;
        let cell = Arc::clone(&self.entries.entry(key.clone()).or_default());

        if let Some(handle) = cell.get() {
            debug!(fingerprint = %key, "Connection cache hit");
            return Ok(handle.clone());
        }

        let handle = cell
            .get_or_try_init(|| self.materialize(config, &key))
            .await?;
        Ok(handle.clone())
    }

    async fn materialize(&self, config: &ConnectionConfig, key: &str) -> AppResult<C::Handle> {
        let password = self.cipher.decrypt(&config.password).map_err(|e| {
            error!(
                connection_id = ?config.connection_id,
                error = %e,
                "Failed to decrypt connection password"
            );
            e
        })?;
        let (driver, dsn) = dsn::build_for_config(config)?;
        let label = config.target_label();

        let target = ConnectTarget {
            driver,
            dsn: &dsn,
            label: &label,
            user: &config.user,
            password: &password,
        };
        let handle = self.connector.open(&target).await.map_err(|e| {
            error!(
                connection_id = ?config.connection_id,
                target = %label,
                error = %e,
                "Failed to open tenant database connection"
            );
            e
        })?;

        info!(
            fingerprint = %key,
            driver = driver.as_str(),
            target = %label,
            "Cached new tenant database connection"
        );
        Ok(handle)
    }

    /// Number of cached handles and their fingerprints, sorted
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let mut connections: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        connections.sort();

        PoolStats {
            active_connections: connections.len(),
            connections,
        }
    }

    /// Drop every cached handle and return how many were closed
    ///
    /// Meant for shutdown or an administrative reset; calls racing with it
    /// may open a handle that is not cached.
    pub async fn close_all(&self) -> usize {
        let keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        let mut closed = 0;

        for key in keys {
            let Some((_, cell)) = self.entries.remove(&key) else {
                continue;
            };
            let handle = match Arc::try_unwrap(cell) {
                Ok(cell) => cell.into_inner(),
                Err(shared) => shared.get().cloned(),
            };
            if let Some(handle) = handle {
                self.connector.close(handle).await;
                closed += 1;
            }
        }

        info!(closed, "Closed all tenant database connections");
        closed
    }
}
