// ABOUTME: Environment-based configuration for the tenant connection manager
// ABOUTME: Metadata database URL, encryption key material and physical pool sizing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt;

use zeroize::Zeroizing;

use crate::errors::{AppError, AppResult};

/// Metadata database URL
pub const METADATA_URL_VAR: &str = "TENANT_DB_METADATA_URL";
/// Fallback metadata database URL
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Symmetric key material for stored passwords
pub const ENCRYPTION_KEY_VAR: &str = "TENANT_DB_ENCRYPTION_KEY";
/// Whether legacy schema passwords are encrypted blobs
pub const LEGACY_ENCRYPTED_VAR: &str = "TENANT_DB_LEGACY_PASSWORDS_ENCRYPTED";
/// Pool size per physical tenant target
pub const MAX_CONNECTIONS_VAR: &str = "TENANT_DB_MAX_CONNECTIONS";
/// Pool size for the metadata database
pub const METADATA_MAX_CONNECTIONS_VAR: &str = "TENANT_DB_METADATA_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Sizing of the driver-level pool behind each cached handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalPoolConfig {
    /// Maximum connections per tenant target
    pub max_connections: u32,
}

impl Default for PhysicalPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Process configuration for the connection manager
#[derive(Clone)]
pub struct ManagerConfig {
    /// sqlx URL of the admin/metadata database
    pub metadata_database_url: String,
    /// Maximum connections to the metadata database
    pub metadata_max_connections: u32,
    /// Key material for the credential cipher
    pub encryption_key: Zeroizing<Vec<u8>>,
    /// Legacy schema passwords are stored encrypted (`true`) or in plaintext
    pub legacy_passwords_encrypted: bool,
    /// Driver pool sizing per tenant target
    pub physical_pool: PhysicalPoolConfig,
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("metadata_database_url", &redact_url(&self.metadata_database_url))
            .field("metadata_max_connections", &self.metadata_max_connections)
            .field("encryption_key", &"<redacted>")
            .field("legacy_passwords_encrypted", &self.legacy_passwords_encrypted)
            .field("physical_pool", &self.physical_pool)
            .finish()
    }
}

impl ManagerConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> AppResult<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_vars<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let metadata_database_url = non_empty(&lookup, METADATA_URL_VAR)
            .or_else(|| non_empty(&lookup, DATABASE_URL_VAR))
            .ok_or_else(|| {
                AppError::config(format!(
                    "{METADATA_URL_VAR} (or {DATABASE_URL_VAR}) must be set"
                ))
            })?;

        let encryption_key = non_empty(&lookup, ENCRYPTION_KEY_VAR)
            .map(|key| Zeroizing::new(key.into_bytes()))
            .ok_or_else(|| AppError::config(format!("{ENCRYPTION_KEY_VAR} must be set")))?;

        let legacy_passwords_encrypted = non_empty(&lookup, LEGACY_ENCRYPTED_VAR)
            .map_or(Ok(true), |raw| parse_bool(LEGACY_ENCRYPTED_VAR, &raw))?;

        let max_connections = parse_count(&lookup, MAX_CONNECTIONS_VAR)?;
        let metadata_max_connections = parse_count(&lookup, METADATA_MAX_CONNECTIONS_VAR)?;

        Ok(Self {
            metadata_database_url,
            metadata_max_connections,
            encryption_key,
            legacy_passwords_encrypted,
            physical_pool: PhysicalPoolConfig { max_connections },
        })
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn parse_bool(name: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::config(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

fn parse_count<F>(lookup: &F, name: &str) -> AppResult<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, name) else {
        return Ok(DEFAULT_MAX_CONNECTIONS);
    };
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(AppError::config(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
        Ok(count) => Ok(count),
    }
}

/// Strip credentials from a database URL for logging
#[must_use]
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_owned();
    };
    rest.rsplit_once('@').map_or_else(
        || url.to_owned(),
        |(_, host_part)| format!("{scheme}://***@{host_part}"),
    )
}
