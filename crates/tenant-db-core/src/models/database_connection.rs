// ABOUTME: Per-tenant database connection record and the closed set of supported engines
// ABOUTME: Engine tags are persisted as pdo_mysql, pdo_pgsql and sqlsrv
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::connection_config::{ConfigSource, ConnectionConfig, StoredSecret};

/// Default charset written for new connection rows
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// Raised when an engine tag is not one of the supported drivers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported database driver: {0}")]
pub struct UnsupportedDriverError(pub String);

/// Supported database engines
///
/// The tag is a closed discriminator: it only selects the DSN grammar and the
/// client library, there is no per-engine subtype of [`DatabaseConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseDriver {
    /// MySQL / MariaDB
    #[serde(rename = "pdo_mysql")]
    MySql,
    /// `PostgreSQL`
    #[serde(rename = "pdo_pgsql")]
    PostgreSql,
    /// Microsoft SQL Server
    #[serde(rename = "sqlsrv")]
    SqlServer,
}

impl DatabaseDriver {
    /// All supported drivers, in display order
    pub const ALL: [Self; 3] = [Self::MySql, Self::PostgreSql, Self::SqlServer];

    /// Persisted tag for this driver
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "pdo_mysql",
            Self::PostgreSql => "pdo_pgsql",
            Self::SqlServer => "sqlsrv",
        }
    }

    /// Port the engine listens on when none is configured
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::PostgreSql => 5432,
            Self::SqlServer => 1433,
        }
    }

    /// Human readable engine name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::PostgreSql => "PostgreSQL",
            Self::SqlServer => "SQL Server",
        }
    }
}

impl fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseDriver {
    type Err = UnsupportedDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdo_mysql" | "mysql" => Ok(Self::MySql),
            "pdo_pgsql" | "pgsql" | "postgres" | "postgresql" => Ok(Self::PostgreSql),
            "sqlsrv" | "mssql" | "sqlserver" => Ok(Self::SqlServer),
            _ => Err(UnsupportedDriverError(s.to_owned())),
        }
    }
}

/// A database target owned by exactly one organization
///
/// At most one active row per organization should carry `is_default`; the
/// write side keeps that true by clearing the old default before setting a
/// new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConnection {
    /// Surrogate key
    pub id: i64,
    /// Owning organization (cascade-deleted with it)
    pub organization_id: i64,
    /// Unique within the owning organization
    pub connection_name: String,
    /// Raw engine tag as persisted
    pub driver: String,
    /// Database host
    pub host: String,
    /// Optional port, the engine default applies when absent
    pub port: Option<u16>,
    /// Database (schema) name
    pub database: String,
    /// Login user
    pub user: String,
    /// Encrypted password blob
    #[serde(skip)]
    pub password: StoredSecret,
    /// Client charset
    pub charset: String,
    /// Free-form driver options such as TLS flags
    pub options: Option<Map<String, Value>>,
    /// Whether this is the organization's default target
    pub is_default: bool,
    /// Inactive connections are never resolved
    pub is_active: bool,
    /// Creation timestamp, when the store could decode it
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp, when the store could decode it
    pub modified_at: Option<DateTime<Utc>>,
}

impl DatabaseConnection {
    /// Parse the persisted engine tag
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is not a supported driver
    pub fn driver(&self) -> Result<DatabaseDriver, UnsupportedDriverError> {
        self.driver.parse()
    }

    /// Project this record onto the resolver's connection config
    #[must_use]
    pub fn to_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            connection_id: Some(self.id),
            connection_name: Some(self.connection_name.clone()),
            driver: self.driver.clone(),
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            charset: Some(self.charset.clone()),
            options: self.options.clone(),
            source: ConfigSource::Tenant {
                organization_id: self.organization_id,
            },
        }
    }
}
