// ABOUTME: Resolved connection configuration handed from the config store to the pool
// ABOUTME: Carries the stored (possibly encrypted) secret and where the config came from
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Charset synthesized for legacy schema rows
pub const LEGACY_CHARSET: &str = "utf8";

/// A password as it comes out of storage
#[derive(Clone, PartialEq, Eq)]
pub enum StoredSecret {
    /// Ready-to-use plaintext (unencrypted legacy rows, unsaved admin input)
    Plain(String),
    /// Encrypted blob, binary-safe
    Encrypted(Vec<u8>),
}

impl StoredSecret {
    /// Wrap text read from a column that holds an encrypted blob
    #[must_use]
    pub fn encrypted_text(text: &str) -> Self {
        Self::Encrypted(text.as_bytes().to_vec())
    }

    /// Whether the secret must go through the cipher before use
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }
}

impl Default for StoredSecret {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("StoredSecret::Plain(<redacted>)"),
            Self::Encrypted(bytes) => write!(f, "StoredSecret::Encrypted({} bytes)", bytes.len()),
        }
    }
}

/// Which resolution tier produced a config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigSource {
    /// Per-tenant connection table
    Tenant {
        /// Organization owning the connection
        organization_id: i64,
    },
    /// Pre-multi-tenant per-dictionary schema table
    Legacy,
    /// Built by a caller, not read from storage
    Adhoc,
}

/// Everything needed to open a physical connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connection row id (absent for legacy and ad-hoc configs)
    pub connection_id: Option<i64>,
    /// Connection name (absent for legacy configs)
    pub connection_name: Option<String>,
    /// Raw engine tag, validated when the DSN is built
    pub driver: String,
    /// Database host
    pub host: String,
    /// Optional port
    pub port: Option<u16>,
    /// Database (schema) name
    pub database: String,
    /// Login user
    pub user: String,
    /// Stored password
    #[serde(skip)]
    pub password: StoredSecret,
    /// Client charset, only honoured by engines that accept one
    pub charset: Option<String>,
    /// Free-form driver options
    pub options: Option<Map<String, Value>>,
    /// Resolution tier that produced this config
    pub source: ConfigSource,
}

impl ConnectionConfig {
    /// Build a config that did not come from storage (admin "test" forms)
    #[must_use]
    pub fn adhoc(
        driver: impl Into<String>,
        host: impl Into<String>,
        port: Option<u16>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: StoredSecret,
    ) -> Self {
        Self {
            connection_id: None,
            connection_name: None,
            driver: driver.into(),
            host: host.into(),
            port,
            database: database.into(),
            user: user.into(),
            password,
            charset: None,
            options: None,
            source: ConfigSource::Adhoc,
        }
    }

    /// Short `host[:port]/database` label safe to log and display
    #[must_use]
    pub fn target_label(&self) -> String {
        self.port.map_or_else(
            || format!("{}/{}", self.host, self.database),
            |port| format!("{}:{port}/{}", self.host, self.database),
        )
    }
}
