// ABOUTME: Two-tier connection config reads: tenant-scoped connection rows, then the legacy schema table
// ABOUTME: Also exposes the dictionary-to-organization mapping lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::any::AnyRow;
use tenant_db_core::{
    ConfigSource, ConnectionConfig, DatabaseDriver, DictionaryMapping, StoredSecret,
    LEGACY_CHARSET,
};
use tracing::debug;

use super::{rows, MetadataDatabase};
use crate::errors::{AppError, AppResult};

pub(super) const TENANT_CONFIG_QUERY: &str = r"
    SELECT conn.id, conn.organization_id, conn.connection_name,
           CAST(conn.db_driver AS CHAR) AS db_driver, conn.db_host, conn.db_port,
           conn.db_name, conn.db_user, conn.db_password_encrypted, conn.db_charset,
           CAST(conn.connection_options AS CHAR) AS connection_options
    FROM cspro_dictionaries dict
    JOIN cspro_organization_db_connections conn ON dict.db_connection_id = conn.id
    WHERE dict.dictionary_name = ?
      AND dict.organization_id = ?
      AND conn.organization_id = dict.organization_id
      AND conn.is_active = 1
";

pub(super) const LEGACY_CONFIG_QUERY: &str = r"
    SELECT s.host_name, s.schema_name, s.schema_user_name, s.schema_password
    FROM cspro_dictionaries dict
    JOIN cspro_dictionaries_schema s ON dict.id = s.dictionary_id
    WHERE dict.dictionary_name = ?
";

pub(super) const DICTIONARY_MAPPING_QUERY: &str = r"
    SELECT id, dictionary_name, organization_id, db_connection_id
    FROM cspro_dictionaries
    WHERE dictionary_name = ?
";

impl MetadataDatabase {
    /// Tier 1: the active connection explicitly assigned to a dictionary
    /// within an organization
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn find_tenant_connection_config(
        &self,
        dictionary: &str,
        organization_id: i64,
    ) -> AppResult<Option<ConnectionConfig>> {
        let row = sqlx::query(TENANT_CONFIG_QUERY)
            .bind(dictionary)
            .bind(organization_id)
            .fetch_optional(self.pool())
            .await?;

        debug!(
            dictionary,
            organization_id,
            found = row.is_some(),
            "Tenant-scoped connection lookup"
        );
        row.as_ref().map(row_to_tenant_config).transpose()
    }

    /// Tier 2: the pre-multi-tenant schema row for a dictionary
    ///
    /// `passwords_encrypted` states how the legacy table stores passwords.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn find_legacy_config(
        &self,
        dictionary: &str,
        passwords_encrypted: bool,
    ) -> AppResult<Option<ConnectionConfig>> {
        let row = sqlx::query(LEGACY_CONFIG_QUERY)
            .bind(dictionary)
            .fetch_optional(self.pool())
            .await?;

        debug!(dictionary, found = row.is_some(), "Legacy schema lookup");
        row.as_ref()
            .map(|row| row_to_legacy_config(row, passwords_encrypted))
            .transpose()
    }

    /// Dictionary ownership and explicit connection assignment
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn find_dictionary_mapping(
        &self,
        dictionary: &str,
    ) -> AppResult<Option<DictionaryMapping>> {
        let row = sqlx::query(DICTIONARY_MAPPING_QUERY)
            .bind(dictionary)
            .fetch_optional(self.pool())
            .await?;

        row.map(|row| {
            Ok(DictionaryMapping {
                id: rows::int(&row, "id")?,
                dictionary_name: rows::text(&row, "dictionary_name")?,
                organization_id: rows::opt_int(&row, "organization_id")?,
                db_connection_id: rows::opt_int(&row, "db_connection_id")?,
            })
        })
        .transpose()
    }
}

fn row_to_tenant_config(row: &AnyRow) -> AppResult<ConnectionConfig> {
    let organization_id = rows::int(row, "organization_id")?;
    Ok(ConnectionConfig {
        connection_id: Some(rows::int(row, "id")?),
        connection_name: rows::opt_text(row, "connection_name")?,
        driver: rows::text(row, "db_driver")?,
        host: rows::text(row, "db_host")?,
        port: rows::port(row, "db_port")?,
        database: rows::text(row, "db_name")?,
        user: rows::text(row, "db_user")?,
        password: StoredSecret::Encrypted(
            rows::opt_bytes(row, "db_password_encrypted")?.unwrap_or_default(),
        ),
        charset: rows::opt_text(row, "db_charset")?,
        options: rows::json_object(row, "connection_options")?,
        source: ConfigSource::Tenant { organization_id },
    })
}

fn row_to_legacy_config(row: &AnyRow, passwords_encrypted: bool) -> AppResult<ConnectionConfig> {
    let password = rows::opt_bytes(row, "schema_password")?.unwrap_or_default();
    let password = if passwords_encrypted {
        StoredSecret::Encrypted(password)
    } else {
        let plain = String::from_utf8(password).map_err(|_| {
            AppError::decryption("Legacy schema password is not valid UTF-8")
        })?;
        StoredSecret::Plain(plain)
    };

    Ok(ConnectionConfig {
        connection_id: None,
        connection_name: None,
        driver: DatabaseDriver::PostgreSql.as_str().to_owned(),
        host: rows::text(row, "host_name")?,
        port: None,
        database: rows::text(row, "schema_name")?,
        user: rows::text(row, "schema_user_name")?,
        password,
        charset: Some(LEGACY_CHARSET.to_owned()),
        options: None,
        source: ConfigSource::Legacy,
    })
}
