// ABOUTME: Per-tenant database connection records: listing, lookup by name, default resolution
// ABOUTME: Includes the transactional clear-then-set default swap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::any::AnyRow;
use tenant_db_core::{DatabaseConnection, StoredSecret, DEFAULT_CHARSET};
use tracing::{info, warn};

use super::{rows, MetadataDatabase};
use crate::errors::{AppError, AppResult};

pub(super) const CONNECTION_COLUMNS: &str = r"
    id, organization_id, connection_name, CAST(db_driver AS CHAR) AS db_driver,
    db_host, db_port, db_name, db_user, db_password_encrypted, db_charset,
    CAST(connection_options AS CHAR) AS connection_options,
    CAST(is_default AS SIGNED) AS is_default,
    CAST(is_active AS SIGNED) AS is_active,
    CAST(created_time AS CHAR) AS created_time,
    CAST(modified_time AS CHAR) AS modified_time
";

pub(super) const DEFAULT_TARGET_QUERY: &str = r"
    SELECT id FROM cspro_organization_db_connections
    WHERE id = ? AND organization_id = ? AND is_active = 1
";

impl MetadataDatabase {
    /// Active connections of an organization, default first, then by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_active_connections(
        &self,
        organization_id: i64,
    ) -> AppResult<Vec<DatabaseConnection>> {
        let sql = format!(
            "SELECT {CONNECTION_COLUMNS} FROM cspro_organization_db_connections \
             WHERE organization_id = ? AND is_active = 1 \
             ORDER BY is_default DESC, connection_name ASC"
        );
        sqlx::query(&sql)
            .bind(organization_id)
            .fetch_all(self.pool())
            .await?
            .iter()
            .map(row_to_connection)
            .collect()
    }

    /// Connection by its name within an organization, active or not
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn find_connection_by_name(
        &self,
        organization_id: i64,
        connection_name: &str,
    ) -> AppResult<Option<DatabaseConnection>> {
        let sql = format!(
            "SELECT {CONNECTION_COLUMNS} FROM cspro_organization_db_connections \
             WHERE organization_id = ? AND connection_name = ?"
        );
        let row = sqlx::query(&sql)
            .bind(organization_id)
            .bind(connection_name)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_connection).transpose()
    }

    /// The active default connection of an organization
    ///
    /// If several rows claim to be the default, the lowest id wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn find_default_connection(
        &self,
        organization_id: i64,
    ) -> AppResult<Option<DatabaseConnection>> {
        let sql = format!(
            "SELECT {CONNECTION_COLUMNS} FROM cspro_organization_db_connections \
             WHERE organization_id = ? AND is_default = 1 AND is_active = 1 \
             ORDER BY id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(organization_id)
            .fetch_all(self.pool())
            .await?;

        if rows.len() > 1 {
            warn!(
                organization_id,
                defaults = rows.len(),
                "Organization has several default connections, using the lowest id"
            );
        }
        rows.first().map(row_to_connection).transpose()
    }

    /// Make `connection_id` the only default connection of its organization
    ///
    /// Returns how many previous defaults were cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the connection is inactive or owned by
    /// another organization, or a database error if the transaction fails
    pub async fn set_default_connection(
        &self,
        organization_id: i64,
        connection_id: i64,
    ) -> AppResult<u64> {
        let mut tx = self.pool().begin().await?;

        let target = sqlx::query(DEFAULT_TARGET_QUERY)
        .bind(connection_id)
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await?;

        if target.is_none() {
            tx.rollback().await?;
            return Err(AppError::not_found(
                "Active database connection",
                format!("{connection_id} in organization {organization_id}"),
            ));
        }

        let cleared = sqlx::query(
            r"
            UPDATE cspro_organization_db_connections
            SET is_default = 0, modified_time = CURRENT_TIMESTAMP
            WHERE organization_id = ? AND id <> ? AND is_default = 1
            ",
        )
        .bind(organization_id)
        .bind(connection_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            r"
            UPDATE cspro_organization_db_connections
            SET is_default = 1, modified_time = CURRENT_TIMESTAMP
            WHERE id = ?
            ",
        )
        .bind(connection_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            organization_id,
            connection_id, cleared, "Default database connection changed"
        );
        Ok(cleared)
    }
}

fn row_to_connection(row: &AnyRow) -> AppResult<DatabaseConnection> {
    Ok(DatabaseConnection {
        id: rows::int(row, "id")?,
        organization_id: rows::int(row, "organization_id")?,
        connection_name: rows::text(row, "connection_name")?,
        driver: rows::text(row, "db_driver")?,
        host: rows::text(row, "db_host")?,
        port: rows::port(row, "db_port")?,
        database: rows::text(row, "db_name")?,
        user: rows::text(row, "db_user")?,
        password: StoredSecret::Encrypted(
            rows::opt_bytes(row, "db_password_encrypted")?.unwrap_or_default(),
        ),
        charset: rows::opt_text(row, "db_charset")?
            .unwrap_or_else(|| DEFAULT_CHARSET.to_owned()),
        options: rows::json_object(row, "connection_options")?,
        is_default: rows::flag(row, "is_default")?,
        is_active: rows::flag(row, "is_active")?,
        created_at: rows::timestamp(row, "created_time"),
        modified_at: rows::timestamp(row, "modified_time"),
    })
}
