// ABOUTME: Organization (tenant) lookups by id, by business code and active listing
// ABOUTME: Organizations are soft-deactivated, so listings filter on is_active
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::any::AnyRow;
use tenant_db_core::Organization;

use super::{rows, MetadataDatabase};
use crate::errors::AppResult;

pub(super) const ORGANIZATION_COLUMNS: &str = r"
    id, organization_code, organization_name, organization_type, country_code,
    contact_email, CAST(is_active AS SIGNED) AS is_active,
    CAST(created_time AS CHAR) AS created_time,
    CAST(modified_time AS CHAR) AS modified_time
";

impl MetadataDatabase {
    /// Organization by primary key
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn find_organization(&self, organization_id: i64) -> AppResult<Option<Organization>> {
        let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM cspro_organizations WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(organization_id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_organization).transpose()
    }

    /// Organization by its business code
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn find_organization_by_code(&self, code: &str) -> AppResult<Option<Organization>> {
        let sql = format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM cspro_organizations WHERE organization_code = ?"
        );
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_organization).transpose()
    }

    /// Active organizations ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_active_organizations(&self) -> AppResult<Vec<Organization>> {
        let sql = format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM cspro_organizations \
             WHERE is_active = 1 ORDER BY organization_name ASC"
        );
        sqlx::query(&sql)
            .fetch_all(self.pool())
            .await?
            .iter()
            .map(row_to_organization)
            .collect()
    }
}

fn row_to_organization(row: &AnyRow) -> AppResult<Organization> {
    Ok(Organization {
        id: rows::int(row, "id")?,
        code: rows::text(row, "organization_code")?,
        name: rows::text(row, "organization_name")?,
        organization_type: rows::opt_text(row, "organization_type")?,
        country_code: rows::opt_text(row, "country_code")?,
        contact_email: rows::opt_text(row, "contact_email")?,
        is_active: rows::flag(row, "is_active")?,
        created_at: rows::timestamp(row, "created_time"),
        modified_at: rows::timestamp(row, "modified_time"),
    })
}
