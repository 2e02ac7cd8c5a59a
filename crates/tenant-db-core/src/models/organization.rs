// ABOUTME: Tenant (organization) record and dictionary-to-organization mapping
// ABOUTME: Organizations are soft-deactivated, never deleted, to keep connection history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An isolated customer entity (tenant) owning its own database connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Surrogate key
    pub id: i64,
    /// Immutable business key (e.g. `ANSD`)
    pub code: String,
    /// Display name
    pub name: String,
    /// Free-form type tag (`statistics_office` by default)
    pub organization_type: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: Option<String>,
    /// Contact address for the tenant's administrators
    pub contact_email: Option<String>,
    /// Deactivation is a flag flip, never a delete
    pub is_active: bool,
    /// Creation timestamp, when the store could decode it
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp, when the store could decode it
    pub modified_at: Option<DateTime<Utc>>,
}

/// Association between a globally unique dictionary name and its owner
///
/// `db_connection_id` is optional: without it the dictionary resolves through
/// the legacy per-dictionary schema table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryMapping {
    /// Dictionary row id
    pub id: i64,
    /// Logical dataset name
    pub dictionary_name: String,
    /// Owning organization, if the dictionary has been migrated
    pub organization_id: Option<i64>,
    /// Explicit connection within the owning organization
    pub db_connection_id: Option<i64>,
}

impl DictionaryMapping {
    /// Whether tenant-scoped resolution can succeed for this mapping
    #[must_use]
    pub const fn is_tenant_scoped(&self) -> bool {
        self.organization_id.is_some() && self.db_connection_id.is_some()
    }
}
