// ABOUTME: Main library entry point for tenant-aware database connection resolution
// ABOUTME: Resolves dictionaries and organizations to cached MySQL, PostgreSQL and SQL Server handles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Tenant DB Manager
//!
//! One deployment serves many organizations, each of which may keep its
//! data in a differently configured database. Given a dictionary name and
//! an optional organization id, [`tenant::DatabaseConnectionManager`]
//! finds the connection record, decrypts its password, builds an
//! engine-specific connection string and hands back a cached handle.
//!
//! ## Architecture
//!
//! - **`crypto`**: AES-256-CBC credential cipher
//! - **`database_plugins`**: connection strings and the `Connector` seam
//! - **`database`**: metadata database reads and the config repository
//! - **`connection_pool`**: fingerprint-keyed handle cache
//! - **`tenant`**: the resolver tying them together

/// Environment configuration
pub mod config;

/// Fingerprint-keyed cache of live handles
pub mod connection_pool;

/// Credential encryption
pub mod crypto;

/// Metadata database access
pub mod database;

/// Connection strings and physical drivers
pub mod database_plugins;

/// Error taxonomy
pub mod errors;

/// Logging initialisation
pub mod logging;

/// Connection resolution entry point
pub mod tenant;

pub use tenant_db_core::models;
