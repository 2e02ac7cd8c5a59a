// ABOUTME: Tenant-aware connection resolution
// ABOUTME: Re-exports the DatabaseConnectionManager entry point
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Dictionary and organization to live handle resolution
pub mod connection_manager;

pub use connection_manager::DatabaseConnectionManager;
