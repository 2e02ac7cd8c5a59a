// ABOUTME: Configuration module root for the tenant connection manager
// ABOUTME: Environment-only configuration, no config files are read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment-variable based configuration
pub mod environment;

pub use environment::{ManagerConfig, PhysicalPoolConfig};
