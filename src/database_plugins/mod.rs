// ABOUTME: Physical connection seam between the pool and concrete database drivers
// ABOUTME: Defines the Connector trait plus connection string building and the sqlx/tiberius factory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use tenant_db_core::DatabaseDriver;

use crate::errors::AppResult;

/// Connection string construction
pub mod dsn;
/// Driver-backed connector used in production
pub mod factory;
/// Self-healing single-connection sessions
pub mod session;

pub use dsn::{build_dsn, build_for_config};
pub use factory::{LiveConnection, SqlxConnector};
pub use session::{Dialer, ReconnectingSession};

/// Everything a connector needs to open one physical target
#[derive(Clone, Copy)]
pub struct ConnectTarget<'a> {
    /// Engine to open
    pub driver: DatabaseDriver,
    /// Credential-free connection string
    pub dsn: &'a str,
    /// `host[:port]/database`, used in errors and logs
    pub label: &'a str,
    /// Login name
    pub user: &'a str,
    /// Decrypted password
    pub password: &'a str,
}

impl std::fmt::Debug for ConnectTarget<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectTarget")
            .field("driver", &self.driver)
            .field("dsn", &self.dsn)
            .field("label", &self.label)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opens, probes and closes physical database handles
///
/// Handles are cloned out of the pool for every caller, so they must be
/// cheap to clone and safe to share across tasks.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Shareable handle to one physical target
    type Handle: Clone + Send + Sync + 'static;

    /// Open a handle to the target
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::AppError::ConnectionOpen`] on network or
    /// authentication failure
    async fn open(&self, target: &ConnectTarget<'_>) -> AppResult<Self::Handle>;

    /// Run a trivial query against an open handle
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not answer
    async fn ping(&self, handle: &Self::Handle) -> AppResult<()>;

    /// Release a handle
    async fn close(&self, _handle: Self::Handle) {}
}
