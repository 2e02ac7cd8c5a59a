// ABOUTME: Single-connection session that verifies its connection on checkout and redials when broken
// ABOUTME: Gives drivers without a built-in pool the same recovery behaviour as the sqlx pools
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};

/// Opens and checks one driver-level connection
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    /// Live connection produced by [`Dialer::dial`]
    type Conn: Send + 'static;

    /// Open a new connection
    async fn dial(&self) -> AppResult<Self::Conn>;

    /// Cheap round trip proving the connection still works
    async fn verify(&self, conn: &mut Self::Conn) -> AppResult<()>;

    /// Orderly shutdown of a connection that is no longer needed
    async fn hang_up(&self, conn: Self::Conn) {
        drop(conn);
    }
}

/// One shared connection, re-established on checkout after it breaks
///
/// A failed verification drops the connection and dials a fresh one. A
/// failed dial leaves the slot empty so the next checkout tries again.
pub struct ReconnectingSession<D: Dialer> {
    dialer: D,
    conn: Mutex<Option<D::Conn>>,
}

impl<D: Dialer> ReconnectingSession<D> {
    /// Session seeded with an already open connection
    pub fn new(dialer: D, conn: D::Conn) -> Self {
        Self {
            dialer,
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Exclusive access to a verified connection
    ///
    /// # Errors
    ///
    /// Returns the dial error when the connection is gone and cannot be
    /// re-established
    pub async fn checkout(&self) -> AppResult<MappedMutexGuard<'_, D::Conn>> {
        let mut slot = self.conn.lock().await;

        if let Some(conn) = slot.as_mut() {
            if let Err(e) = self.dialer.verify(conn).await {
                warn!(error = %e, "Session connection is broken, reconnecting");
                *slot = None;
            }
        }
        if slot.is_none() {
            *slot = Some(self.dialer.dial().await?);
            debug!("Session connection re-established");
        }

        MutexGuard::try_map(slot, Option::as_mut)
            .map_err(|_| AppError::database("Session connection missing after dial"))
    }

    /// Hang up the current connection, if any
    pub async fn close(&self) {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            self.dialer.hang_up(conn).await;
        }
    }

    /// Whether a connection is currently held
    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }
}
