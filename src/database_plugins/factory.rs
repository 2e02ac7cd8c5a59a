// ABOUTME: Production connector that opens MySQL and PostgreSQL through sqlx and SQL Server through tiberius
// ABOUTME: sqlx handles are pools sized by PhysicalPoolConfig; SQL Server is a self-healing session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::str::FromStr;
#[cfg(feature = "sqlserver")]
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tenant_db_core::DatabaseDriver;
#[cfg(feature = "sqlserver")]
use tokio::net::TcpStream;
#[cfg(feature = "sqlserver")]
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

#[cfg(feature = "sqlserver")]
use super::session::{Dialer, ReconnectingSession};
use super::{ConnectTarget, Connector};
use crate::config::PhysicalPoolConfig;
use crate::errors::{AppError, AppResult};

/// tiberius client over a tokio TCP stream
#[cfg(feature = "sqlserver")]
pub type SqlServerClient = tiberius::Client<Compat<TcpStream>>;

/// Open handle to a tenant database
#[derive(Clone)]
pub enum LiveConnection {
    /// sqlx MySQL pool
    MySql(MySqlPool),
    /// sqlx PostgreSQL pool
    Postgres(PgPool),
    /// tiberius client that redials after its session breaks
    #[cfg(feature = "sqlserver")]
    SqlServer(Arc<ReconnectingSession<SqlServerDialer>>),
}

impl LiveConnection {
    /// Engine behind this handle
    #[must_use]
    pub const fn driver(&self) -> DatabaseDriver {
        match self {
            Self::MySql(_) => DatabaseDriver::MySql,
            Self::Postgres(_) => DatabaseDriver::PostgreSql,
            #[cfg(feature = "sqlserver")]
            Self::SqlServer(_) => DatabaseDriver::SqlServer,
        }
    }
}

impl std::fmt::Debug for LiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LiveConnection({})", self.driver().display_name())
    }
}

/// Connector backed by real drivers
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxConnector {
    pool_config: PhysicalPoolConfig,
}

impl SqlxConnector {
    /// Create a connector with the given per-target pool sizing
    #[must_use]
    pub const fn new(pool_config: PhysicalPoolConfig) -> Self {
        Self { pool_config }
    }

    async fn open_mysql(&self, target: &ConnectTarget<'_>) -> AppResult<LiveConnection> {
        let options = MySqlConnectOptions::from_str(target.dsn)
            .map_err(|e| AppError::invalid_input(format!("Invalid MySQL DSN: {e}")))?
            .username(target.user)
            .password(target.password);

        let pool = MySqlPoolOptions::new()
            .max_connections(self.pool_config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| open_error(target, &e))?;
        Ok(LiveConnection::MySql(pool))
    }

    async fn open_postgres(&self, target: &ConnectTarget<'_>) -> AppResult<LiveConnection> {
        let options = PgConnectOptions::from_str(target.dsn)
            .map_err(|e| AppError::invalid_input(format!("Invalid PostgreSQL DSN: {e}")))?
            .username(target.user)
            .password(target.password);

        let pool = PgPoolOptions::new()
            .max_connections(self.pool_config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| open_error(target, &e))?;
        Ok(LiveConnection::Postgres(pool))
    }

    #[cfg(feature = "sqlserver")]
    async fn open_sqlserver(target: &ConnectTarget<'_>) -> AppResult<LiveConnection> {
        let dialer = SqlServerDialer::new(target)?;
        let client = dialer.dial().await?;
        Ok(LiveConnection::SqlServer(Arc::new(ReconnectingSession::new(
            dialer, client,
        ))))
    }
}

#[async_trait]
impl Connector for SqlxConnector {
    type Handle = LiveConnection;

    async fn open(&self, target: &ConnectTarget<'_>) -> AppResult<LiveConnection> {
        debug!(
            driver = target.driver.as_str(),
            target = target.label,
            "Opening physical connection"
        );
        let handle = match target.driver {
            DatabaseDriver::MySql => self.open_mysql(target).await?,
            DatabaseDriver::PostgreSql => self.open_postgres(target).await?,
            #[cfg(feature = "sqlserver")]
            DatabaseDriver::SqlServer => Self::open_sqlserver(target).await?,
            #[cfg(not(feature = "sqlserver"))]
            DatabaseDriver::SqlServer => {
                return Err(AppError::UnsupportedEngine(
                    "sqlsrv (built without the sqlserver feature)".to_owned(),
                ));
            }
        };
        info!(
            driver = target.driver.as_str(),
            target = target.label,
            "Physical connection established"
        );
        Ok(handle)
    }

    async fn ping(&self, handle: &LiveConnection) -> AppResult<()> {
        let driver = handle.driver().display_name();
        match handle {
            LiveConnection::MySql(pool) => {
                sqlx::query("SELECT 1")
                    .fetch_one(pool)
                    .await
                    .map_err(|e| AppError::connection_open(driver, "ping", e.to_string()))?;
            }
            LiveConnection::Postgres(pool) => {
                sqlx::query("SELECT 1")
                    .fetch_one(pool)
                    .await
                    .map_err(|e| AppError::connection_open(driver, "ping", e.to_string()))?;
            }
            #[cfg(feature = "sqlserver")]
            LiveConnection::SqlServer(session) => {
                session.checkout().await?;
            }
        }
        Ok(())
    }

    async fn close(&self, handle: LiveConnection) {
        match handle {
            LiveConnection::MySql(pool) => pool.close().await,
            LiveConnection::Postgres(pool) => pool.close().await,
            #[cfg(feature = "sqlserver")]
            LiveConnection::SqlServer(session) => session.close().await,
        }
    }
}

fn open_error(target: &ConnectTarget<'_>, err: &dyn std::fmt::Display) -> AppError {
    AppError::connection_open(target.driver.display_name(), target.label, err.to_string())
}

/// Dials SQL Server with the credentials resolved for one target
#[cfg(feature = "sqlserver")]
pub struct SqlServerDialer {
    config: tiberius::Config,
    label: String,
}

#[cfg(feature = "sqlserver")]
impl SqlServerDialer {
    fn new(target: &ConnectTarget<'_>) -> AppResult<Self> {
        use tiberius::{AuthMethod, Config};

        let mut config = Config::from_ado_string(target.dsn)
            .map_err(|e| AppError::invalid_input(format!("Invalid SQL Server DSN: {e}")))?;
        config.authentication(AuthMethod::sql_server(target.user, target.password));
        Ok(Self {
            config,
            label: target.label.to_owned(),
        })
    }

    fn error(&self, err: &dyn std::fmt::Display) -> AppError {
        AppError::connection_open(
            DatabaseDriver::SqlServer.display_name(),
            &self.label,
            err.to_string(),
        )
    }
}

#[cfg(feature = "sqlserver")]
#[async_trait]
impl Dialer for SqlServerDialer {
    type Conn = SqlServerClient;

    async fn dial(&self) -> AppResult<SqlServerClient> {
        let tcp = TcpStream::connect(self.config.get_addr())
            .await
            .map_err(|e| self.error(&e))?;
        tcp.set_nodelay(true).map_err(|e| self.error(&e))?;

        tiberius::Client::connect(self.config.clone(), tcp.compat_write())
            .await
            .map_err(|e| self.error(&e))
    }

    async fn verify(&self, conn: &mut SqlServerClient) -> AppResult<()> {
        conn.simple_query("SELECT 1")
            .await
            .map_err(|e| self.error(&e))?
            .into_row()
            .await
            .map_err(|e| self.error(&e))?;
        Ok(())
    }

    async fn hang_up(&self, conn: SqlServerClient) {
        if let Err(e) = conn.close().await {
            debug!(target = %self.label, error = %e, "SQL Server client close failed");
        }
    }
}
