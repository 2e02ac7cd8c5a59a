// ABOUTME: Shared test utilities for the tenant connection manager integration tests
// ABOUTME: Temp SQLite metadata database with the production tables, seeding helpers and a counting fake connector
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `tenant_db_manager`

use std::collections::HashSet;
use std::env;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::Row;
use tempfile::TempDir;
use tenant_db_manager::crypto::CredentialCipher;
use tenant_db_manager::database::repositories::ConnectionConfigRepositoryImpl;
use tenant_db_manager::database::MetadataDatabase;
use tenant_db_manager::database_plugins::{ConnectTarget, Connector};
use tenant_db_manager::errors::{AppError, AppResult};
use tenant_db_manager::models::DatabaseDriver;
use tenant_db_manager::tenant::DatabaseConnectionManager;

static INIT_LOGGER: Once = Once::new();

/// 32-byte key used by every test cipher
pub const TEST_KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

/// Initialize quiet test logging (`TEST_LOG=DEBUG` for more)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

pub fn test_cipher() -> CredentialCipher {
    CredentialCipher::new(TEST_KEY).expect("test key is valid")
}

const SCHEMA: [&str; 4] = [
    r"
    CREATE TABLE cspro_organizations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        organization_code TEXT NOT NULL UNIQUE,
        organization_name TEXT NOT NULL,
        organization_type TEXT DEFAULT 'statistics_office',
        country_code TEXT,
        contact_email TEXT,
        is_active BOOLEAN NOT NULL DEFAULT 1,
        created_time TEXT DEFAULT CURRENT_TIMESTAMP,
        modified_time TEXT DEFAULT CURRENT_TIMESTAMP
    )
    ",
    r"
    CREATE TABLE cspro_organization_db_connections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        organization_id INTEGER NOT NULL REFERENCES cspro_organizations(id) ON DELETE CASCADE,
        connection_name TEXT NOT NULL,
        db_driver TEXT NOT NULL,
        db_host TEXT NOT NULL,
        db_port INTEGER,
        db_name TEXT NOT NULL,
        db_user TEXT NOT NULL,
        db_password_encrypted BLOB,
        db_charset TEXT DEFAULT 'utf8mb4',
        connection_options TEXT,
        is_default BOOLEAN NOT NULL DEFAULT 0,
        is_active BOOLEAN NOT NULL DEFAULT 1,
        created_time TEXT DEFAULT CURRENT_TIMESTAMP,
        modified_time TEXT DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (organization_id, connection_name)
    )
    ",
    r"
    CREATE TABLE cspro_dictionaries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dictionary_name TEXT NOT NULL UNIQUE,
        organization_id INTEGER REFERENCES cspro_organizations(id),
        db_connection_id INTEGER REFERENCES cspro_organization_db_connections(id)
    )
    ",
    r"
    CREATE TABLE cspro_dictionaries_schema (
        dictionary_id INTEGER PRIMARY KEY REFERENCES cspro_dictionaries(id),
        host_name TEXT NOT NULL,
        schema_name TEXT NOT NULL,
        schema_user_name TEXT NOT NULL,
        schema_password TEXT
    )
    ",
];

/// Metadata database in a temp directory that lives as long as this value
pub struct TestMetadata {
    pub db: MetadataDatabase,
    _dir: TempDir,
}

pub async fn create_test_metadata() -> TestMetadata {
    init_test_logging();
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("metadata.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let db = MetadataDatabase::connect(&url, 1)
        .await
        .expect("connect to sqlite metadata database");
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(db.pool())
            .await
            .expect("create metadata table");
    }

    TestMetadata { db, _dir: dir }
}

pub async fn seed_organization(db: &MetadataDatabase, code: &str, name: &str) -> i64 {
    sqlx::query(
        "INSERT INTO cspro_organizations (organization_code, organization_name, country_code) \
         VALUES (?, ?, 'SN')",
    )
    .bind(code)
    .bind(name)
    .execute(db.pool())
    .await
    .expect("insert organization");

    let row = sqlx::query("SELECT id FROM cspro_organizations WHERE organization_code = ?")
        .bind(code)
        .fetch_one(db.pool())
        .await
        .expect("read organization id");
    row.get::<i64, _>("id")
}

/// Connection row to insert; `password` is stored verbatim
pub struct ConnectionSeed<'a> {
    pub organization_id: i64,
    pub name: &'a str,
    pub driver: &'a str,
    pub host: &'a str,
    pub port: Option<i64>,
    pub database: &'a str,
    pub user: &'a str,
    pub password: String,
    pub charset: &'a str,
    pub options: Option<&'a str>,
    pub is_default: bool,
    pub is_active: bool,
}

impl<'a> ConnectionSeed<'a> {
    pub fn new(organization_id: i64, name: &'a str, driver: &'a str, host: &'a str) -> Self {
        Self {
            organization_id,
            name,
            driver,
            host,
            port: None,
            database: "census",
            user: "census_app",
            password: test_cipher().encrypt("s3cret").unwrap(),
            charset: "utf8mb4",
            options: None,
            is_default: false,
            is_active: true,
        }
    }

    pub const fn default_connection(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

pub async fn seed_connection(db: &MetadataDatabase, seed: ConnectionSeed<'_>) -> i64 {
    sqlx::query(
        r"
        INSERT INTO cspro_organization_db_connections
            (organization_id, connection_name, db_driver, db_host, db_port, db_name, db_user,
             db_password_encrypted, db_charset, connection_options, is_default, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(seed.organization_id)
    .bind(seed.name)
    .bind(seed.driver)
    .bind(seed.host)
    .bind(seed.port)
    .bind(seed.database)
    .bind(seed.user)
    .bind(seed.password.clone())
    .bind(seed.charset)
    .bind(seed.options)
    .bind(i64::from(seed.is_default))
    .bind(i64::from(seed.is_active))
    .execute(db.pool())
    .await
    .expect("insert connection");

    let row = sqlx::query(
        "SELECT id FROM cspro_organization_db_connections \
         WHERE organization_id = ? AND connection_name = ?",
    )
    .bind(seed.organization_id)
    .bind(seed.name)
    .fetch_one(db.pool())
    .await
    .expect("read connection id");
    row.get::<i64, _>("id")
}

pub async fn seed_dictionary(
    db: &MetadataDatabase,
    name: &str,
    organization_id: Option<i64>,
    connection_id: Option<i64>,
) -> i64 {
    sqlx::query(
        "INSERT INTO cspro_dictionaries (dictionary_name, organization_id, db_connection_id) \
         VALUES (?, ?, ?)",
    )
    .bind(name)
    .bind(organization_id)
    .bind(connection_id)
    .execute(db.pool())
    .await
    .expect("insert dictionary");

    let row = sqlx::query("SELECT id FROM cspro_dictionaries WHERE dictionary_name = ?")
        .bind(name)
        .fetch_one(db.pool())
        .await
        .expect("read dictionary id");
    row.get::<i64, _>("id")
}

pub async fn seed_legacy_schema(
    db: &MetadataDatabase,
    dictionary_id: i64,
    host: &str,
    schema: &str,
    user: &str,
    password: &str,
) {
    sqlx::query(
        "INSERT INTO cspro_dictionaries_schema \
         (dictionary_id, host_name, schema_name, schema_user_name, schema_password) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(dictionary_id)
    .bind(host)
    .bind(schema)
    .bind(user)
    .bind(password)
    .execute(db.pool())
    .await
    .expect("insert legacy schema row");
}

/// What a fake connect produced
#[derive(Debug)]
pub struct FakeHandle {
    pub serial: usize,
    pub driver: DatabaseDriver,
    pub dsn: String,
    pub label: String,
    pub user: String,
    pub password: String,
}

#[derive(Default)]
struct FakeState {
    opens: AtomicUsize,
    pings: AtomicUsize,
    closes: AtomicUsize,
    open_delay_ms: AtomicU64,
    fail_ping: AtomicBool,
    failing_hosts: Mutex<HashSet<String>>,
}

/// Connector that records calls instead of touching a network
#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<FakeState>,
}

impl FakeConnector {
    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.state.pings.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn set_open_delay(&self, delay: Duration) {
        self.state
            .open_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_host(&self, host: &str) {
        self.state
            .failing_hosts
            .lock()
            .unwrap()
            .insert(host.to_owned());
    }

    pub fn heal_host(&self, host: &str) {
        self.state.failing_hosts.lock().unwrap().remove(host);
    }

    pub fn fail_ping(&self, fail: bool) {
        self.state.fail_ping.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Handle = Arc<FakeHandle>;

    async fn open(&self, target: &ConnectTarget<'_>) -> AppResult<Arc<FakeHandle>> {
        let serial = self.state.opens.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = self.state.open_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let host = target
            .label
            .split(['/', ':'])
            .next()
            .unwrap_or_default()
            .to_owned();
        if self.state.failing_hosts.lock().unwrap().contains(&host) {
            return Err(AppError::connection_open(
                target.driver.display_name(),
                target.label,
                "connection refused",
            ));
        }

        Ok(Arc::new(FakeHandle {
            serial,
            driver: target.driver,
            dsn: target.dsn.to_owned(),
            label: target.label.to_owned(),
            user: target.user.to_owned(),
            password: target.password.to_owned(),
        }))
    }

    async fn ping(&self, handle: &Arc<FakeHandle>) -> AppResult<()> {
        self.state.pings.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_ping.load(Ordering::SeqCst) {
            return Err(AppError::connection_open(
                handle.driver.display_name(),
                handle.label.clone(),
                "server closed the connection",
            ));
        }
        Ok(())
    }

    async fn close(&self, _handle: Arc<FakeHandle>) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Manager over the test metadata database with a fake connector
pub fn create_test_manager(
    db: &MetadataDatabase,
    connector: FakeConnector,
    legacy_passwords_encrypted: bool,
) -> DatabaseConnectionManager<FakeConnector> {
    let repository = ConnectionConfigRepositoryImpl::new(db.clone(), legacy_passwords_encrypted);
    DatabaseConnectionManager::new(Arc::new(repository), test_cipher(), connector)
}
