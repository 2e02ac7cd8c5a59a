// ABOUTME: Tests for the fingerprint-keyed connection pool using a counting fake connector
// ABOUTME: Verifies dedupe, single connect under concurrency, failure handling and reset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{init_test_logging, test_cipher, FakeConnector};
use futures_util::future::join_all;
use tenant_db_manager::connection_pool::{fingerprint, ConnectionPool};
use tenant_db_manager::errors::ErrorCode;
use tenant_db_manager::models::{ConnectionConfig, StoredSecret};

fn encrypted_config(driver: &str, host: &str, user: &str) -> ConnectionConfig {
    let blob = test_cipher().encrypt("s3cret").unwrap();
    ConnectionConfig::adhoc(
        driver,
        host,
        Some(5432),
        "census",
        user,
        StoredSecret::encrypted_text(&blob),
    )
}

fn pool(connector: &FakeConnector) -> ConnectionPool<FakeConnector> {
    init_test_logging();
    ConnectionPool::new(Arc::new(connector.clone()), test_cipher())
}

#[tokio::test]
async fn test_miss_decrypts_builds_dsn_and_opens() {
    let connector = FakeConnector::default();
    let pool = pool(&connector);

    let handle = pool
        .get_or_create(&encrypted_config("pdo_pgsql", "pg.local", "census_app"))
        .await
        .unwrap();

    assert_eq!(connector.opens(), 1);
    assert_eq!(handle.password, "s3cret");
    assert_eq!(handle.user, "census_app");
    assert_eq!(handle.dsn, "postgres://pg.local:5432/census");
}

#[tokio::test]
async fn test_hit_returns_same_handle_without_reconnecting() {
    let connector = FakeConnector::default();
    let pool = pool(&connector);
    let config = encrypted_config("pdo_pgsql", "pg.local", "census_app");

    let first = pool.get_or_create(&config).await.unwrap();
    let second = pool.get_or_create(&config).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(connector.opens(), 1);
    assert_eq!(connector.pings(), 0);
}

#[tokio::test]
async fn test_configs_differing_only_in_charset_share_a_handle() {
    let connector = FakeConnector::default();
    let pool = pool(&connector);

    let mut utf8 = encrypted_config("pdo_mysql", "my.local", "census_app");
    utf8.charset = Some("utf8".to_owned());
    let mut latin1 = utf8.clone();
    latin1.charset = Some("latin1".to_owned());

    let first = pool.get_or_create(&utf8).await.unwrap();
    let second = pool.get_or_create(&latin1).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(second.dsn.ends_with("charset=utf8"));
    assert_eq!(connector.opens(), 1);
}

#[tokio::test]
async fn test_distinct_targets_get_distinct_handles() {
    let connector = FakeConnector::default();
    let pool = pool(&connector);

    let base = encrypted_config("pdo_pgsql", "pg.local", "census_app");
    let other_user = encrypted_config("pdo_pgsql", "pg.local", "report_app");
    let other_host = encrypted_config("pdo_pgsql", "pg.backup", "census_app");
    let mut other_port = base.clone();
    other_port.port = None;

    for config in [&base, &other_user, &other_host, &other_port] {
        pool.get_or_create(config).await.unwrap();
    }

    assert_eq!(connector.opens(), 4);
    assert_eq!(pool.stats().active_connections, 4);
}

#[test]
fn test_fingerprint_ignores_password_and_canonicalises_engine() {
    let a = ConnectionConfig::adhoc(
        "mysql",
        "my.local",
        None,
        "census",
        "u",
        StoredSecret::Plain("one".to_owned()),
    );
    let b = ConnectionConfig::adhoc(
        "pdo_mysql",
        "my.local",
        None,
        "census",
        "u",
        StoredSecret::Plain("two".to_owned()),
    );

    let fa = fingerprint(&a).unwrap();
    assert_eq!(fa, fingerprint(&b).unwrap());
    assert_eq!(fa.len(), 64);
    assert!(fa.chars().all(|c| c.is_ascii_hexdigit()));

    let mut c = b.clone();
    c.database = "survey".to_owned();
    assert_ne!(fa, fingerprint(&c).unwrap());
}

#[tokio::test]
async fn test_surrounding_whitespace_does_not_split_a_target() {
    let connector = FakeConnector::default();
    let pool = pool(&connector);

    let clean = encrypted_config("pdo_pgsql", "pg.ansd", "census_app");
    let mut padded = clean.clone();
    padded.host = " pg.ansd ".to_owned();
    padded.database = "census\t".to_owned();

    assert_eq!(fingerprint(&clean).unwrap(), fingerprint(&padded).unwrap());

    let first = pool.get_or_create(&clean).await.unwrap();
    let second = pool.get_or_create(&padded).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.dsn, "postgres://pg.ansd:5432/census");
    assert_eq!(connector.opens(), 1);
}

#[test]
fn test_fingerprint_rejects_unknown_engine() {
    let config = ConnectionConfig::adhoc("oracle", "h", None, "d", "u", StoredSecret::default());
    assert_eq!(
        fingerprint(&config).unwrap_err().code(),
        ErrorCode::UnsupportedEngine
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_open_once() {
    let connector = FakeConnector::default();
    connector.set_open_delay(Duration::from_millis(50));
    let pool = Arc::new(pool(&connector));
    let config = encrypted_config("pdo_pgsql", "pg.local", "census_app");

    let tasks = (0..16).map(|_| {
        let pool = Arc::clone(&pool);
        let config = config.clone();
        tokio::spawn(async move { pool.get_or_create(&config).await.unwrap() })
    });
    let handles: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(connector.opens(), 1);
    assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
}

#[tokio::test]
async fn test_failed_open_is_not_cached() {
    let connector = FakeConnector::default();
    connector.fail_host("pg.down");
    let pool = pool(&connector);
    let config = encrypted_config("pdo_pgsql", "pg.down", "census_app");

    let err = pool.get_or_create(&config).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConnectionOpenFailed);
    assert_eq!(pool.stats().active_connections, 0);

    connector.heal_host("pg.down");
    pool.get_or_create(&config).await.unwrap();
    assert_eq!(connector.opens(), 2);
    assert_eq!(pool.stats().active_connections, 1);
}

#[tokio::test]
async fn test_decryption_failure_never_reaches_connector() {
    let connector = FakeConnector::default();
    let pool = pool(&connector);
    let config = ConnectionConfig::adhoc(
        "pdo_pgsql",
        "pg.local",
        None,
        "census",
        "u",
        StoredSecret::encrypted_text("definitely-not-a-valid-blob"),
    );

    let err = pool.get_or_create(&config).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DecryptionFailed);
    assert_eq!(connector.opens(), 0);
}

#[tokio::test]
async fn test_stats_and_close_all() {
    let connector = FakeConnector::default();
    let pool = pool(&connector);
    let pg = encrypted_config("pdo_pgsql", "pg.local", "census_app");
    let my = encrypted_config("pdo_mysql", "my.local", "census_app");

    pool.get_or_create(&pg).await.unwrap();
    pool.get_or_create(&my).await.unwrap();

    let stats = pool.stats();
    assert_eq!(stats.active_connections, 2);
    let mut expected = vec![fingerprint(&pg).unwrap(), fingerprint(&my).unwrap()];
    expected.sort();
    assert_eq!(stats.connections, expected);

    assert_eq!(pool.close_all().await, 2);
    assert_eq!(connector.closes(), 2);
    assert_eq!(pool.stats().active_connections, 0);
    assert!(pool.stats().connections.is_empty());

    pool.get_or_create(&pg).await.unwrap();
    assert_eq!(connector.opens(), 3);
}
