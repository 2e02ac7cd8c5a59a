// ABOUTME: Driver-specific connection string construction for tenant targets
// ABOUTME: Renders sqlx URLs for MySQL/PostgreSQL and ADO strings for SQL Server, never with credentials
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Connection Strings
//!
//! | engine | shape |
//! |--------|-------|
//! | `pdo_mysql` | `mysql://host[:port]/db?charset=X[&k=v...]` |
//! | `pdo_pgsql` | `postgres://host[:port]/db[?k=v...]` |
//! | `sqlsrv` | `server=tcp:host[,port];database=db[;k=v...]` |
//!
//! Credentials are supplied to the driver separately and never appear here.
//! Extra options are emitted in key order so equal inputs give equal strings.

use serde_json::{Map, Value};
use tenant_db_core::{ConnectionConfig, DatabaseDriver, DEFAULT_CHARSET};

use crate::errors::{AppError, AppResult};

/// Build the connection string for an engine tag
///
/// `charset` only applies to MySQL, where it defaults to `utf8mb4`.
///
/// # Errors
///
/// Returns [`AppError::UnsupportedEngine`] for an unknown tag and
/// [`AppError::InvalidInput`] for an empty host/database or an option whose
/// value is not a scalar
pub fn build_dsn(
    driver_tag: &str,
    host: &str,
    port: Option<u16>,
    database: &str,
    charset: Option<&str>,
    options: Option<&Map<String, Value>>,
) -> AppResult<String> {
    let driver: DatabaseDriver = driver_tag.parse()?;
    build_for_driver(driver, host, port, database, charset, options)
}

/// Build the connection string for a resolved config
///
/// # Errors
///
/// Same as [`build_dsn`]
pub fn build_for_config(config: &ConnectionConfig) -> AppResult<(DatabaseDriver, String)> {
    let driver: DatabaseDriver = config.driver.parse()?;
    let dsn = build_for_driver(
        driver,
        &config.host,
        config.port,
        &config.database,
        config.charset.as_deref(),
        config.options.as_ref(),
    )?;
    Ok((driver, dsn))
}

fn build_for_driver(
    driver: DatabaseDriver,
    host: &str,
    port: Option<u16>,
    database: &str,
    charset: Option<&str>,
    options: Option<&Map<String, Value>>,
) -> AppResult<String> {
    let host = host.trim();
    let database = database.trim();
    if host.is_empty() {
        return Err(AppError::invalid_input("Database host must not be empty"));
    }
    if database.is_empty() {
        return Err(AppError::invalid_input("Database name must not be empty"));
    }
    let extras = sorted_options(options)?;

    match driver {
        DatabaseDriver::MySql => {
            let charset = charset
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CHARSET);
            let mut dsn = format!(
                "mysql://{}/{}?charset={}",
                authority(host, port),
                urlencoding::encode(database),
                urlencoding::encode(charset)
            );
            for (key, value) in extras.iter().filter(|(k, _)| k != "charset") {
                push_query_pair(&mut dsn, '&', key, value);
            }
            Ok(dsn)
        }
        DatabaseDriver::PostgreSql => {
            let mut dsn = format!(
                "postgres://{}/{}",
                authority(host, port),
                urlencoding::encode(database)
            );
            for (index, (key, value)) in extras.iter().enumerate() {
                push_query_pair(&mut dsn, if index == 0 { '?' } else { '&' }, key, value);
            }
            Ok(dsn)
        }
        DatabaseDriver::SqlServer => {
            for part in [host, database] {
                ado_safe(part)?;
            }
            let server = port.map_or_else(|| host.to_owned(), |port| format!("{host},{port}"));
            let mut dsn = format!("server=tcp:{server};database={database}");
            for (key, value) in &extras {
                ado_safe(key)?;
                ado_safe(value)?;
                dsn.push(';');
                dsn.push_str(key);
                dsn.push('=');
                dsn.push_str(value);
            }
            Ok(dsn)
        }
    }
}

fn authority(host: &str, port: Option<u16>) -> String {
    port.map_or_else(|| host.to_owned(), |port| format!("{host}:{port}"))
}

fn push_query_pair(dsn: &mut String, separator: char, key: &str, value: &str) {
    dsn.push(separator);
    dsn.push_str(&urlencoding::encode(key));
    dsn.push('=');
    dsn.push_str(&urlencoding::encode(value));
}

fn sorted_options(options: Option<&Map<String, Value>>) -> AppResult<Vec<(String, String)>> {
    let Some(options) = options else {
        return Ok(Vec::new());
    };

    let mut pairs = options
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(AppError::invalid_input(format!(
                        "Connection option '{key}' must be a string, number or boolean"
                    )));
                }
            };
            Ok((key.clone(), rendered))
        })
        .collect::<AppResult<Vec<_>>>()?;
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs)
}

/// ADO connection strings have no escaping we rely on
fn ado_safe(part: &str) -> AppResult<()> {
    if part.contains(';') || part.contains('=') {
        return Err(AppError::invalid_input(format!(
            "'{part}' cannot be used in a SQL Server connection string"
        )));
    }
    Ok(())
}
