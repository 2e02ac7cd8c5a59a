// ABOUTME: Checks every metadata SELECT against the MySQL column types of the multi-tenant schema
// ABOUTME: Each result column must map onto an Any driver type or rows fail to convert at runtime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use sqlx::any::AnyTypeInfo;
use sqlx::mysql::{MySql, MySqlTypeInfo};
use sqlx::Type;

use super::connection_config::{
    DICTIONARY_MAPPING_QUERY, LEGACY_CONFIG_QUERY, TENANT_CONFIG_QUERY,
};
use super::db_connections::{CONNECTION_COLUMNS, DEFAULT_TARGET_QUERY};
use super::organizations::ORGANIZATION_COLUMNS;

fn mysql<T: Type<MySql>>() -> MySqlTypeInfo {
    <T as Type<MySql>>::type_info()
}

/// ENUM, JSON and TIMESTAMP columns; the Any driver only reads them cast to text
const CAST_ONLY: &[&str] = &["db_driver", "connection_options", "created_time", "modified_time"];

/// Declared MySQL type of a raw column in the metadata schema
fn declared_type(column: &str) -> Option<MySqlTypeInfo> {
    let info = match column {
        "id" | "organization_id" | "db_connection_id" | "dictionary_id" => mysql::<u32>(),
        "db_port" => mysql::<i32>(),
        "is_active" | "is_default" => mysql::<bool>(),
        "organization_code" | "organization_name" | "organization_type" | "country_code"
        | "contact_email" | "connection_name" | "db_host" | "db_name" | "db_user"
        | "db_charset" | "dictionary_name" | "host_name" | "schema_name"
        | "schema_user_name" => mysql::<String>(),
        "db_password_encrypted" | "schema_password" => mysql::<Vec<u8>>(),
        _ => return None,
    };
    Some(info)
}

fn select_list(sql: &str) -> &str {
    match (sql.find("SELECT"), sql.find("FROM")) {
        (Some(start), Some(end)) => &sql[start + "SELECT".len()..end],
        _ => sql,
    }
}

fn split_columns(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0_i32;
    let mut start = 0;
    for (index, ch) in list.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                items.push(list[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    items.push(list[start..].trim());
    items.retain(|item| !item.is_empty());
    items
}

/// Result type MySQL reports for one select item
fn result_type(item: &str) -> MySqlTypeInfo {
    if let Some(inner) = item.strip_prefix("CAST(") {
        let close = inner.find(')').unwrap();
        let target = inner[..close].rsplit(" AS ").next().unwrap().trim();
        return match target {
            "CHAR" => mysql::<String>(),
            "SIGNED" => mysql::<i64>(),
            other => panic!("unexpected cast target {other} in `{item}`"),
        };
    }
    let column = item.rsplit('.').next().unwrap();
    assert!(
        !CAST_ONLY.contains(&column),
        "`{column}` must be selected through CAST(.. AS CHAR)"
    );
    declared_type(column).unwrap_or_else(|| panic!("column `{column}` has no declared type"))
}

fn assert_any_compatible(name: &str, sql: &str) {
    for item in split_columns(select_list(sql)) {
        let info = result_type(item);
        assert!(
            AnyTypeInfo::try_from(&info).is_ok(),
            "{name}: `{item}` reads as {info:?}, which the Any driver cannot decode"
        );
    }
}

#[test]
fn test_boolean_columns_need_a_cast() {
    assert!(AnyTypeInfo::try_from(&mysql::<bool>()).is_err());
    assert!(AnyTypeInfo::try_from(&mysql::<i64>()).is_ok());
}

#[test]
fn test_metadata_selects_decode_through_any() {
    for (name, sql) in [
        ("connection columns", CONNECTION_COLUMNS),
        ("organization columns", ORGANIZATION_COLUMNS),
        ("tenant config", TENANT_CONFIG_QUERY),
        ("legacy config", LEGACY_CONFIG_QUERY),
        ("dictionary mapping", DICTIONARY_MAPPING_QUERY),
        ("default target", DEFAULT_TARGET_QUERY),
    ] {
        assert_any_compatible(name, sql);
    }
}

#[test]
fn test_raw_boolean_select_is_caught() {
    let info = result_type("conn.is_default");
    assert!(AnyTypeInfo::try_from(&info).is_err());

    let cast = result_type("CAST(conn.is_default AS SIGNED) AS is_default");
    assert!(AnyTypeInfo::try_from(&cast).is_ok());
}

#[test]
#[should_panic(expected = "must be selected through CAST")]
fn test_raw_timestamp_select_is_rejected() {
    result_type("created_time");
}
