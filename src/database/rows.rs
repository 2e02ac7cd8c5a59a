// ABOUTME: Column decoding helpers for rows read through the sqlx Any driver
// ABOUTME: Smooths over integer width, boolean and text/blob differences between MySQL and SQLite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::errors::{AppError, AppResult};

pub(super) fn int(row: &AnyRow, column: &str) -> AppResult<i64> {
    opt_int(row, column)?
        .ok_or_else(|| AppError::database(format!("Column {column} is unexpectedly NULL")))
}

pub(super) fn opt_int(row: &AnyRow, column: &str) -> AppResult<Option<i64>> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(column) {
        return Ok(value);
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(column) {
        return Ok(value.map(i64::from));
    }
    if let Ok(value) = row.try_get::<Option<i16>, _>(column) {
        return Ok(value.map(i64::from));
    }
    row.try_get::<Option<bool>, _>(column)
        .map(|value| value.map(i64::from))
        .map_err(|e| AppError::database(format!("Column {column} is not an integer: {e}")))
}

pub(super) fn flag(row: &AnyRow, column: &str) -> AppResult<bool> {
    Ok(opt_int(row, column)?.is_some_and(|value| value != 0))
}

pub(super) fn text(row: &AnyRow, column: &str) -> AppResult<String> {
    opt_text(row, column)?
        .ok_or_else(|| AppError::database(format!("Column {column} is unexpectedly NULL")))
}

pub(super) fn opt_text(row: &AnyRow, column: &str) -> AppResult<Option<String>> {
    if let Ok(value) = row.try_get::<Option<String>, _>(column) {
        return Ok(value);
    }
    row.try_get::<Option<Vec<u8>>, _>(column)
        .map_err(|e| AppError::database(format!("Column {column} is not text: {e}")))?
        .map(|bytes| {
            String::from_utf8(bytes)
                .map_err(|_| AppError::database(format!("Column {column} is not valid UTF-8")))
        })
        .transpose()
}

/// Binary-safe read of a column that may be declared as text or blob
pub(super) fn opt_bytes(row: &AnyRow, column: &str) -> AppResult<Option<Vec<u8>>> {
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(column) {
        return Ok(value);
    }
    row.try_get::<Option<String>, _>(column)
        .map(|value| value.map(String::into_bytes))
        .map_err(|e| AppError::database(format!("Column {column} is not binary: {e}")))
}

pub(super) fn port(row: &AnyRow, column: &str) -> AppResult<Option<u16>> {
    opt_int(row, column)?
        .map(|raw| {
            u16::try_from(raw)
                .map_err(|_| AppError::config(format!("Port {raw} is out of range")))
        })
        .transpose()
}

/// JSON object column; empty or `null` reads as absent
pub(super) fn json_object(row: &AnyRow, column: &str) -> AppResult<Option<Map<String, Value>>> {
    let Some(raw) = opt_text(row, column)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(Value::Null) => Ok(None),
        Ok(_) => Err(AppError::config(format!(
            "Column {column} must hold a JSON object"
        ))),
        Err(e) => Err(AppError::config(format!(
            "Column {column} holds invalid JSON: {e}"
        ))),
    }
}

/// Timestamps are selected as text; unparseable values read as absent
pub(super) fn timestamp(row: &AnyRow, column: &str) -> Option<DateTime<Utc>> {
    let raw = opt_text(row, column).ok().flatten()?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
