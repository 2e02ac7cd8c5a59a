// ABOUTME: Structured logging setup built on tracing-subscriber
// ABOUTME: Reads RUST_LOG / LOG_LEVEL for filtering and LOG_FORMAT for output shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::errors::{AppError, AppResult};

/// Output shape of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Multi-line human readable output
    Pretty,
    /// Single-line human readable output
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" | "" => Ok(Self::Compact),
            other => Err(AppError::config(format!(
                "LOG_FORMAT must be json, pretty or compact, got '{other}'"
            ))),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string
    pub filter: String,
    /// Line format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` (falling back to `LOG_LEVEL`) and `LOG_FORMAT`
    ///
    /// # Errors
    ///
    /// Returns an error if `LOG_FORMAT` is not recognised
    pub fn from_env() -> AppResult<Self> {
        let filter = env::var("RUST_LOG")
            .or_else(|_| env::var("LOG_LEVEL"))
            .unwrap_or_else(|_| "info".to_owned());
        let format = env::var("LOG_FORMAT")
            .map_or(Ok(LogFormat::Compact), |raw| raw.parse())?;
        Ok(Self { filter, format })
    }
}

/// Install the global subscriber
///
/// Later calls are no-ops so tests and binaries can both call this.
///
/// # Errors
///
/// Returns an error if the filter directive does not parse
pub fn init(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| AppError::config(format!("Invalid log filter '{}': {e}", config.filter)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    // try_init fails only when a subscriber is already installed
    let _ = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    Ok(())
}

/// Install the global subscriber from environment variables
///
/// # Errors
///
/// Returns an error if the logging variables are invalid
pub fn init_from_env() -> AppResult<()> {
    init(&LoggingConfig::from_env()?)
}
