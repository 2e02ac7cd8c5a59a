// ABOUTME: encrypt-password subcommand
// ABOUTME: Only needs the encryption key, not the metadata database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;

use tenant_db_manager::config::environment::ENCRYPTION_KEY_VAR;
use tenant_db_manager::crypto::CredentialCipher;
use tenant_db_manager::errors::{AppError, AppResult};
use zeroize::Zeroizing;

pub fn encrypt(password: &str) -> AppResult<()> {
    let key = env::var(ENCRYPTION_KEY_VAR)
        .map(Zeroizing::new)
        .map_err(|_| AppError::config(format!("{ENCRYPTION_KEY_VAR} must be set")))?;
    let cipher = CredentialCipher::new(key.as_bytes())?;

    println!("{}", cipher.encrypt(password)?);
    Ok(())
}
