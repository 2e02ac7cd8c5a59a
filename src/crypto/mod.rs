// ABOUTME: Cryptographic utilities for connection credentials
// ABOUTME: AES-256-CBC cipher compatible with previously stored password blobs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Symmetric encryption of stored connection passwords
pub mod credential_cipher;

pub use credential_cipher::{CredentialCipher, IV_LENGTH, KEY_LENGTH};
