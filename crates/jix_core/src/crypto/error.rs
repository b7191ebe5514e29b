//! Cryptographic error taxonomy.
//!
//! # Invariants
//! - Every failure of a key or cipher operation maps to one variant here.
//! - No variant carries plaintext or key material.

use super::KeyKind;
use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Recoverable failure of one cryptographic operation.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key bytes are malformed or do not match the expected format/usage.
    #[error("failed to import {which} key: {reason}")]
    Import { which: KeyKind, reason: String },

    /// Authentication tag mismatch or corrupted ciphertext.
    #[error("decryption failed")]
    Decryption,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("failed to export {which} key: {reason}")]
    Export { which: KeyKind, reason: String },

    #[error("invalid length for {what}: expected {expected}, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl CryptoError {
    pub(crate) fn import(which: KeyKind, reason: impl ToString) -> Self {
        Self::Import {
            which,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn export(which: KeyKind, reason: impl ToString) -> Self {
        Self::Export {
            which,
            reason: reason.to_string(),
        }
    }
}
