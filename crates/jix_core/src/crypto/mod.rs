//! Key material manager.
//!
//! # Responsibility
//! - Generate, import and export RSA-OAEP and ECDH P-256 key pairs.
//! - Derive AES-256-GCM shared ciphers from ECDH key agreement.
//! - Package exported keys as downloadable key files.
//!
//! # Invariants
//! - Only standard primitives from the RustCrypto crates are orchestrated here.
//! - Public keys travel as SPKI DER, private keys as PKCS#8 DER.
//! - Derived shared secrets never leave a [`SharedCipher`].
//! - Every failure is a [`CryptoError`], never a panic.

mod ecdh;
mod error;
mod key_file;
mod rsa_keys;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub use ecdh::{
    import_ecdh_public_key, EcdhKeyPair, EcdhPublicKey, Sealed, SharedCipher, SHARED_KEY_LEN,
};
pub use error::{CryptoError, CryptoResult};
pub use key_file::{key_downloader, KeyDownload, KEY_FILE_MIME};
pub use rsa_keys::{
    export_key, import_rsa_key, import_rsa_pair, RsaKey, RsaKeyPair, RSA_MODULUS_BITS,
    RSA_PUBLIC_EXPONENT,
};

/// AES-GCM initialization vector length in bytes.
pub const IV_LEN: usize = 12;

/// Which half of an asymmetric key pair an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// SPKI-encoded public half.
    Public,
    /// PKCS#8-encoded private half.
    Private,
}

impl Display for KeyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// Key pairs that can serialize either half to its standard binary format.
pub trait ExportKey {
    fn export(&self, which: KeyKind) -> CryptoResult<Vec<u8>>;
}

/// Returns 12 fresh bytes from the operating system RNG.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}
