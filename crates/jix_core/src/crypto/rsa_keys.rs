//! RSA-OAEP key pairs for key transport and direct payload encryption.
//!
//! # Invariants
//! - Generated pairs use a 4096-bit modulus and public exponent 65537.
//! - OAEP always uses SHA-256 for both the label hash and MGF1.
//! - Import failures are reported as [`CryptoError::Import`] naming the half.

use super::{CryptoError, CryptoResult, ExportKey, KeyKind};
use log::info;
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::fmt::{Debug, Formatter};
use std::time::Instant;

pub const RSA_MODULUS_BITS: usize = 4096;
pub const RSA_PUBLIC_EXPONENT: u32 = 65537;

/// One imported RSA key half.
#[derive(Clone)]
pub enum RsaKey {
    Public(RsaPublicKey),
    Private(RsaPrivateKey),
}

impl RsaKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Public(_) => KeyKind::Public,
            Self::Private(_) => KeyKind::Private,
        }
    }
}

impl Debug for RsaKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsaKey::{}(..)", self.kind())
    }
}

/// RSA-OAEP key pair with encrypt/decrypt bound to its two halves.
#[derive(Clone)]
pub struct RsaKeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaKeyPair {
    /// Generates a fresh 4096-bit pair.
    ///
    /// CPU-bound; expect this to take a noticeable amount of time.
    pub fn generate() -> CryptoResult<Self> {
        Self::generate_with_bits(RSA_MODULUS_BITS)
    }

    pub(crate) fn generate_with_bits(bits: usize) -> CryptoResult<Self> {
        let started_at = Instant::now();
        let exponent = BigUint::from(u64::from(RSA_PUBLIC_EXPONENT));
        let private = RsaPrivateKey::new_with_exp(&mut OsRng, bits, &exponent)
            .map_err(|err| CryptoError::KeyGeneration(err.to_string()))?;
        let public = RsaPublicKey::from(&private);
        info!(
            "event=rsa_generate module=crypto status=ok bits={} duration_ms={}",
            bits,
            started_at.elapsed().as_millis()
        );
        Ok(Self { private, public })
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Encrypts `data` to the public half with RSA-OAEP/SHA-256.
    ///
    /// # Errors
    /// - [`CryptoError::Encryption`] when `data` exceeds the OAEP capacity
    ///   of the modulus.
    pub fn encrypt(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        self.public
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), data)
            .map_err(|err| CryptoError::Encryption(err.to_string()))
    }

    /// Decrypts an RSA-OAEP/SHA-256 ciphertext with the private half.
    pub fn decrypt(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        self.private
            .decrypt(Oaep::new::<Sha256>(), data)
            .map_err(|_| CryptoError::Decryption)
    }
}

impl ExportKey for RsaKeyPair {
    fn export(&self, which: KeyKind) -> CryptoResult<Vec<u8>> {
        match which {
            KeyKind::Public => self
                .public
                .to_public_key_der()
                .map(|doc| doc.into_vec())
                .map_err(|err| CryptoError::export(which, err)),
            KeyKind::Private => self
                .private
                .to_pkcs8_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|err| CryptoError::export(which, err)),
        }
    }
}

impl Debug for RsaKeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyPair").finish_non_exhaustive()
    }
}

/// Serializes one half of `pair`: SPKI for public, PKCS#8 for private.
pub fn export_key(pair: &impl ExportKey, which: KeyKind) -> CryptoResult<Vec<u8>> {
    pair.export(which)
}

/// Deserializes one RSA key half from its standard DER encoding.
///
/// # Errors
/// - [`CryptoError::Import`] when the bytes are malformed, truncated, or hold
///   a different key type/half than `which`.
pub fn import_rsa_key(which: KeyKind, bytes: &[u8]) -> CryptoResult<RsaKey> {
    match which {
        KeyKind::Public => RsaPublicKey::from_public_key_der(bytes)
            .map(RsaKey::Public)
            .map_err(|err| CryptoError::import(which, err)),
        KeyKind::Private => RsaPrivateKey::from_pkcs8_der(bytes)
            .map(RsaKey::Private)
            .map_err(|err| CryptoError::import(which, err)),
    }
}

/// Imports both halves of a pair, private half first.
///
/// Fails with the first half's error; the public half is not parsed when the
/// private half is rejected.
pub fn import_rsa_pair(private_bytes: &[u8], public_bytes: &[u8]) -> CryptoResult<RsaKeyPair> {
    let private = match import_rsa_key(KeyKind::Private, private_bytes)? {
        RsaKey::Private(key) => key,
        RsaKey::Public(_) => {
            return Err(CryptoError::import(KeyKind::Private, "unexpected public key"))
        }
    };
    let public = match import_rsa_key(KeyKind::Public, public_bytes)? {
        RsaKey::Public(key) => key,
        RsaKey::Private(_) => {
            return Err(CryptoError::import(KeyKind::Public, "unexpected private key"))
        }
    };
    Ok(RsaKeyPair { private, public })
}
