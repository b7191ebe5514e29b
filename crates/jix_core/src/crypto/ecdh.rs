//! ECDH P-256 key agreement and AES-256-GCM shared ciphers.
//!
//! # Responsibility
//! - Generate/import/export P-256 pairs used only for key derivation.
//! - Turn one party's private key and a counterpart's public key into a
//!   [`SharedCipher`] for authenticated encryption.
//!
//! # Invariants
//! - The 32-byte ECDH x-coordinate is used directly as the AES-256 key and is
//!   zeroized when derivation returns.
//! - An IV is never reused implicitly: every encrypt without an explicit IV
//!   draws 12 fresh random bytes.
//! - Failed authentication yields [`CryptoError::Decryption`] and no bytes.

use super::{generate_iv, CryptoError, CryptoResult, ExportKey, KeyKind, IV_LEN};
use crate::codec::EncryptionHelper;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use log::debug;
use p256::ecdh::diffie_hellman;
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use p256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use std::fmt::{Debug, Formatter};

/// AES-256 key length derived from the shared secret.
pub const SHARED_KEY_LEN: usize = 32;

/// Counterpart public key, usable only as a derivation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdhPublicKey(PublicKey);

impl EcdhPublicKey {
    /// Serializes the key as SPKI DER.
    pub fn to_spki(&self) -> CryptoResult<Vec<u8>> {
        self.0
            .to_public_key_der()
            .map(|doc| doc.into_vec())
            .map_err(|err| CryptoError::export(KeyKind::Public, err))
    }
}

/// Imports a counterpart's SPKI-encoded P-256 public key.
pub fn import_ecdh_public_key(bytes: &[u8]) -> CryptoResult<EcdhPublicKey> {
    PublicKey::from_public_key_der(bytes)
        .map(EcdhPublicKey)
        .map_err(|err| CryptoError::import(KeyKind::Public, err))
}

/// P-256 key pair for deriving shared ciphers. Has no direct encrypt.
#[derive(Clone)]
pub struct EcdhKeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl EcdhKeyPair {
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Re-loads an exported pair, private half first.
    pub fn import(private_bytes: &[u8], public_bytes: &[u8]) -> CryptoResult<Self> {
        let secret = SecretKey::from_pkcs8_der(private_bytes)
            .map_err(|err| CryptoError::import(KeyKind::Private, err))?;
        let public = import_ecdh_public_key(public_bytes)?.0;
        Ok(Self { secret, public })
    }

    pub fn public_key(&self) -> EcdhPublicKey {
        EcdhPublicKey(self.public.clone())
    }

    /// Runs ECDH against `their_public` and keys an AES-256-GCM cipher with
    /// the result. The raw shared secret is dropped (and zeroized) before
    /// this returns.
    pub fn derive(&self, their_public: &EcdhPublicKey) -> CryptoResult<SharedCipher> {
        let shared = diffie_hellman(self.secret.to_nonzero_scalar(), their_public.0.as_affine());
        let raw = shared.raw_secret_bytes();
        let cipher =
            Aes256Gcm::new_from_slice(raw.as_slice()).map_err(|_| CryptoError::InvalidLength {
                what: "shared secret",
                expected: SHARED_KEY_LEN,
                actual: raw.len(),
            })?;
        debug!("event=ecdh_derive module=crypto status=ok");
        Ok(SharedCipher { cipher })
    }
}

impl ExportKey for EcdhKeyPair {
    fn export(&self, which: KeyKind) -> CryptoResult<Vec<u8>> {
        match which {
            KeyKind::Public => self.public_key().to_spki(),
            KeyKind::Private => self
                .secret
                .to_pkcs8_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|err| CryptoError::export(which, err)),
        }
    }
}

impl Debug for EcdhKeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdhKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// AES-GCM output: ciphertext (with appended tag) plus the IV it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
}

impl Sealed {
    /// Flattens into the `iv || ciphertext` envelope.
    pub fn to_envelope(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn from_envelope(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < IV_LEN {
            return Err(CryptoError::InvalidLength {
                what: "sealed envelope",
                expected: IV_LEN,
                actual: bytes.len(),
            });
        }
        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        let mut iv_bytes = [0u8; IV_LEN];
        iv_bytes.copy_from_slice(iv);
        Ok(Self {
            ciphertext: ciphertext.to_vec(),
            iv: iv_bytes,
        })
    }
}

/// Non-extractable AES-256-GCM key scoped to one ECDH key combination.
pub struct SharedCipher {
    cipher: Aes256Gcm,
}

impl SharedCipher {
    /// Encrypts UTF-8 text. Omitting `iv` draws a fresh random one.
    pub fn encrypt(&self, plaintext: &str, iv: Option<[u8; IV_LEN]>) -> CryptoResult<Sealed> {
        self.seal(plaintext.as_bytes(), iv)
    }

    /// Decrypts and authenticates text produced by [`Self::encrypt`].
    pub fn decrypt(&self, sealed: &Sealed) -> CryptoResult<String> {
        let bytes = self.open(sealed)?;
        String::from_utf8(bytes).map_err(|_| CryptoError::Decryption)
    }

    pub fn seal(&self, plaintext: &[u8], iv: Option<[u8; IV_LEN]>) -> CryptoResult<Sealed> {
        let iv = iv.unwrap_or_else(generate_iv);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|err| CryptoError::Encryption(err.to_string()))?;
        Ok(Sealed { ciphertext, iv })
    }

    pub fn open(&self, sealed: &Sealed) -> CryptoResult<Vec<u8>> {
        self.cipher
            .decrypt(Nonce::from_slice(&sealed.iv), sealed.ciphertext.as_slice())
            .map_err(|_| CryptoError::Decryption)
    }
}

impl Debug for SharedCipher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedCipher(..)")
    }
}

impl EncryptionHelper for SharedCipher {
    fn encrypt(&self, bytes: &[u8]) -> CryptoResult<Vec<u8>> {
        self.seal(bytes, None).map(|sealed| sealed.to_envelope())
    }

    fn decrypt(&self, bytes: &[u8]) -> CryptoResult<Vec<u8>> {
        let sealed = Sealed::from_envelope(bytes).map_err(|_| CryptoError::Decryption)?;
        self.open(&sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::{import_ecdh_public_key, EcdhKeyPair, Sealed};
    use crate::codec::EncryptionHelper;
    use crate::crypto::{CryptoError, ExportKey, KeyKind, IV_LEN};

    fn shared_pair() -> (super::SharedCipher, super::SharedCipher) {
        let alice = EcdhKeyPair::generate();
        let bob = EcdhKeyPair::generate();
        let alice_side = alice.derive(&bob.public_key()).unwrap();
        let bob_side = bob.derive(&alice.public_key()).unwrap();
        (alice_side, bob_side)
    }

    #[test]
    fn both_parties_derive_the_same_key() {
        let (alice, bob) = shared_pair();
        let sealed = alice.encrypt("meet at noon", None).unwrap();
        assert_eq!(bob.decrypt(&sealed).unwrap(), "meet at noon");
    }

    #[test]
    fn explicit_iv_is_used_verbatim() {
        let (alice, bob) = shared_pair();
        let iv = [7u8; IV_LEN];
        let first = alice.encrypt("x", Some(iv)).unwrap();
        let second = alice.encrypt("x", Some(iv)).unwrap();
        assert_eq!(first.iv, iv);
        assert_eq!(first, second);
        assert_eq!(bob.decrypt(&first).unwrap(), "x");
    }

    #[test]
    fn unrelated_key_cannot_decrypt() {
        let (alice, _) = shared_pair();
        let (mallory, _) = shared_pair();
        let sealed = alice.encrypt("secret", None).unwrap();
        assert!(matches!(
            mallory.decrypt(&sealed),
            Err(CryptoError::Decryption)
        ));
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let (alice, bob) = shared_pair();
        let sealed = alice.encrypt("hello", None).unwrap();

        for byte in 0..sealed.ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered.ciphertext[byte] ^= 1 << bit;
                assert!(matches!(bob.decrypt(&tampered), Err(CryptoError::Decryption)));
            }
        }
        for byte in 0..IV_LEN {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered.iv[byte] ^= 1 << bit;
                assert!(matches!(bob.decrypt(&tampered), Err(CryptoError::Decryption)));
            }
        }
    }

    #[test]
    fn helper_envelope_round_trips_and_rejects_short_blobs() {
        let (alice, bob) = shared_pair();
        let envelope = EncryptionHelper::encrypt(&alice, b"body").unwrap();
        assert_eq!(envelope.len(), IV_LEN + 4 + 16);
        assert_eq!(EncryptionHelper::decrypt(&bob, &envelope).unwrap(), b"body");
        assert!(matches!(
            EncryptionHelper::decrypt(&bob, &envelope[..IV_LEN - 1]),
            Err(CryptoError::Decryption)
        ));
    }

    #[test]
    fn envelope_parsing_splits_iv_prefix() {
        let sealed = Sealed::from_envelope(&[1u8; IV_LEN + 3]).unwrap();
        assert_eq!(sealed.iv, [1u8; IV_LEN]);
        assert_eq!(sealed.ciphertext.len(), 3);
        assert!(Sealed::from_envelope(&[0u8; 4]).is_err());
    }

    #[test]
    fn exported_pair_reimports_with_same_agreement() {
        let alice = EcdhKeyPair::generate();
        let bob = EcdhKeyPair::generate();
        let restored = EcdhKeyPair::import(
            &alice.export(KeyKind::Private).unwrap(),
            &alice.export(KeyKind::Public).unwrap(),
        )
        .unwrap();
        assert_eq!(restored.public_key(), alice.public_key());

        let sealed = restored
            .derive(&bob.public_key())
            .unwrap()
            .encrypt("ok", None)
            .unwrap();
        let opened = bob.derive(&alice.public_key()).unwrap().decrypt(&sealed);
        assert_eq!(opened.unwrap(), "ok");
    }

    #[test]
    fn garbage_public_key_is_an_import_error() {
        let err = import_ecdh_public_key(&[0x30, 0x03, 0x01, 0x02]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::Import {
                which: KeyKind::Public,
                ..
            }
        ));
    }

    #[test]
    fn spki_round_trip_preserves_public_key() {
        let pair = EcdhKeyPair::generate();
        let bytes = pair.public_key().to_spki().unwrap();
        assert_eq!(import_ecdh_public_key(&bytes).unwrap(), pair.public_key());
    }
}
