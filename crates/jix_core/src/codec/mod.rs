//! Field codec between parsed records and raw at-rest records.
//!
//! # Responsibility
//! - Define the encryption helper capability consumed by the codec.
//! - Encode string fields to bytes (optionally encrypted) and back.
//! - Declare per entity which fields are stored as binary.
//!
//! # Invariants
//! - `decode_text(encode_text(s, h), h) == s` for every string and helper.
//! - An empty string encodes to an empty blob and an empty blob decodes to
//!   `""`; the helper is never invoked for either.
//! - Non-binary fields are copied through unchanged.

mod records;

use crate::crypto::{CryptoError, CryptoResult};
use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

/// Symmetric capability bound to one key; both directions are whole-buffer.
pub trait EncryptionHelper {
    fn encrypt(&self, bytes: &[u8]) -> CryptoResult<Vec<u8>>;
    fn decrypt(&self, bytes: &[u8]) -> CryptoResult<Vec<u8>>;
}

/// Helper selection passed explicitly into every codec call; `None` is
/// plaintext.
pub type Helper<'a> = Option<&'a dyn EncryptionHelper>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cannot transform field `{field}`: {source}")]
    Crypto {
        field: &'static str,
        #[source]
        source: CryptoError,
    },

    #[error("field `{field}` is not valid UTF-8 after decoding")]
    InvalidUtf8 { field: &'static str },

    #[error("field `{field}` holds invalid flag value {value}")]
    InvalidFlag { field: &'static str, value: i64 },

    #[error("record `{id}` is encrypted at rest and no encryption helper was provided")]
    MissingHelper { id: String },
}

/// Bidirectional mapping between a parsed record and its raw shape.
pub trait RecordCodec: Sized {
    type Raw;

    /// Fields stored as byte blobs (possibly encrypted).
    ///
    /// Implementations route exactly these names through
    /// [`encode_text`]/[`decode_text`] via `binary_field`.
    const BINARY_FIELDS: &'static [&'static str];

    fn encode(&self, helper: Helper<'_>) -> CodecResult<Self::Raw>;
    fn parse(raw: &Self::Raw, helper: Helper<'_>) -> CodecResult<Self>;
}

/// Encodes a parsed record into its raw shape.
pub fn encode<R: RecordCodec>(record: &R, helper: Helper<'_>) -> CodecResult<R::Raw> {
    record.encode(helper)
}

/// Decodes a raw record into its parsed shape.
pub fn parse<R: RecordCodec>(raw: &R::Raw, helper: Helper<'_>) -> CodecResult<R> {
    R::parse(raw, helper)
}

/// UTF-8 encodes `value`, then encrypts when a helper is present.
pub fn encode_text(field: &'static str, value: &str, helper: Helper<'_>) -> CodecResult<Vec<u8>> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    match helper {
        Some(helper) => helper
            .encrypt(value.as_bytes())
            .map_err(|source| CodecError::Crypto { field, source }),
        None => Ok(value.as_bytes().to_vec()),
    }
}

/// Decrypts `bytes` when a helper is present, then decodes UTF-8.
pub fn decode_text(field: &'static str, bytes: &[u8], helper: Helper<'_>) -> CodecResult<String> {
    if bytes.is_empty() {
        return Ok(String::new());
    }
    let plain = match helper {
        Some(helper) => helper
            .decrypt(bytes)
            .map_err(|source| CodecError::Crypto { field, source })?,
        None => bytes.to_vec(),
    };
    String::from_utf8(plain).map_err(|_| CodecError::InvalidUtf8 { field })
}

/// Picks the helper a record needs at rest.
///
/// Public records are plaintext and ignore any helper; non-public records
/// require one.
pub fn at_rest_helper<'a>(public: bool, helper: Helper<'a>, id: &str) -> CodecResult<Helper<'a>> {
    if public {
        return Ok(None);
    }
    match helper {
        Some(helper) => Ok(Some(helper)),
        None => Err(CodecError::MissingHelper { id: id.to_string() }),
    }
}

/// Names a binary field of `R`; debug builds reject undeclared names.
pub(crate) fn binary_field<R: RecordCodec>(field: &'static str) -> &'static str {
    debug_assert!(
        R::BINARY_FIELDS.contains(&field),
        "`{field}` is not a declared binary field"
    );
    field
}

pub(crate) fn flag_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn flag_from_int(field: &'static str, value: i64) -> CodecResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::InvalidFlag {
            field,
            value: other,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{at_rest_helper, decode_text, encode_text, CodecError, EncryptionHelper};
    use crate::crypto::{CryptoError, CryptoResult};
    use std::cell::Cell;

    /// Reverses bytes and counts calls.
    #[derive(Default)]
    struct CountingHelper {
        encrypts: Cell<usize>,
        decrypts: Cell<usize>,
    }

    impl EncryptionHelper for CountingHelper {
        fn encrypt(&self, bytes: &[u8]) -> CryptoResult<Vec<u8>> {
            self.encrypts.set(self.encrypts.get() + 1);
            Ok(bytes.iter().rev().copied().collect())
        }

        fn decrypt(&self, bytes: &[u8]) -> CryptoResult<Vec<u8>> {
            self.decrypts.set(self.decrypts.get() + 1);
            Ok(bytes.iter().rev().copied().collect())
        }
    }

    struct FailingHelper;

    impl EncryptionHelper for FailingHelper {
        fn encrypt(&self, _bytes: &[u8]) -> CryptoResult<Vec<u8>> {
            Err(CryptoError::Encryption("offline".to_string()))
        }

        fn decrypt(&self, _bytes: &[u8]) -> CryptoResult<Vec<u8>> {
            Err(CryptoError::Decryption)
        }
    }

    #[test]
    fn plaintext_round_trip_keeps_multibyte_text() {
        let text = "naïve café ✓ 日本";
        let bytes = encode_text("content", text, None).unwrap();
        assert_eq!(bytes, text.as_bytes());
        assert_eq!(decode_text("content", &bytes, None).unwrap(), text);
    }

    #[test]
    fn helper_is_applied_in_both_directions() {
        let helper = CountingHelper::default();
        let bytes = encode_text("name", "abc", Some(&helper)).unwrap();
        assert_eq!(bytes, b"cba");
        assert_eq!(decode_text("name", &bytes, Some(&helper)).unwrap(), "abc");
        assert_eq!(helper.encrypts.get(), 1);
        assert_eq!(helper.decrypts.get(), 1);
    }

    #[test]
    fn empty_text_never_reaches_the_helper() {
        let helper = CountingHelper::default();
        let bytes = encode_text("content", "", Some(&helper)).unwrap();
        assert!(bytes.is_empty());
        assert_eq!(decode_text("content", &bytes, Some(&helper)).unwrap(), "");
        assert_eq!(helper.encrypts.get(), 0);
        assert_eq!(helper.decrypts.get(), 0);
    }

    #[test]
    fn helper_failure_names_the_field() {
        let err = decode_text("content", b"xyz", Some(&FailingHelper)).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Crypto {
                field: "content",
                source: CryptoError::Decryption
            }
        ));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let err = decode_text("name", &[0xff, 0xfe], None).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8 { field: "name" }));
    }

    #[test]
    fn private_records_require_a_helper() {
        let helper = CountingHelper::default();
        assert!(at_rest_helper(true, Some(&helper), "a").unwrap().is_none());
        assert!(at_rest_helper(false, Some(&helper), "a").unwrap().is_some());
        assert!(matches!(
            at_rest_helper(false, None, "a"),
            Err(CodecError::MissingHelper { .. })
        ));
    }
}
