use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha512;

/// Size of an auth key in bytes
pub const AUTH_KEY_SIZE: usize = 32;
/// Size of an authentication tag in bytes
pub const AUTH_TAG_SIZE: usize = 32;

type HmacSha512 = Hmac<Sha512>;

/// Errors that can occur while building an auth key
#[derive(Debug, thiserror::Error)]
pub enum AuthKeyError {
    #[error("invalid auth key length, expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("auth key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Auxiliary key for keyed signing
///
/// Signatures made with an auth key cover `HMAC-SHA-512-256(key, message)`
/// instead of the message, so they only verify for holders of the same key.
/// Networks use this to keep signatures from being replayed across them.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey([u8; AUTH_KEY_SIZE]);

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(..)")
    }
}

impl From<[u8; AUTH_KEY_SIZE]> for AuthKey {
    fn from(bytes: [u8; AUTH_KEY_SIZE]) -> Self {
        AuthKey(bytes)
    }
}

impl AuthKey {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AuthKeyError> {
        let key: [u8; AUTH_KEY_SIZE] =
            bytes.try_into().map_err(|_| AuthKeyError::InvalidKeyLength {
                expected: AUTH_KEY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(key))
    }

    /// Parse plain base64, the way network keys are usually configured
    pub fn from_base64(encoded: &str) -> Result<Self, AuthKeyError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Self::from_slice(&bytes)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// HMAC-SHA-512 truncated to 32 bytes
    pub fn authenticate(&self, msg: &[u8]) -> [u8; AUTH_TAG_SIZE] {
        let mut mac = HmacSha512::new_from_slice(&self.0).expect("HMAC accepts keys of any size");
        mac.update(msg);
        let full = mac.finalize().into_bytes();
        let mut tag = [0u8; AUTH_TAG_SIZE];
        tag.copy_from_slice(&full[..AUTH_TAG_SIZE]);
        tag
    }
}
