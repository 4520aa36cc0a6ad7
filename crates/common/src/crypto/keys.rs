use std::fmt;
use std::str::FromStr;

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::encoding::{decode_tagged, encode_tagged, EncodingError, Sigil};

/// Size of an Ed25519 seed in bytes
pub const SEED_SIZE: usize = 32;
/// Size of an Ed25519 private key as stored (seed || public key)
pub const PRIVATE_KEY_SIZE: usize = 64;
/// Size of Ed25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;
/// The only curve identities are generated on
pub const CURVE: &str = "ed25519";

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("invalid key length, expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}

/// Public half of an identity keypair
///
/// Serves both as the verifying key for signatures and, after conversion
/// to X25519, as a box recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(VerifyingKey);

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(KeyError::InvalidKeyLength {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut buff = [0; PUBLIC_KEY_SIZE];
        buff.copy_from_slice(bytes);
        let key = VerifyingKey::from_bytes(&buff)
            .map_err(|_| anyhow::anyhow!("public key is not a valid edwards point"))?;
        Ok(PublicKey(key))
    }
}

impl AsRef<PublicKey> for PublicKey {
    fn as_ref(&self) -> &PublicKey {
        self
    }
}

impl PublicKey {
    /// Parse `<base64>.ed25519`, with or without a leading `@`
    pub fn from_tagged(tagged: &str) -> Result<Self, KeyError> {
        let decoded = decode_tagged(tagged)?;
        if decoded.tag != CURVE {
            return Err(KeyError::UnsupportedAlgorithm(decoded.tag));
        }
        Self::try_from(decoded.bytes.as_slice())
    }

    /// Convert public key to raw bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// `<base64>.ed25519`
    pub fn to_tagged(&self) -> String {
        encode_tagged(&self.to_bytes(), CURVE, None)
    }

    /// `@<base64>.ed25519`, the canonical reference to an identity
    pub fn to_id(&self) -> String {
        encode_tagged(&self.to_bytes(), CURVE, Some(Sigil::Feed))
    }

    /// Convert Ed25519 public key to X25519 (Montgomery curve) for ECDH
    ///
    /// # Errors
    ///
    /// Returns an error if the Ed25519 point cannot be converted (invalid point).
    #[allow(clippy::wrong_self_convention)]
    pub(crate) fn to_x25519(&self) -> Result<X25519PublicKey, KeyError> {
        let edwards_bytes = self.to_bytes();
        let edwards_point = CompressedEdwardsY::from_slice(&edwards_bytes)
            .map_err(|_| anyhow::anyhow!("public key invalid edwards point"))?
            .decompress()
            .ok_or_else(|| anyhow::anyhow!("public key failed to decompress edwards point"))?;

        let montgomery_point = edwards_point.to_montgomery();
        Ok(X25519PublicKey::from(montgomery_point.to_bytes()))
    }

    /// The X25519 form of this key, for use with any Curve25519 library
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a valid Edwards point.
    pub fn to_curve25519_bytes(&self) -> Result<[u8; PUBLIC_KEY_SIZE], KeyError> {
        Ok(self.to_x25519()?.to_bytes())
    }

    /// Verify an Ed25519 signature on a message.
    pub fn verify(
        &self,
        msg: &[u8],
        signature: &ed25519_dalek::Signature,
    ) -> Result<(), ed25519_dalek::SignatureError> {
        self.0.verify_strict(msg, signature)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tagged())
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tagged(s)
    }
}

/// Private half of an identity keypair
///
/// Stored and exchanged in the 64-byte `seed || public` layout, so the
/// public key can always be recovered from the private string alone.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(SigningKey);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&self.public()).finish()
    }
}

impl From<[u8; SEED_SIZE]> for SecretKey {
    fn from(seed: [u8; SEED_SIZE]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }
}

impl AsRef<SecretKey> for SecretKey {
    fn as_ref(&self) -> &SecretKey {
        self
    }
}

impl SecretKey {
    /// Generate a new random secret key using a cryptographically secure RNG
    pub fn generate() -> Self {
        let mut seed = [0u8; SEED_SIZE];
        getrandom::getrandom(&mut seed).expect("failed to generate random bytes");
        Self::from(seed)
    }

    /// Derive a keypair deterministically from a 32-byte seed
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        let seed: [u8; SEED_SIZE] = seed.try_into().map_err(|_| KeyError::InvalidKeyLength {
            expected: SEED_SIZE,
            actual: seed.len(),
        })?;
        Ok(Self::from(seed))
    }

    /// Parse the 64-byte `seed || public` layout, checking the halves agree
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; PRIVATE_KEY_SIZE] =
            bytes.try_into().map_err(|_| KeyError::InvalidKeyLength {
                expected: PRIVATE_KEY_SIZE,
                actual: bytes.len(),
            })?;
        let key = SigningKey::from_keypair_bytes(&bytes)
            .map_err(|_| anyhow::anyhow!("private key does not match its public half"))?;
        Ok(Self(key))
    }

    /// Parse `<base64>.ed25519` holding the 64-byte keypair layout
    pub fn from_tagged(tagged: &str) -> Result<Self, KeyError> {
        let decoded = decode_tagged(tagged)?;
        if decoded.tag != CURVE {
            return Err(KeyError::UnsupportedAlgorithm(decoded.tag));
        }
        Self::from_keypair_bytes(&decoded.bytes)
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// The `seed || public` bytes
    pub fn to_keypair_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.0.to_keypair_bytes()
    }

    /// `<base64(seed || public)>.ed25519`
    pub fn to_tagged(&self) -> String {
        encode_tagged(&self.to_keypair_bytes(), CURVE, None)
    }

    /// Convert Ed25519 secret key to X25519 (Montgomery curve) for ECDH
    ///
    /// The hashed scalar bytes of the Ed25519 key are used as the X25519 private key.
    pub(crate) fn to_x25519(&self) -> StaticSecret {
        StaticSecret::from(self.to_curve25519_bytes())
    }

    /// The X25519 private key: the clamped low half of `SHA-512(seed)`
    pub fn to_curve25519_bytes(&self) -> [u8; 32] {
        let mut scalar = self.0.to_scalar_bytes();
        scalar[0] &= 248;
        scalar[31] &= 127;
        scalar[31] |= 64;
        scalar
    }

    /// Sign a message with this secret key using Ed25519.
    pub fn sign(&self, msg: &[u8]) -> ed25519_dalek::Signature {
        self.0.sign(msg)
    }
}
