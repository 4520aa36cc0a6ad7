//! Symmetric authenticated encryption using XChaCha20-Poly1305
//!
//! A `Secret` keys both box constructions: the shared-secret box uses the
//! caller's secret directly, the multi-recipient box generates one per
//! message and wraps it for every recipient.

use std::fmt;
use std::ops::Deref;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};

/// Size of XChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 24;
/// Size of XChaCha20-Poly1305 key in bytes (256 bits)
pub const SECRET_SIZE: usize = 32;
/// Size of the Poly1305 authentication tag appended to every ciphertext
pub const TAG_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("invalid key length, expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("decryption failed: authentication tag mismatch")]
    DecryptionFailed,
}

/// A 256-bit symmetric encryption key
///
/// [`Secret::seal`] and [`Secret::open`] take the nonce from the caller, for
/// constructions that share one nonce across several ciphertexts.
/// [`Secret::encrypt`] and [`Secret::decrypt`] manage a random nonce
/// themselves, using the format `nonce (24 bytes) || ciphertext || tag (16 bytes)`.
#[derive(PartialEq, Eq, Clone)]
pub struct Secret([u8; SECRET_SIZE]);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl Deref for Secret {
    type Target = [u8; SECRET_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(bytes)
    }
}

/// Fill a fresh nonce from the OS RNG
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    getrandom::getrandom(&mut nonce).expect("failed to generate random bytes");
    nonce
}

impl Secret {
    /// Generate a new random secret using a cryptographically secure RNG
    pub fn generate() -> Self {
        let mut buff = [0; SECRET_SIZE];
        getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
        Self(buff)
    }

    /// Create a secret from a byte slice
    ///
    /// # Errors
    ///
    /// Returns `InvalidKeyLength` if the slice is not exactly `SECRET_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, SecretError> {
        let buff: [u8; SECRET_SIZE] =
            data.try_into().map_err(|_| SecretError::InvalidKeyLength {
                expected: SECRET_SIZE,
                actual: data.len(),
            })?;
        Ok(buff.into())
    }

    /// Get a reference to the secret key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(self.bytes()))
    }

    /// Encrypt under an explicit nonce. Output is `ciphertext || tag`.
    pub fn seal(&self, nonce: &[u8; NONCE_SIZE], data: &[u8]) -> Result<Vec<u8>, SecretError> {
        self.cipher()
            .encrypt(XNonce::from_slice(nonce), data)
            .map_err(|_| anyhow::anyhow!("encrypt error").into())
    }

    /// Decrypt `ciphertext || tag` under an explicit nonce.
    ///
    /// # Errors
    ///
    /// Returns `DecryptionFailed` if the tag does not authenticate, which is
    /// also what a wrong key looks like.
    pub fn open(&self, nonce: &[u8; NONCE_SIZE], data: &[u8]) -> Result<Vec<u8>, SecretError> {
        self.cipher()
            .decrypt(XNonce::from_slice(nonce), data)
            .map_err(|_| SecretError::DecryptionFailed)
    }

    /// Encrypt data under a fresh random nonce
    ///
    /// The output format is: `nonce (24 bytes) || ciphertext || auth_tag (16 bytes)`.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        let nonce = generate_nonce();
        let ciphertext = self.seal(&nonce, data)?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt data produced by [`Secret::encrypt`]
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is too short to contain a nonce and tag
    /// - Authentication tag verification fails (`DecryptionFailed`)
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(anyhow::anyhow!("data too short for nonce and tag").into());
        }
        let (nonce, ciphertext) = data.split_at(NONCE_SIZE);
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(nonce);
        self.open(&nonce_bytes, ciphertext)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_secret_encrypt_decrypt() {
        let secret = Secret::generate();
        let data = b"hello world, this is a test message for encryption";

        let encrypted = secret.encrypt(data).unwrap();
        assert_eq!(encrypted.len(), NONCE_SIZE + data.len() + TAG_SIZE);
        let decrypted = secret.decrypt(&encrypted).unwrap();

        assert_eq!(data.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_secret_size_validation() {
        let too_short = [1u8; 16];
        let too_long = [1u8; 64];

        assert!(matches!(
            Secret::from_slice(&too_short),
            Err(SecretError::InvalidKeyLength { expected: 32, actual: 16 })
        ));
        assert!(Secret::from_slice(&too_long).is_err());

        let just_right = [1u8; SECRET_SIZE];
        assert!(Secret::from_slice(&just_right).is_ok());
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let secret = Secret::generate();
        let encrypted = secret.encrypt(b"for one key only").unwrap();
        let other = Secret::generate();
        assert!(matches!(
            other.decrypt(&encrypted),
            Err(SecretError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let secret = Secret::generate();
        let mut encrypted = secret.encrypt(b"test data for integrity check").unwrap();
        encrypted[NONCE_SIZE + 3] ^= 0xFF;
        assert!(matches!(
            secret.decrypt(&encrypted),
            Err(SecretError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_seal_open_with_shared_nonce() {
        let nonce = generate_nonce();
        let a = Secret::generate();
        let b = Secret::generate();
        let sealed_a = a.seal(&nonce, b"same nonce").unwrap();
        let sealed_b = b.seal(&nonce, b"same nonce").unwrap();
        assert_ne!(sealed_a, sealed_b);
        assert_eq!(a.open(&nonce, &sealed_a).unwrap(), b"same nonce");
        assert!(a.open(&nonce, &sealed_b).is_err());
    }

    #[test]
    fn test_empty_data_encryption() {
        let secret = Secret::generate();
        let encrypted = secret.encrypt(b"").unwrap();
        assert_eq!(secret.decrypt(&encrypted).unwrap(), Vec::<u8>::new());
        assert!(secret.decrypt(&encrypted[..NONCE_SIZE]).is_err());
    }
}
