//! Cryptographic primitives every higher-level operation delegates to
//!
//! - **Identity & signatures**: Ed25519 keypairs (`SecretKey`/`PublicKey`)
//! - **Encryption**: XChaCha20-Poly1305 under a 256-bit `Secret`
//! - **Key agreement**: X25519 ECDH on the Montgomery form of the identity keys
//! - **Keyed hashing**: HMAC-SHA-512-256 under an `AuthKey`
//! - **Hashing**: SHA-256
//!
//! # Key Agreement
//!
//! Identities only carry Ed25519 keys. To encrypt to an identity, both sides
//! convert their keys to X25519 (Edwards to Montgomery) and perform ECDH;
//! the shared point is used directly as a `Secret`.

mod auth;
mod keys;
mod secret;

pub use auth::{AuthKey, AuthKeyError, AUTH_KEY_SIZE, AUTH_TAG_SIZE};
pub use ed25519_dalek::{Signature, SIGNATURE_LENGTH};
pub use keys::{KeyError, PublicKey, SecretKey, CURVE, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, SEED_SIZE};
pub use secret::{generate_nonce, Secret, SecretError, NONCE_SIZE, SECRET_SIZE, TAG_SIZE};

use sha2::{Digest, Sha256};

/// Size of a SHA-256 digest in bytes
pub const SHA256_SIZE: usize = 32;

/// SHA-256 of `data`
pub fn sha256(data: &[u8]) -> [u8; SHA256_SIZE] {
    Sha256::digest(data).into()
}
