//! Signing identities and their on-disk records
//!
//! An [`Identity`] is an Ed25519 keypair plus the `@<base64>.ed25519` id
//! derived from its public half. Identities are immutable; the store
//! functions in [`store`] persist and reload them.

mod keyfile;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::{KeyError, PublicKey, SecretKey, CURVE};

pub use keyfile::{parse_keyfile, render_keyfile, KeyRecord};
pub use store::{
    create, create_async, load, load_async, load_or_create, load_or_create_async, save,
    save_async, KEY_FILE_NAME,
};

/// Errors that can occur while generating, loading or storing identities
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("no identity found at {0}")]
    NotFound(std::path::PathBuf),
    #[error("corrupt identity record at {path}: {reason}")]
    CorruptRecord {
        path: std::path::PathBuf,
        reason: String,
    },
    #[error("refusing to overwrite existing identity at {0}")]
    AlreadyExists(std::path::PathBuf),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Curves an identity can be generated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Curve {
    #[default]
    Ed25519,
}

impl Curve {
    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::Ed25519 => CURVE,
        }
    }
}

impl FromStr for Curve {
    type Err = IdentityError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CURVE => Ok(Curve::Ed25519),
            other => Err(IdentityError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signing identity: keypair, curve and derived id
///
/// Serializes as the `{curve, public, private, id}` record used on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KeyRecord", into = "KeyRecord")]
pub struct Identity {
    curve: Curve,
    public: PublicKey,
    secret: SecretKey,
}

impl Identity {
    /// Generate an identity on `curve`.
    ///
    /// With a `seed` the keypair is derived deterministically from it,
    /// otherwise it comes from the OS RNG.
    ///
    /// # Errors
    ///
    /// - `UnsupportedAlgorithm` for any curve other than `ed25519`
    /// - `Key(InvalidKeyLength)` if the seed is not 32 bytes
    pub fn generate(curve: &str, seed: Option<&[u8]>) -> Result<Self, IdentityError> {
        let curve = curve.parse::<Curve>()?;
        let secret = match seed {
            Some(seed) => SecretKey::from_seed(seed)?,
            None => SecretKey::generate(),
        };
        Ok(Self {
            curve,
            public: secret.public(),
            secret,
        })
    }

    /// Generate a random ed25519 identity
    pub fn random() -> Self {
        Self::from_secret(SecretKey::generate())
    }

    pub fn from_secret(secret: SecretKey) -> Self {
        Self {
            curve: Curve::Ed25519,
            public: secret.public(),
            secret,
        }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn public(&self) -> PublicKey {
        self.public
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// `@<base64>.ed25519`
    pub fn id(&self) -> String {
        self.public().to_id()
    }

    /// `<base64>.ed25519` of the public key
    pub fn public_tagged(&self) -> String {
        self.public().to_tagged()
    }

    /// `<base64>.ed25519` of the 64-byte private key
    pub fn private_tagged(&self) -> String {
        self.secret.to_tagged()
    }

    /// X25519 agreement between this identity and `other`.
    ///
    /// Both sides derive the same 32 bytes, usable directly as a
    /// [`secret_box`](crate::boxes::secret_box) key.
    ///
    /// # Errors
    ///
    /// `Key` if `other` is not a valid Edwards point.
    pub fn shared_secret(&self, other: &PublicKey) -> Result<[u8; 32], IdentityError> {
        let theirs = other.to_x25519()?;
        Ok(*self.secret.to_x25519().diffie_hellman(&theirs).as_bytes())
    }
}

impl AsRef<SecretKey> for Identity {
    fn as_ref(&self) -> &SecretKey {
        &self.secret
    }
}

impl AsRef<PublicKey> for Identity {
    fn as_ref(&self) -> &PublicKey {
        &self.public
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::encoding::decode_tagged;

    #[test]
    fn test_id_matches_public_key() {
        let identity = Identity::random();
        let decoded = decode_tagged(&identity.id()).unwrap();
        assert_eq!(decoded.bytes, identity.public().to_bytes().to_vec());
        assert_eq!(decoded.tag, identity.curve().as_str());
        assert_eq!(identity.id(), format!("@{}", identity.public_tagged()));
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let seed = [0u8; 32];
        let a = Identity::generate("ed25519", Some(&seed[..])).unwrap();
        let b = Identity::generate("ed25519", Some(&seed[..])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id(), "@O2onvM62pC1io6jQKm8Nc2UyFXcd4kOmOsBIoYtZ2ik=.ed25519");
    }

    #[test]
    fn test_unsupported_curve_and_bad_seed() {
        assert!(matches!(
            Identity::generate("secp256k1", None),
            Err(IdentityError::UnsupportedAlgorithm(curve)) if curve == "secp256k1"
        ));
        assert!(matches!(
            Identity::generate("ed25519", Some(&[1u8; 31][..])),
            Err(IdentityError::Key(KeyError::InvalidKeyLength { .. }))
        ));
    }

    #[test]
    fn test_random_identities_differ() {
        assert_ne!(Identity::random(), Identity::random());
    }

    #[test]
    fn test_shared_secret_is_symmetric() {
        let alice = Identity::random();
        let bob = Identity::random();
        let carol = Identity::random();
        let ab = alice.shared_secret(&bob.public()).unwrap();
        assert_eq!(ab, bob.shared_secret(&alice.public()).unwrap());
        assert_ne!(ab, alice.shared_secret(&carol.public()).unwrap());
    }
}
