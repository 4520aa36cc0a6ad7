//! Authenticated encryption of JSON messages
//!
//! - **Multi-recipient box** (`.box`): a message encrypted once under a fresh
//!   message key, with that key wrapped for up to [`MAX_RECIPIENTS`] identities
//! - **Shared-secret box** (`.secretbox`): a message encrypted under a 32-byte
//!   secret both sides already hold
//!
//! Plaintexts are serialized canonically before encryption and parsed back
//! into JSON values on the way out.

mod private_box;
mod secret_box;

pub use private_box::{
    box_message, unbox, unbox_body, unbox_key, MessageKey, BOX_TAG, MAX_RECIPIENTS, SLOT_SIZE,
};
pub use secret_box::{secret_box, secret_unbox, SECRET_BOX_TAG};

use serde_json::Value;

use crate::crypto::KeyError;
use crate::encoding::{decode_with_suffix, get_tag, EncodingError};

/// Errors that can occur while boxing or unboxing
#[derive(Debug, thiserror::Error)]
pub enum BoxError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("invalid key length, expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("decryption failed: authentication tag mismatch")]
    DecryptionFailed,
    #[error("box error: {0}")]
    Default(#[from] anyhow::Error),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
}

/// Strip the `.<tag>` suffix off an envelope and decode its base64 body.
fn decode_envelope(boxed: &str, tag: &str) -> Result<Vec<u8>, BoxError> {
    let found = get_tag(boxed);
    if found != tag {
        return Err(BoxError::MalformedInput(format!(
            "expected a .{} envelope, found tag {:?}",
            tag, found
        )));
    }
    let (sigil, bytes) = decode_with_suffix(boxed, &format!(".{}", tag))
        .map_err(|e| BoxError::MalformedInput(e.to_string()))?;
    if sigil.is_some() {
        return Err(BoxError::MalformedInput("envelope carries a sigil".into()));
    }
    Ok(bytes)
}

/// Parse authenticated plaintext back into a message
fn parse_plaintext(plaintext: &[u8]) -> Result<Value, BoxError> {
    serde_json::from_slice(plaintext)
        .map_err(|e| BoxError::MalformedInput(format!("decrypted body is not JSON: {}", e)))
}
