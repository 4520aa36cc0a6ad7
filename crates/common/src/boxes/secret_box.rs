use serde_json::Value;

use super::{decode_envelope, parse_plaintext, BoxError};
use crate::crypto::{Secret, SecretError, NONCE_SIZE, TAG_SIZE};
use crate::encoding::{canonicalize, encode_tagged};

pub const SECRET_BOX_TAG: &str = "secretbox";

fn to_secret(secret: &[u8]) -> Result<Secret, BoxError> {
    Secret::from_slice(secret).map_err(|e| match e {
        SecretError::InvalidKeyLength { expected, actual } => {
            BoxError::InvalidKeyLength { expected, actual }
        }
        other => anyhow::anyhow!(other).into(),
    })
}

/// Encrypt `plaintext` under a 32-byte shared secret.
///
/// Output is `base64(nonce || ciphertext || tag).secretbox` with a fresh
/// random nonce per call.
pub fn secret_box(plaintext: &Value, secret: &[u8]) -> Result<String, BoxError> {
    let secret = to_secret(secret)?;
    let body = canonicalize(plaintext)?;
    let sealed = secret
        .encrypt(&body)
        .map_err(|e| anyhow::anyhow!("failed to seal secret box: {}", e))?;
    Ok(encode_tagged(&sealed, SECRET_BOX_TAG, None))
}

/// Decrypt a box made by [`secret_box`].
///
/// `Ok(None)` if it does not authenticate under `secret`.
pub fn secret_unbox(boxed: &str, secret: &[u8]) -> Result<Option<Value>, BoxError> {
    let secret = to_secret(secret)?;
    let bytes = decode_envelope(boxed, SECRET_BOX_TAG)?;
    if bytes.len() < NONCE_SIZE + TAG_SIZE {
        return Err(BoxError::MalformedInput(format!(
            "secret box of {} bytes is too short",
            bytes.len()
        )));
    }
    match secret.decrypt(&bytes) {
        Ok(plaintext) => parse_plaintext(&plaintext).map(Some),
        Err(SecretError::DecryptionFailed) => Ok(None),
        Err(e) => Err(anyhow::anyhow!(e).into()),
    }
}
