//! Signing and verifying canonical messages
//!
//! Messages are signed over their canonical bytes. With an auxiliary
//! [`AuthKey`] the signature covers `HMAC-SHA-512-256(aux, bytes)` instead,
//! so it only verifies for holders of the same key.
//!
//! Signatures are rendered as `<base64>.sig.ed25519`.

use serde_json::{Map, Value};

use crate::crypto::{AuthKey, PublicKey, SecretKey, Signature, AUTH_TAG_SIZE, SIGNATURE_LENGTH};
use crate::encoding::{canonicalize, decode_with_suffix, encode_tagged, EncodingError};

/// Suffix of every signature string
pub const SIGNATURE_SUFFIX: &str = ".sig.ed25519";
/// Field a signed object carries its signature in
pub const SIGNATURE_FIELD: &str = "signature";

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// What the ed25519 signature is actually computed over
enum SigningInput<'a> {
    Raw(&'a [u8]),
    Keyed([u8; AUTH_TAG_SIZE]),
}

impl<'a> SigningInput<'a> {
    fn new(bytes: &'a [u8], aux: Option<&AuthKey>) -> Self {
        match aux {
            None => SigningInput::Raw(bytes),
            Some(aux) => SigningInput::Keyed(aux.authenticate(bytes)),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            SigningInput::Raw(bytes) => bytes,
            SigningInput::Keyed(tag) => tag,
        }
    }
}

pub fn encode_signature(signature: &Signature) -> String {
    encode_tagged(&signature.to_bytes(), &SIGNATURE_SUFFIX[1..], None)
}

/// Parse `<base64>.sig.ed25519` into a signature
///
/// # Errors
///
/// `MalformedInput` if the suffix is missing, the body is not base64 or it
/// does not decode to 64 bytes.
pub fn decode_signature(encoded: &str) -> Result<Signature, SignError> {
    let (sigil, bytes) = decode_with_suffix(encoded, SIGNATURE_SUFFIX)
        .map_err(|e| SignError::MalformedInput(e.to_string()))?;
    if sigil.is_some() {
        return Err(SignError::MalformedInput(format!(
            "signature {:?} carries a sigil",
            encoded
        )));
    }
    let bytes: [u8; SIGNATURE_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
        SignError::MalformedInput(format!(
            "signature must be {} bytes, got {}",
            SIGNATURE_LENGTH,
            bytes.len()
        ))
    })?;
    Ok(Signature::from_bytes(&bytes))
}

/// Sign raw bytes
pub fn sign_bytes(key: impl AsRef<SecretKey>, bytes: &[u8], aux: Option<&AuthKey>) -> String {
    let input = SigningInput::new(bytes, aux);
    encode_signature(&key.as_ref().sign(input.as_bytes()))
}

/// Verify a signature over raw bytes.
///
/// A well-formed signature that does not match yields `Ok(false)`.
pub fn verify_bytes(
    key: impl AsRef<PublicKey>,
    signature: &str,
    bytes: &[u8],
    aux: Option<&AuthKey>,
) -> Result<bool, SignError> {
    let signature = decode_signature(signature)?;
    let input = SigningInput::new(bytes, aux);
    Ok(key.as_ref().verify(input.as_bytes(), &signature).is_ok())
}

/// Sign the canonical form of `message`
pub fn sign(
    key: impl AsRef<SecretKey>,
    message: &Value,
    aux: Option<&AuthKey>,
) -> Result<String, SignError> {
    let bytes = canonicalize(message)?;
    Ok(sign_bytes(key, &bytes, aux))
}

/// Verify `signature` against the canonical form of `message`
pub fn verify(
    key: impl AsRef<PublicKey>,
    signature: &str,
    message: &Value,
    aux: Option<&AuthKey>,
) -> Result<bool, SignError> {
    let bytes = canonicalize(message)?;
    verify_bytes(key, signature, &bytes, aux)
}

/// Return a copy of `message` with a `signature` field appended.
///
/// # Errors
///
/// `MalformedInput` if `message` is not an object or is already signed.
pub fn sign_object(
    key: impl AsRef<SecretKey>,
    aux: Option<&AuthKey>,
    message: &Value,
) -> Result<Value, SignError> {
    let object = message
        .as_object()
        .ok_or_else(|| SignError::MalformedInput("only objects can be signed".into()))?;
    if object.contains_key(SIGNATURE_FIELD) {
        return Err(SignError::MalformedInput(
            "object already has a signature field".into(),
        ));
    }
    let signature = sign(key, message, aux)?;
    let mut signed = object.clone();
    signed.insert(SIGNATURE_FIELD.to_string(), Value::String(signature));
    Ok(Value::Object(signed))
}

/// Verify an object produced by [`sign_object`].
///
/// The signature is checked against the object with its `signature` field
/// removed and the remaining fields in their original order.
pub fn verify_object(
    key: impl AsRef<PublicKey>,
    signed: &Value,
    aux: Option<&AuthKey>,
) -> Result<bool, SignError> {
    let object = signed
        .as_object()
        .ok_or_else(|| SignError::MalformedInput("signed message is not an object".into()))?;
    let signature = match object.get(SIGNATURE_FIELD) {
        Some(Value::String(signature)) => signature,
        Some(_) => {
            return Err(SignError::MalformedInput(
                "signature field is not a string".into(),
            ))
        }
        None => return Err(SignError::MalformedInput("no signature field".into())),
    };
    let unsigned: Map<String, Value> = object
        .iter()
        .filter(|(k, _)| k.as_str() != SIGNATURE_FIELD)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    verify(key, signature, &Value::Object(unsigned), aux)
}
