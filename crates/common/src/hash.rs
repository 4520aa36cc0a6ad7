use serde::Serialize;

use crate::crypto::sha256;
use crate::encoding::{canonicalize, encode_tagged, EncodingError, Sigil};

pub const HASH_TAG: &str = "sha256";

/// `<base64(sha256(input))>.sha256`
pub fn hash(input: impl AsRef<[u8]>) -> String {
    encode_tagged(&sha256(input.as_ref()), HASH_TAG, None)
}

/// `%<base64(sha256(canonical(message)))>.sha256`, the id a message is referenced by
pub fn message_id<T: Serialize + ?Sized>(message: &T) -> Result<String, EncodingError> {
    let bytes = canonicalize(message)?;
    Ok(encode_tagged(&sha256(&bytes), HASH_TAG, Some(Sigil::Message)))
}
