//! String and byte encodings shared by every other module
//!
//! - **Tagged strings**: `<sigil?><base64>.<tag>` identifiers for keys, hashes,
//!   signatures and boxed messages
//! - **Canonical JSON**: the byte-exact serialization that gets hashed and signed

mod canonical;
mod tagged;

pub use canonical::{canonicalize, to_canonical_string};
pub use tagged::{decode_tagged, decode_with_suffix, encode_tagged, get_tag, Sigil, Tagged};

/// Errors that can occur while encoding or decoding
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),
    #[error("canonical serialization failed: {0}")]
    Canonical(#[from] serde_json::Error),
}
