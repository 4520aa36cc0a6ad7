use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::EncodingError;

/// Leading character marking what kind of thing a tagged string refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sigil {
    /// `@`, an identity (feed) public key
    Feed,
    /// `%`, a message hash
    Message,
    /// `&`, a blob hash
    Blob,
}

impl Sigil {
    pub fn as_char(&self) -> char {
        match self {
            Sigil::Feed => '@',
            Sigil::Message => '%',
            Sigil::Blob => '&',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '@' => Some(Sigil::Feed),
            '%' => Some(Sigil::Message),
            '&' => Some(Sigil::Blob),
            _ => None,
        }
    }
}

impl fmt::Display for Sigil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A fully decoded tagged string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged {
    pub sigil: Option<Sigil>,
    pub bytes: Vec<u8>,
    pub tag: String,
}

/// Render raw bytes as `<sigil?><base64>.<tag>`
pub fn encode_tagged(raw: &[u8], tag: &str, sigil: Option<Sigil>) -> String {
    let body = STANDARD.encode(raw);
    let mut out = String::with_capacity(body.len() + tag.len() + 2);
    if let Some(sigil) = sigil {
        out.push(sigil.as_char());
    }
    out.push_str(&body);
    out.push('.');
    out.push_str(tag);
    out
}

/// Split a tagged string into its sigil, raw bytes and tag.
///
/// The tag is whatever follows the last `.`, so compound suffixes such as
/// `.sig.ed25519` decode with tag `ed25519` and fail on the base64 step;
/// use [`decode_with_suffix`] for those.
///
/// # Errors
///
/// Returns `MalformedIdentifier` if there is no `.` separator or the body
/// is not valid base64.
pub fn decode_tagged(input: &str) -> Result<Tagged, EncodingError> {
    let (sigil, rest) = split_sigil(input);
    let (body, tag) = rest.rsplit_once('.').ok_or_else(|| {
        EncodingError::MalformedIdentifier(format!("missing tag separator in {:?}", input))
    })?;
    let bytes = decode_base64(body, input)?;
    Ok(Tagged {
        sigil,
        bytes,
        tag: tag.to_string(),
    })
}

/// Decode a tagged string that must end in exactly `suffix` (e.g. `.sig.ed25519`).
pub fn decode_with_suffix(
    input: &str,
    suffix: &str,
) -> Result<(Option<Sigil>, Vec<u8>), EncodingError> {
    let (sigil, rest) = split_sigil(input);
    let body = rest.strip_suffix(suffix).ok_or_else(|| {
        EncodingError::MalformedIdentifier(format!("expected {:?} suffix on {:?}", suffix, input))
    })?;
    Ok((sigil, decode_base64(body, input)?))
}

/// Return the tag of a tagged string without validating anything else.
///
/// This is the cheap dispatch path: the base64 body is never looked at and
/// the sigil, if any, is irrelevant. Inputs without a `.` have no tag and
/// yield an empty string.
pub fn get_tag(input: &str) -> &str {
    input.rsplit_once('.').map(|(_, tag)| tag).unwrap_or("")
}

fn split_sigil(input: &str) -> (Option<Sigil>, &str) {
    match input.chars().next().and_then(Sigil::from_char) {
        Some(sigil) => (Some(sigil), &input[1..]),
        None => (None, input),
    }
}

fn decode_base64(body: &str, input: &str) -> Result<Vec<u8>, EncodingError> {
    STANDARD
        .decode(body)
        .map_err(|e| EncodingError::MalformedIdentifier(format!("bad base64 in {:?}: {}", input, e)))
}
