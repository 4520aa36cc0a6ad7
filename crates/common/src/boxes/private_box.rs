//! Multi-recipient box
//!
//! # Wire Format
//!
//! ```text
//! [ nonce: 24 ][ ephemeral_pubkey: 32 ][ slot: 49 ] x n [ body ]
//!
//! slot = AEAD(X25519(ephemeral, recipient), nonce, [ n: 1 ][ message_key: 32 ])
//! body = AEAD(message_key, nonce, canonical(plaintext))
//! ```
//!
//! Every slot and the body are sealed under a different key, so sharing the
//! nonce between them is safe. The slot count is not stored in the clear:
//! a recipient learns it only after opening their own slot.

use serde_json::Value;

use super::{decode_envelope, parse_plaintext, BoxError};
use crate::crypto::{
    generate_nonce, PublicKey, Secret, SecretKey, NONCE_SIZE, PUBLIC_KEY_SIZE, SECRET_SIZE,
    TAG_SIZE,
};
use crate::encoding::{canonicalize, encode_tagged};

pub const BOX_TAG: &str = "box";
/// Most identities a single box can be addressed to
pub const MAX_RECIPIENTS: usize = 7;
const KEY_PAYLOAD_SIZE: usize = 1 + SECRET_SIZE;
/// Size of one wrapped message key
pub const SLOT_SIZE: usize = KEY_PAYLOAD_SIZE + TAG_SIZE;
const HEADER_SIZE: usize = NONCE_SIZE + PUBLIC_KEY_SIZE;

/// The per-message key recovered from a recipient slot
///
/// Holding it is enough to read the body with [`unbox_body`], so it can be
/// handed to a third party to reveal one message without revealing the
/// identity that received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageKey {
    secret: Secret,
    recipients: u8,
}

impl MessageKey {
    /// Number of slots in the box this key came from
    pub fn recipients(&self) -> usize {
        self.recipients as usize
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// `[ n: 1 ][ key: 32 ]`, the plaintext of a recipient slot
    pub fn to_bytes(&self) -> [u8; KEY_PAYLOAD_SIZE] {
        let mut out = [0u8; KEY_PAYLOAD_SIZE];
        out[0] = self.recipients;
        out[1..].copy_from_slice(self.secret.bytes());
        out
    }

    /// Parse a slot plaintext, rejecting impossible recipient counts
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_PAYLOAD_SIZE {
            return None;
        }
        let recipients = bytes[0];
        if recipients == 0 || recipients as usize > MAX_RECIPIENTS {
            return None;
        }
        let secret = Secret::from_slice(&bytes[1..]).ok()?;
        Some(Self { secret, recipients })
    }
}

/// The fixed-position parts of a decoded box
struct Envelope {
    nonce: [u8; NONCE_SIZE],
    ephemeral: PublicKey,
    bytes: Vec<u8>,
}

impl Envelope {
    fn decode(boxed: &str) -> Result<Self, BoxError> {
        let bytes = decode_envelope(boxed, BOX_TAG)?;
        if bytes.len() < HEADER_SIZE + SLOT_SIZE + TAG_SIZE {
            return Err(BoxError::MalformedInput(format!(
                "box of {} bytes is too short",
                bytes.len()
            )));
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        let ephemeral = PublicKey::try_from(&bytes[NONCE_SIZE..HEADER_SIZE])
            .map_err(|e| BoxError::MalformedInput(format!("bad ephemeral key: {}", e)))?;
        Ok(Self {
            nonce,
            ephemeral,
            bytes,
        })
    }

    fn slots(&self) -> impl Iterator<Item = &[u8]> {
        self.bytes[HEADER_SIZE..]
            .chunks_exact(SLOT_SIZE)
            .take(MAX_RECIPIENTS)
    }

    fn open_key(&self, key: &SecretKey) -> Result<Option<MessageKey>, BoxError> {
        let ephemeral = self
            .ephemeral
            .to_x25519()
            .map_err(|e| BoxError::MalformedInput(format!("bad ephemeral key: {}", e)))?;
        let shared = Secret::from(*key.to_x25519().diffie_hellman(&ephemeral).as_bytes());
        let found = self
            .slots()
            .enumerate()
            .find_map(|(i, slot)| {
                let payload = shared.open(&self.nonce, slot).ok()?;
                Some((i, MessageKey::from_bytes(&payload)))
            });
        match found {
            Some((i, Some(message_key))) => {
                tracing::trace!(slot = i, "opened recipient slot");
                Ok(Some(message_key))
            }
            Some((i, None)) => Err(BoxError::MalformedInput(format!(
                "slot {} holds an invalid message key",
                i
            ))),
            None => {
                tracing::trace!("no recipient slot opened");
                Ok(None)
            }
        }
    }

    fn open_body(&self, message_key: &MessageKey) -> Result<Value, BoxError> {
        let start = HEADER_SIZE + message_key.recipients() * SLOT_SIZE;
        if start + TAG_SIZE > self.bytes.len() {
            return Err(BoxError::MalformedInput(
                "box is too short for its recipient count".into(),
            ));
        }
        let plaintext = message_key
            .secret
            .open(&self.nonce, &self.bytes[start..])
            .map_err(|_| BoxError::DecryptionFailed)?;
        parse_plaintext(&plaintext)
    }
}

/// Encrypt `plaintext` so each of `recipients` can open it.
///
/// # Errors
///
/// `MalformedInput` when there are no recipients or more than
/// [`MAX_RECIPIENTS`].
pub fn box_message(plaintext: &Value, recipients: &[PublicKey]) -> Result<String, BoxError> {
    if recipients.is_empty() || recipients.len() > MAX_RECIPIENTS {
        return Err(BoxError::MalformedInput(format!(
            "a box needs 1 to {} recipients, got {}",
            MAX_RECIPIENTS,
            recipients.len()
        )));
    }
    let body = canonicalize(plaintext)?;

    let nonce = generate_nonce();
    let ephemeral = SecretKey::generate();
    let ephemeral_x25519 = ephemeral.to_x25519();
    let message_key = MessageKey {
        secret: Secret::generate(),
        recipients: recipients.len() as u8,
    };
    let payload = message_key.to_bytes();

    let mut out = Vec::with_capacity(
        HEADER_SIZE + recipients.len() * SLOT_SIZE + body.len() + TAG_SIZE,
    );
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ephemeral.public().to_bytes());
    for recipient in recipients {
        let shared = ephemeral_x25519.diffie_hellman(&recipient.to_x25519()?);
        let slot = Secret::from(*shared.as_bytes())
            .seal(&nonce, &payload)
            .map_err(|e| anyhow::anyhow!("failed to seal recipient slot: {}", e))?;
        out.extend_from_slice(&slot);
    }
    let sealed = message_key
        .secret
        .seal(&nonce, &body)
        .map_err(|e| anyhow::anyhow!("failed to seal body: {}", e))?;
    out.extend_from_slice(&sealed);

    Ok(encode_tagged(&out, BOX_TAG, None))
}

/// Recover the message key of `boxed` if `key` is one of its recipients.
///
/// Every slot is tried; `Ok(None)` means none of them opened.
pub fn unbox_key(
    boxed: &str,
    key: impl AsRef<SecretKey>,
) -> Result<Option<MessageKey>, BoxError> {
    Envelope::decode(boxed)?.open_key(key.as_ref())
}

/// Decrypt the body of `boxed` with a key from [`unbox_key`].
///
/// # Errors
///
/// `DecryptionFailed` if the body does not authenticate under `message_key`.
pub fn unbox_body(boxed: &str, message_key: &MessageKey) -> Result<Value, BoxError> {
    Envelope::decode(boxed)?.open_body(message_key)
}

/// Decrypt `boxed` with a recipient's key.
///
/// `Ok(None)` means `key` is not a recipient. A recovered key whose body
/// fails to authenticate is `Err(DecryptionFailed)`.
pub fn unbox(boxed: &str, key: impl AsRef<SecretKey>) -> Result<Option<Value>, BoxError> {
    let envelope = Envelope::decode(boxed)?;
    match envelope.open_key(key.as_ref())? {
        Some(message_key) => envelope.open_body(&message_key).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde_json::json;

    fn tamper(boxed: &str, index_from_end: usize) -> String {
        let body = boxed.strip_suffix(".box").unwrap();
        let mut bytes = STANDARD.decode(body).unwrap();
        let i = bytes.len() - index_from_end;
        bytes[i] ^= 0x01;
        format!("{}.box", STANDARD.encode(bytes))
    }

    #[test]
    fn test_single_recipient_roundtrip() {
        let alice = SecretKey::generate();
        let msg = json!({"type": "secret", "text": "only for alice"});
        let boxed = box_message(&msg, &[alice.public()]).unwrap();
        assert!(boxed.ends_with(".box"));
        assert_eq!(unbox(&boxed, &alice).unwrap(), Some(msg));
    }

    #[test]
    fn test_envelope_length() {
        let keys: Vec<SecretKey> = (0..3).map(|_| SecretKey::generate()).collect();
        let publics: Vec<PublicKey> = keys.iter().map(SecretKey::public).collect();
        let msg = json!("x");
        let boxed = box_message(&msg, &publics).unwrap();
        let bytes = STANDARD.decode(boxed.strip_suffix(".box").unwrap()).unwrap();
        let body_len = canonicalize(&msg).unwrap().len() + TAG_SIZE;
        assert_eq!(bytes.len(), HEADER_SIZE + 3 * SLOT_SIZE + body_len);
    }

    #[test]
    fn test_recipient_limits() {
        let msg = json!({"a": 1});
        assert!(matches!(
            box_message(&msg, &[]),
            Err(BoxError::MalformedInput(_))
        ));
        let too_many: Vec<PublicKey> = (0..MAX_RECIPIENTS + 1)
            .map(|_| SecretKey::generate().public())
            .collect();
        assert!(matches!(
            box_message(&msg, &too_many),
            Err(BoxError::MalformedInput(_))
        ));

        let keys: Vec<SecretKey> = (0..MAX_RECIPIENTS).map(|_| SecretKey::generate()).collect();
        let publics: Vec<PublicKey> = keys.iter().map(SecretKey::public).collect();
        let boxed = box_message(&msg, &publics).unwrap();
        let last = keys.last().unwrap();
        assert_eq!(unbox(&boxed, last).unwrap(), Some(msg));
    }

    #[test]
    fn test_message_key_reveals_body() {
        let alice = SecretKey::generate();
        let msg = json!({"n": 42});
        let boxed = box_message(&msg, &[alice.public()]).unwrap();
        let message_key = unbox_key(&boxed, &alice).unwrap().unwrap();
        assert_eq!(message_key.recipients(), 1);

        let bytes = message_key.to_bytes();
        let shared = MessageKey::from_bytes(&bytes).unwrap();
        assert_eq!(unbox_body(&boxed, &shared).unwrap(), msg);
    }

    #[test]
    fn test_corrupt_body_is_decryption_failure() {
        let alice = SecretKey::generate();
        let boxed = box_message(&json!({"a": 1}), &[alice.public()]).unwrap();
        let corrupt = tamper(&boxed, 1);
        assert!(matches!(
            unbox(&corrupt, &alice),
            Err(BoxError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_malformed_envelopes() {
        let alice = SecretKey::generate();
        for bad in ["", "no tag at all", "!!!!.box", "AAAA.box", "AAAA.secretbox"] {
            assert!(matches!(
                unbox(bad, &alice),
                Err(BoxError::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn test_message_key_rejects_bad_counts() {
        let mut bytes = [7u8; KEY_PAYLOAD_SIZE];
        bytes[0] = 0;
        assert!(MessageKey::from_bytes(&bytes).is_none());
        bytes[0] = MAX_RECIPIENTS as u8 + 1;
        assert!(MessageKey::from_bytes(&bytes).is_none());
        assert!(MessageKey::from_bytes(&bytes[1..]).is_none());
    }
}
