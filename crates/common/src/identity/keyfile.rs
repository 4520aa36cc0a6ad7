use serde::{Deserialize, Serialize};

use super::{Curve, Identity};
use crate::crypto::{PublicKey, SecretKey};
use crate::encoding::Sigil;

const HEADER: &str = "\
# This is your SECRET. It gives you magical powers: with it you can sign
# messages so that your friends can verify they really came from you.
#
# If anyone learns your secret, they can use it to impersonate you.
# NEVER show this file to anyone, and never edit it by hand.
#";

const FOOTER: &str = "\
#
# The only part of this file that is safe to share is your public id:
#";

/// The serialized form of an [`Identity`]
///
/// Field order on disk is irrelevant; `id` is always written with its `@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub curve: String,
    pub public: String,
    pub private: String,
    pub id: String,
}

impl From<Identity> for KeyRecord {
    fn from(identity: Identity) -> Self {
        Self {
            curve: identity.curve().to_string(),
            public: identity.public_tagged(),
            private: identity.private_tagged(),
            id: identity.id(),
        }
    }
}

impl TryFrom<KeyRecord> for Identity {
    type Error = anyhow::Error;

    fn try_from(record: KeyRecord) -> Result<Self, Self::Error> {
        let curve: Curve = record.curve.parse()?;
        let secret = SecretKey::from_tagged(&record.private)?;
        let public = PublicKey::from_tagged(&record.public)?;
        if secret.public() != public {
            anyhow::bail!("private key does not belong to {}", record.public);
        }
        if record.id != public.to_id() {
            anyhow::bail!("id {} does not match public key {}", record.id, record.public);
        }
        let mut identity = Identity::from_secret(secret);
        identity.curve = curve;
        Ok(identity)
    }
}

impl KeyRecord {
    /// Older records stored `id` without the leading `@`; put it back.
    fn normalize_legacy_id(mut self) -> Self {
        if !self.id.starts_with(Sigil::Feed.as_char()) {
            tracing::debug!("normalizing legacy identity record without id sigil");
            self.id.insert(0, Sigil::Feed.as_char());
        }
        self
    }
}

/// Render an identity as the commented key file written to disk
pub fn render_keyfile(identity: &Identity) -> String {
    let record = KeyRecord::from(identity.clone());
    // a struct of strings always serializes
    let body = serde_json::to_string_pretty(&record).expect("key record serializes");
    format!(
        "{header}\n\n{body}\n\n{footer}\n#   {id}\n",
        header = HEADER,
        body = body,
        footer = FOOTER,
        id = record.id
    )
}

/// Parse a key file, skipping `#` comment lines.
///
/// This is the only place legacy records are accepted.
pub fn parse_keyfile(contents: &str) -> anyhow::Result<Identity> {
    let json: String = contents
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let record: KeyRecord = serde_json::from_str(&json)?;
    Identity::try_from(record.normalize_legacy_id())
}
